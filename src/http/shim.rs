//! Shim traits to define an external client as a transporter HTTP client.
//! This is an imperfect system, but sufficient to work with multiple async
//! frameworks, which is the goal.

// Copyright 2022 Cognite AS

use core::fmt::{Debug, Display};
use std::error::Error;

use async_trait::async_trait;

/// Status and body of a completed exchange. Interpreting the status is left
/// to the caller.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Abstraction over the concrete HTTP client being used. Implement this on any
/// type to use it as a transporter HTTP client.
#[async_trait]
pub trait HttpClient: Sync + Send {
    type HeaderName: Clone + Sync + Send;
    type Error: Debug + Display + Error + Send + Sync + 'static;
    type RequestBuilder: Send;

    /// Construct a HTTP client layer headername
    fn build_header(name: &'static str) -> Result<Self::HeaderName, Self::Error>;

    /// Make a get request
    fn get(&self, uri: &str) -> Self::RequestBuilder;

    /// Make a post request
    fn post(&self, uri: &str) -> Self::RequestBuilder;

    /// Make a put request
    fn put(&self, uri: &str) -> Self::RequestBuilder;

    /// Make a delete request
    fn delete(&self, uri: &str) -> Self::RequestBuilder;

    /// Add a header to a request
    fn header(
        builder: Self::RequestBuilder,
        key: &Self::HeaderName,
        value: &str,
    ) -> Self::RequestBuilder;

    /// Attach an already encoded body to a request
    fn body(builder: Self::RequestBuilder, body: Vec<u8>) -> Self::RequestBuilder;

    /// Send the request. Any status the server answers with is a successful
    /// exchange; errors are reserved for transport faults.
    async fn send(req: Self::RequestBuilder) -> Result<RawResponse, Self::Error>;
}
