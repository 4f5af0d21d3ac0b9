// Copyright 2020 Cognite AS
//! The HTTP Layer

#[cfg(feature = "reqwest")]
mod reqwest_12;
#[cfg(feature = "reqwest-11")]
mod reqwest_11;
mod shim;

use std::fmt;

use log::trace;
use url::Url;

pub use shim::{HttpClient, RawResponse};

/// The verbs a request can be sent with.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const JSON: &str = "application/json";

/// Wraps an [`HttpClient`] and applies the headers every request carries.
pub struct HTTP<C: HttpClient> {
    user_agent_header: C::HeaderName,
    accept_header: C::HeaderName,
    content_type_header: C::HeaderName,
    user_agent: String,
    client: C,
}

impl<C: HttpClient + Default> HTTP<C> {
    /// The error type on this will change in future.
    pub fn new(user_agent: String) -> Result<Self, C::Error> {
        Self::with_client(C::default(), user_agent)
    }
}

impl<C: HttpClient> HTTP<C> {
    pub fn with_client(client: C, user_agent: String) -> Result<Self, C::Error> {
        Ok(HTTP {
            client,
            user_agent,
            user_agent_header: C::build_header("user-agent")?,
            accept_header: C::build_header("accept")?,
            content_type_header: C::build_header("content-type")?,
        })
    }

    /// Build a request with the common headers set; a body, when given, is
    /// marked as JSON.
    pub fn request(&self, verb: HttpVerb, url: &Url, body: Option<Vec<u8>>) -> C::RequestBuilder {
        let uri = url.as_str();
        let request = match verb {
            HttpVerb::Get => self.client.get(uri),
            HttpVerb::Post => self.client.post(uri),
            HttpVerb::Put => self.client.put(uri),
            HttpVerb::Delete => self.client.delete(uri),
        };
        let request = C::header(request, &self.user_agent_header, &self.user_agent);
        let request = C::header(request, &self.accept_header, JSON);
        match body {
            Some(body) => {
                trace!("{verb} {url}: {} byte body", body.len());
                let request = C::header(request, &self.content_type_header, JSON);
                C::body(request, body)
            }
            None => request,
        }
    }

    /// Perform a request. Errors are transport faults only; the status is
    /// returned as-is.
    pub async fn execute(
        &self,
        verb: HttpVerb,
        url: &Url,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, C::Error> {
        C::send(self.request(verb, url, body)).await
    }
}
