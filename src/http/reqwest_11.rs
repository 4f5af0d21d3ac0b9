//! Shim reqwest 0.11 into a transporter HTTP client

// Copyright 2022 Cognite AS

use async_trait::async_trait;

use super::{HttpClient, RawResponse};

#[async_trait]
impl HttpClient for reqwest_11::Client {
    type HeaderName = reqwest_11::header::HeaderName;
    type Error = reqwest_11::Error;
    type RequestBuilder = reqwest_11::RequestBuilder;

    fn build_header(name: &'static str) -> Result<Self::HeaderName, Self::Error> {
        Ok(Self::HeaderName::from_static(name))
    }

    fn get(&self, uri: &str) -> Self::RequestBuilder {
        self.get(uri)
    }

    fn post(&self, uri: &str) -> Self::RequestBuilder {
        self.post(uri)
    }

    fn put(&self, uri: &str) -> Self::RequestBuilder {
        self.put(uri)
    }

    fn delete(&self, uri: &str) -> Self::RequestBuilder {
        self.delete(uri)
    }

    fn header(
        builder: Self::RequestBuilder,
        key: &Self::HeaderName,
        value: &str,
    ) -> Self::RequestBuilder {
        builder.header(key.clone(), value)
    }

    fn body(builder: Self::RequestBuilder, body: Vec<u8>) -> Self::RequestBuilder {
        builder.body(body)
    }

    async fn send(req: Self::RequestBuilder) -> Result<RawResponse, Self::Error> {
        let res = req.send().await?;
        let status = res.status().as_u16();
        let body = res.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }
}
