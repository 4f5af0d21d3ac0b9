// Copyright 2022 Cognite AS
//! JSON bodies out, typed values back.
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;

/// Serialize a request body.
pub fn encode<T: Serialize + ?Sized>(model: &T) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(model).map_err(Error::Encode)
}

/// What a request expects back from a successful (200) response.
pub trait Expect {
    type Output;

    fn decode(body: &[u8]) -> Result<Self::Output, Error>;
}

/// No payload expected: success is acknowledged without reading the body.
#[derive(Debug)]
pub struct Ack;

impl Expect for Ack {
    type Output = ();

    fn decode(_body: &[u8]) -> Result<(), Error> {
        Ok(())
    }
}

/// A JSON body decoded into `T`.
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T: DeserializeOwned> Expect for Json<T> {
    type Output = T;

    fn decode(body: &[u8]) -> Result<T, Error> {
        serde_json::from_slice(body).map_err(Error::DecodeMismatch)
    }
}
