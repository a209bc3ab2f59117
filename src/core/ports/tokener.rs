use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;

pub trait Payload: Serialize + DeserializeOwned {
    fn user(&self) -> &str;
}

pub trait Tokener<P>
where
    P: Payload,
{
    fn gen_token(&self, payload: &P) -> Result<String, Error>;
    fn verify_token(&self, token: &str) -> Result<P, Error>;
}
