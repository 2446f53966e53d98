use crate::error::Error;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A binary encoding used to serialize collections.
pub trait Codec {
    fn encode<T: Serialize>(item: &T) -> Result<Vec<u8>, Error>;

    fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, Error>;
}

/// Compact encoding. This is the default.
pub struct Bitcode;

/// Encoding with a stable, well documented wire format.
pub struct Bincode;

impl Codec for Bitcode {
    #[inline]
    fn encode<T: Serialize>(item: &T) -> Result<Vec<u8>, Error> {
        Ok(bitcode::serialize(item)?)
    }

    #[inline]
    fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, Error> {
        Ok(bitcode::deserialize(data)?)
    }
}

impl Codec for Bincode {
    #[inline]
    fn encode<T: Serialize>(item: &T) -> Result<Vec<u8>, Error> {
        Ok(bincode::serialize(item)?)
    }

    #[inline]
    fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, Error> {
        Ok(bincode::deserialize(data)?)
    }
}

#[inline]
pub fn serialize_impl<T: Serialize>(item: &T) -> Result<Vec<u8>, Error> {
    Bitcode::encode(item)
}

#[inline]
pub fn deserialize_impl<T: DeserializeOwned>(data: &[u8]) -> Result<T, Error> {
    Bitcode::decode(data)
}
