//! Value codecs
//!
//! The engine stores bytes; a [`Codec`] turns typed values into those bytes
//! and back.
//!
//! ## Stock Codecs
//! - Fixed-width numbers, big-endian (`I64Codec` writes 8 bytes, etc.)
//! - `StringCodec`: raw UTF-8, no length prefix
//! - `BytesCodec`: payload stored as-is
//! - `BincodeCodec<T>`: any serde type via bincode

use std::fmt;
use std::marker::PhantomData;

use bytes::{Buf, BufMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

/// Converts values of type `T` to and from stored bytes
pub trait Codec<T> {
    fn encode(&self, value: &T) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<T>;
}

fn expect_width(bytes: &[u8], width: usize, type_name: &str) -> Result<()> {
    if bytes.len() != width {
        return Err(StoreError::Codec(format!(
            "{} needs {} bytes, got {}",
            type_name,
            width,
            bytes.len()
        )));
    }
    Ok(())
}

// =============================================================================
// Fixed-Width Numbers
// =============================================================================

macro_rules! fixed_width_codec {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $put:ident, $get:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Codec<$ty> for $name {
            fn encode(&self, value: &$ty) -> Result<Vec<u8>> {
                let mut buf = Vec::with_capacity(std::mem::size_of::<$ty>());
                buf.$put(*value);
                Ok(buf)
            }

            fn decode(&self, bytes: &[u8]) -> Result<$ty> {
                expect_width(bytes, std::mem::size_of::<$ty>(), stringify!($ty))?;
                let mut buf = bytes;
                Ok(buf.$get())
            }
        }
    };
}

fixed_width_codec!(I8Codec, i8, put_i8, get_i8);
fixed_width_codec!(U8Codec, u8, put_u8, get_u8);
fixed_width_codec!(I16Codec, i16, put_i16, get_i16);
fixed_width_codec!(U16Codec, u16, put_u16, get_u16);
fixed_width_codec!(
    /// 4-byte big-endian `i32`
    I32Codec, i32, put_i32, get_i32
);
fixed_width_codec!(U32Codec, u32, put_u32, get_u32);
fixed_width_codec!(
    /// 8-byte big-endian `i64`
    I64Codec, i64, put_i64, get_i64
);
fixed_width_codec!(U64Codec, u64, put_u64, get_u64);
fixed_width_codec!(F32Codec, f32, put_f32, get_f32);
fixed_width_codec!(F64Codec, f64, put_f64, get_f64);

/// One byte, 0 or 1
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCodec;

impl Codec<bool> for BoolCodec {
    fn encode(&self, value: &bool) -> Result<Vec<u8>> {
        Ok(vec![*value as u8])
    }

    fn decode(&self, bytes: &[u8]) -> Result<bool> {
        expect_width(bytes, 1, "bool")?;
        match bytes[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(StoreError::Codec(format!("invalid bool byte {:#04x}", other))),
        }
    }
}

// =============================================================================
// Strings and Byte Arrays
// =============================================================================

/// Raw UTF-8 bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl Codec<String> for StringCodec {
    fn encode(&self, value: &String) -> Result<Vec<u8>> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| StoreError::Codec(format!("invalid UTF-8: {}", e)))
    }
}

/// Bytes stored unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl Codec<Vec<u8>> for BytesCodec {
    fn encode(&self, value: &Vec<u8>) -> Result<Vec<u8>> {
        Ok(value.clone())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

// =============================================================================
// Serde Types
// =============================================================================

/// Any `Serialize + DeserializeOwned` type, encoded with bincode
pub struct BincodeCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> BincodeCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for BincodeCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BincodeCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BincodeCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BincodeCodec")
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> for BincodeCodec<T> {
    fn encode(&self, value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value).map_err(|e| StoreError::Codec(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes).map_err(|e| StoreError::Codec(e.to_string()))
    }
}
