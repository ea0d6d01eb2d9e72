//! Symmetric encode/decode of JSON payloads into transport-safe text.
//!
//! # Design
//! A payload is serialized to compact JSON, padded to the AES block size
//! (pad byte N repeated N times, a full block when already aligned),
//! encrypted block by block under the static key with no chaining and no
//! IV, then base64 encoded. Equal payloads therefore produce equal
//! ciphertexts. Keys are written in sorted order with no whitespace, so a
//! receiver holding the key can decrypt and parse the result, but the bytes
//! need not match what another serializer produces for the same mapping.
//!
//! `decode` never fails: any problem is logged and yields an empty mapping.
//! `try_decode` returns the underlying `DecodeError` instead.

use std::fmt;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::SecretKey;
use crate::error::{DecodeError, HarnessError, Result};

/// AES block size in bytes, independent of key length.
pub const BLOCK_SIZE: usize = 16;

/// Substitute for a request body when encryption is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    pub payload: String,
}

#[derive(Clone)]
enum BlockCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl BlockCipher {
    fn new(key: &SecretKey) -> Result<Self> {
        let bytes = key.as_bytes();
        let cipher = match bytes.len() {
            16 => Aes128::new_from_slice(bytes).map(BlockCipher::Aes128),
            24 => Aes192::new_from_slice(bytes).map(BlockCipher::Aes192),
            32 => Aes256::new_from_slice(bytes).map(BlockCipher::Aes256),
            n => {
                return Err(HarnessError::Config(format!(
                    "no AES variant for a {n}-byte key"
                )))
            }
        };
        cipher.map_err(|e| HarnessError::Config(format!("invalid AES key: {e}")))
    }

    fn encrypt(&self, data: &mut [u8]) {
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(chunk);
            match self {
                BlockCipher::Aes128(c) => c.encrypt_block(block),
                BlockCipher::Aes192(c) => c.encrypt_block(block),
                BlockCipher::Aes256(c) => c.encrypt_block(block),
            }
        }
    }

    fn decrypt(&self, data: &mut [u8]) {
        for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(chunk);
            match self {
                BlockCipher::Aes128(c) => c.decrypt_block(block),
                BlockCipher::Aes192(c) => c.decrypt_block(block),
                BlockCipher::Aes256(c) => c.decrypt_block(block),
            }
        }
    }

    fn bits(&self) -> usize {
        match self {
            BlockCipher::Aes128(_) => 128,
            BlockCipher::Aes192(_) => 192,
            BlockCipher::Aes256(_) => 256,
        }
    }
}

/// Reversible payload <-> ciphertext transformation under one static key.
#[derive(Clone)]
pub struct CryptoCodec {
    cipher: BlockCipher,
}

impl fmt::Debug for CryptoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CryptoCodec(AES-{})", self.cipher.bits())
    }
}

impl CryptoCodec {
    pub fn new(key: &SecretKey) -> Result<Self> {
        Ok(Self {
            cipher: BlockCipher::new(key)?,
        })
    }

    /// Serialize, pad, encrypt and base64 encode `payload`.
    pub fn encode(&self, payload: &Map<String, Value>) -> Result<String> {
        let mut data = serde_json::to_vec(payload)?;
        pad(&mut data);
        self.cipher.encrypt(&mut data);
        Ok(BASE64.encode(data))
    }

    /// Inverse of `encode`. Returns an empty mapping on any failure.
    pub fn decode(&self, text: &str) -> Map<String, Value> {
        match self.try_decode(text) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode encrypted payload");
                Map::new()
            }
        }
    }

    pub fn try_decode(&self, text: &str) -> std::result::Result<Map<String, Value>, DecodeError> {
        let mut data = BASE64.decode(text.trim())?;
        if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
            return Err(DecodeError::Length(data.len()));
        }
        self.cipher.decrypt(&mut data);
        let plain = unpad(&data)?;
        match serde_json::from_slice::<Value>(plain)? {
            Value::Object(map) => Ok(map),
            _ => Err(DecodeError::NotAnObject),
        }
    }

    /// Wrap an encoded body in the `{"payload": ...}` envelope.
    pub fn seal(&self, body: &Map<String, Value>) -> Result<EncryptedEnvelope> {
        Ok(EncryptedEnvelope {
            payload: self.encode(body)?,
        })
    }

    pub fn open(&self, envelope: &EncryptedEnvelope) -> Map<String, Value> {
        self.decode(&envelope.payload)
    }
}

fn pad(data: &mut Vec<u8>) {
    let n = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    data.extend(std::iter::repeat(n as u8).take(n));
}

fn unpad(data: &[u8]) -> std::result::Result<&[u8], DecodeError> {
    let n = match data.last() {
        Some(&n) => n,
        None => return Err(DecodeError::Length(0)),
    };
    let len = n as usize;
    if len == 0 || len > BLOCK_SIZE || len > data.len() {
        return Err(DecodeError::Padding(n));
    }
    Ok(&data[..data.len() - len])
}
