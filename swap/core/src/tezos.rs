// Copyright (c) 2024 The Botho Foundation

//! Tezos ed25519 keys, base58check encodings and operation signing.

use blake2::{
    digest::consts::{U20, U32},
    Blake2b, Digest,
};
use ed25519_dalek::{Signer, SigningKey};
use zeroize::Zeroizing;

use crate::{chains::TZ1_PREFIX, error::SwapError};

const EDSK_SEED_PREFIX: [u8; 4] = [13, 15, 58, 7];
const EDSK_SECRET_PREFIX: [u8; 4] = [43, 246, 78, 7];
const EDPK_PREFIX: [u8; 4] = [13, 15, 37, 217];
const EDSIG_PREFIX: [u8; 5] = [9, 245, 205, 134, 18];

/// Watermark prepended to manager operations before signing.
pub const OPERATION_WATERMARK: u8 = 0x03;

pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    Blake2b::<U32>::digest(data).into()
}

pub fn blake2b_160(data: &[u8]) -> [u8; 20] {
    Blake2b::<U20>::digest(data).into()
}

fn b58check_encode(prefix: &[u8], payload: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(prefix.len() + payload.len());
    bytes.extend_from_slice(prefix);
    bytes.extend_from_slice(payload);
    bs58::encode(bytes).with_check().into_string()
}

fn b58check_decode(prefix: &[u8], value: &str) -> Option<Zeroizing<Vec<u8>>> {
    let decoded = Zeroizing::new(bs58::decode(value).with_check(None).into_vec().ok()?);
    if !decoded.starts_with(prefix) {
        return None;
    }
    Some(Zeroizing::new(decoded[prefix.len()..].to_vec()))
}

/// An ed25519 (tz1) account key.
pub struct TezosKeypair {
    signing_key: SigningKey,
}

impl TezosKeypair {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Parse a secret key given as `edsk...` (seed or expanded form) or as
    /// 32-byte hex.
    pub fn from_secret_str(value: &str) -> Result<Self, SwapError> {
        let value = value.trim();

        if value.starts_with("edsk") {
            let payload = b58check_decode(&EDSK_SEED_PREFIX, value)
                .or_else(|| b58check_decode(&EDSK_SECRET_PREFIX, value))
                .ok_or_else(|| SwapError::InvalidKey("malformed edsk key".to_string()))?;
            // The expanded form is seed || public key
            if payload.len() != 32 && payload.len() != 64 {
                return Err(SwapError::InvalidKey(format!(
                    "edsk payload must be 32 or 64 bytes, got {}",
                    payload.len()
                )));
            }
            let mut seed = [0u8; 32];
            seed.copy_from_slice(&payload[..32]);
            let keypair = Self::from_seed(seed);
            zeroize::Zeroize::zeroize(&mut seed);
            return Ok(keypair);
        }

        let stripped = value.strip_prefix("0x").unwrap_or(value);
        let bytes = Zeroizing::new(
            hex::decode(stripped).map_err(|e| SwapError::InvalidKey(e.to_string()))?,
        );
        let seed: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| SwapError::InvalidKey("ed25519 seed must be 32 bytes".to_string()))?;
        Ok(Self::from_seed(seed))
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// `edpk...` encoding of the public key.
    pub fn public_key(&self) -> String {
        b58check_encode(&EDPK_PREFIX, &self.public_key_bytes())
    }

    /// The implicit `tz1...` account address.
    pub fn address(&self) -> String {
        b58check_encode(&TZ1_PREFIX, &blake2b_160(&self.public_key_bytes()))
    }

    /// Sign `message` as-is.
    pub fn sign_raw(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Sign forged operation bytes: ed25519 over blake2b-256 of the
    /// watermarked bytes.
    pub fn sign_operation(&self, forged: &[u8]) -> [u8; 64] {
        let mut watermarked = Vec::with_capacity(forged.len() + 1);
        watermarked.push(OPERATION_WATERMARK);
        watermarked.extend_from_slice(forged);
        self.sign_raw(&blake2b_256(&watermarked))
    }
}

impl std::fmt::Debug for TezosKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TezosKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// `edsig...` encoding of a signature.
pub fn encode_signature(signature: &[u8; 64]) -> String {
    b58check_encode(&EDSIG_PREFIX, signature)
}
