// Copyright (c) 2024 The Botho Foundation

//! Swap secrets and the hash-locks committing to them.

use alloy::primitives::B256;
use rand::{rngs::OsRng, RngCore};
use sha3::{Digest, Keccak256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::SwapError;

/// Decode a 32-byte hex value, with or without `0x`.
pub(crate) fn decode_hex32(field: &'static str, s: &str) -> Result<[u8; 32], SwapError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped).map_err(|e| SwapError::InvalidHex {
        field,
        reason: e.to_string(),
    })?;
    bytes.try_into().map_err(|v: Vec<u8>| SwapError::InvalidHex {
        field,
        reason: format!("expected 32 bytes, got {}", v.len()),
    })
}

/// A 32-byte swap secret. Revealing it unlocks both escrows.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret([u8; 32]);

impl Secret {
    /// Draw a fresh secret from the OS CSPRNG.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_b256(&self) -> B256 {
        B256::from(self.0)
    }

    /// 0x-prefixed hex. Only for handing the secret back to its owner.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn hash_lock(&self) -> HashLock {
        HashLock::for_secret(self)
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(<redacted>)")
    }
}

impl std::str::FromStr for Secret {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex32("secret", s.trim()).map(Self)
    }
}

/// keccak256 commitment to a [`Secret`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashLock(pub B256);

impl HashLock {
    pub fn for_secret(secret: &Secret) -> Self {
        let digest = Keccak256::digest(secret.as_bytes());
        Self(B256::from_slice(&digest))
    }

    /// Whether `secret` opens this lock.
    pub fn verify(&self, secret: &Secret) -> bool {
        Self::for_secret(secret) == *self
    }

    pub fn as_b256(&self) -> B256 {
        self.0
    }
}

impl std::fmt::Display for HashLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for HashLock {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex32("hashLock", s).map(|bytes| Self(B256::from(bytes)))
    }
}

impl From<B256> for HashLock {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_secrets_differ() {
        assert_ne!(Secret::random(), Secret::random());
    }

    #[test]
    fn test_hashlock_verifies_only_its_secret() {
        let secret = Secret::random();
        let lock = secret.hash_lock();
        assert!(lock.verify(&secret));

        let mut other = *secret.as_bytes();
        other[31] ^= 1;
        assert!(!lock.verify(&Secret::from_bytes(other)));
    }

    #[test]
    fn test_known_keccak_vector() {
        // keccak256 of 32 zero bytes
        let lock = Secret::from_bytes([0u8; 32]).hash_lock();
        assert_eq!(
            lock.to_string(),
            "0x290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563"
        );
    }

    #[test]
    fn test_secret_parsing() {
        let secret = Secret::random();
        let parsed: Secret = secret.to_hex().parse().unwrap();
        assert_eq!(parsed, secret);

        let unprefixed: Secret = secret.to_hex()[2..].parse().unwrap();
        assert_eq!(unprefixed, secret);

        assert!("0x1234".parse::<Secret>().is_err());
        assert!("zz".repeat(32).parse::<Secret>().is_err());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::from_bytes([0xab; 32]);
        assert!(!format!("{:?}", secret).contains("abab"));
    }
}
