// Copyright (c) 2024 The Botho Foundation

//! Maker-side order signers.
//!
//! The signature authorizes the resolver to deploy the source escrow on the
//! maker's behalf, so the signer always matches the source chain.

use alloy::primitives::{Address, B256};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use zeroize::Zeroizing;

use crate::{
    chains::Chain,
    error::SwapError,
    tezos::{encode_signature, TezosKeypair},
};

/// Signs order hashes for one chain.
pub trait OrderSigner: Send + Sync {
    fn chain(&self) -> Chain;

    /// The maker address this signer speaks for, in chain-native encoding.
    fn address(&self) -> String;

    /// Sign an order hash, returning the signature in the encoding expected
    /// by the chain's escrow factory.
    fn sign_order_hash(&self, order_hash: &B256) -> Result<String, SwapError>;
}

/// secp256k1 signer producing 65-byte `r || s || v` signatures.
pub struct EvmOrderSigner {
    signing_key: SigningKey,
}

impl EvmOrderSigner {
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, SwapError> {
        let signing_key = SigningKey::from_bytes(bytes.into())
            .map_err(|_| SwapError::InvalidKey("invalid secp256k1 private key".to_string()))?;
        Ok(Self { signing_key })
    }

    /// Parse a hex private key, with or without `0x`.
    pub fn from_hex(value: &str) -> Result<Self, SwapError> {
        let value = value.trim();
        let stripped = value.strip_prefix("0x").unwrap_or(value);
        let bytes = Zeroizing::new(
            hex::decode(stripped).map_err(|e| SwapError::InvalidKey(e.to_string()))?,
        );
        let key: &[u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| SwapError::InvalidKey("private key must be 32 bytes".to_string()))?;
        Self::from_bytes(key)
    }

    pub fn address_bytes(&self) -> Address {
        address_of(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest.
    pub fn sign_hash(&self, hash: &B256) -> Result<[u8; 65], SwapError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash.as_slice())
            .map_err(|e| SwapError::Signing(e.to_string()))?;

        let mut result = [0u8; 65];
        result[..64].copy_from_slice(&signature.to_bytes());
        result[64] = recovery_id.to_byte() + 27;
        Ok(result)
    }
}

impl std::fmt::Debug for EvmOrderSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmOrderSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl OrderSigner for EvmOrderSigner {
    fn chain(&self) -> Chain {
        Chain::Ethereum
    }

    fn address(&self) -> String {
        self.address_bytes().to_checksum(None)
    }

    fn sign_order_hash(&self, order_hash: &B256) -> Result<String, SwapError> {
        let signature = self.sign_hash(order_hash)?;
        Ok(format!("0x{}", hex::encode(signature)))
    }
}

fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 prefix
    Address::from_raw_public_key(&point.as_bytes()[1..])
}

/// Recover the EVM address that produced `signature` over `hash`.
pub fn recover_evm_signer(hash: &B256, signature: &str) -> Result<Address, SwapError> {
    let invalid = |reason: &str| SwapError::InvalidHex {
        field: "signature",
        reason: reason.to_string(),
    };

    let stripped = signature.strip_prefix("0x").unwrap_or(signature);
    let bytes = hex::decode(stripped).map_err(|e| invalid(&e.to_string()))?;
    if bytes.len() != 65 {
        return Err(invalid("expected 65 bytes"));
    }

    let v = bytes[64];
    let recovery_id = RecoveryId::try_from(if v >= 27 { v - 27 } else { v })
        .map_err(|_| invalid("bad recovery id"))?;
    let sig = K256Signature::from_slice(&bytes[..64]).map_err(|e| invalid(&e.to_string()))?;
    let key = VerifyingKey::recover_from_prehash(hash.as_slice(), &sig, recovery_id)
        .map_err(|e| SwapError::Signing(e.to_string()))?;

    Ok(address_of(&key))
}

/// ed25519 signer for orders originating on Tezos. Produces `edsig...`.
pub struct TezosOrderSigner {
    keypair: TezosKeypair,
}

impl TezosOrderSigner {
    pub fn new(keypair: TezosKeypair) -> Self {
        Self { keypair }
    }
}

impl OrderSigner for TezosOrderSigner {
    fn chain(&self) -> Chain {
        Chain::TezosGhostnet
    }

    fn address(&self) -> String {
        self.keypair.address()
    }

    fn sign_order_hash(&self, order_hash: &B256) -> Result<String, SwapError> {
        Ok(encode_signature(&self.keypair.sign_raw(order_hash.as_slice())))
    }
}
