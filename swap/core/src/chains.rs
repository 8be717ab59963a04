// Copyright (c) 2024 The Botho Foundation

//! Chain-specific types and utilities.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SwapError;

/// EIP-155 chain id of Ethereum mainnet (and of mainnet forks used for testing).
pub const ETHEREUM_CHAIN_ID: u64 = 1;

/// Wire identifier of the Tezos ghostnet test network.
pub const TEZOS_GHOSTNET_ID: &str = "tezos:ghostnet";

/// Tezos has no EIP-155 id. This placeholder only scopes order hashes whose
/// source chain is Tezos.
pub const TEZOS_GHOSTNET_DOMAIN_ID: u64 = 56;

/// Tezos base58check prefixes.
pub(crate) const TZ1_PREFIX: [u8; 3] = [6, 161, 159];
pub(crate) const TZ2_PREFIX: [u8; 3] = [6, 161, 161];
pub(crate) const TZ3_PREFIX: [u8; 3] = [6, 161, 164];
pub(crate) const KT1_PREFIX: [u8; 3] = [2, 90, 121];

/// Supported blockchain networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Chain {
    /// Ethereum mainnet or a local fork of it
    Ethereum,
    /// Tezos ghostnet
    TezosGhostnet,
}

impl Chain {
    pub const ALL: [Chain; 2] = [Chain::Ethereum, Chain::TezosGhostnet];

    /// Numeric id used in the EIP-712 domain of orders originating on this chain.
    pub fn domain_chain_id(&self) -> u64 {
        match self {
            Chain::Ethereum => ETHEREUM_CHAIN_ID,
            Chain::TezosGhostnet => TEZOS_GHOSTNET_DOMAIN_ID,
        }
    }

    pub fn is_evm(&self) -> bool {
        matches!(self, Chain::Ethereum)
    }

    /// The identifier used on the wire: a number for EVM chains, a string otherwise.
    pub fn wire_id(&self) -> String {
        match self {
            Chain::Ethereum => ETHEREUM_CHAIN_ID.to_string(),
            Chain::TezosGhostnet => TEZOS_GHOSTNET_ID.to_string(),
        }
    }

    fn from_numeric_id(id: u64) -> Result<Self, SwapError> {
        match id {
            ETHEREUM_CHAIN_ID => Ok(Chain::Ethereum),
            other => Err(SwapError::UnsupportedChain(other.to_string())),
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chain::Ethereum => write!(f, "ethereum"),
            Chain::TezosGhostnet => write!(f, "{}", TEZOS_GHOSTNET_ID),
        }
    }
}

impl std::str::FromStr for Chain {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "evm" | "eth" | "ethereum" | "1" => Ok(Chain::Ethereum),
            "tezos" | "xtz" | "tez" | TEZOS_GHOSTNET_ID => Ok(Chain::TezosGhostnet),
            _ => Err(SwapError::UnsupportedChain(s.to_string())),
        }
    }
}

impl Serialize for Chain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Chain::Ethereum => serializer.serialize_u64(ETHEREUM_CHAIN_ID),
            Chain::TezosGhostnet => serializer.serialize_str(TEZOS_GHOSTNET_ID),
        }
    }
}

impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawChainId {
            Number(u64),
            Text(String),
        }

        match RawChainId::deserialize(deserializer)? {
            RawChainId::Number(id) => Chain::from_numeric_id(id).map_err(serde::de::Error::custom),
            RawChainId::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A chain-specific address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAddress {
    pub chain: Chain,
    pub address: String,
}

impl ChainAddress {
    pub fn new(chain: Chain, address: impl Into<String>) -> Self {
        Self {
            chain,
            address: address.into(),
        }
    }

    /// Validate the address format for the chain.
    pub fn validate(&self) -> Result<(), SwapError> {
        let invalid = |reason: String| SwapError::InvalidAddress {
            chain: self.chain,
            address: self.address.clone(),
            reason,
        };

        match self.chain {
            Chain::Ethereum => {
                // Ethereum addresses are 0x-prefixed 40-char hex strings
                if !self.address.starts_with("0x") {
                    return Err(invalid("must start with 0x".to_string()));
                }
                if self.address.len() != 42 {
                    return Err(invalid(format!(
                        "must be 42 characters, got {}",
                        self.address.len()
                    )));
                }
                if !self.address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(invalid("must be valid hex".to_string()));
                }
                Ok(())
            }
            Chain::TezosGhostnet => {
                // Implicit (tz1/tz2/tz3) and originated (KT1) accounts are
                // base58check-encoded 20-byte hashes behind a 3-byte prefix.
                let decoded = bs58::decode(&self.address)
                    .with_check(None)
                    .into_vec()
                    .map_err(|e| invalid(e.to_string()))?;
                if decoded.len() != 23 {
                    return Err(invalid(format!(
                        "decoded payload must be 23 bytes, got {}",
                        decoded.len()
                    )));
                }
                let prefix = &decoded[..3];
                if ![TZ1_PREFIX, TZ2_PREFIX, TZ3_PREFIX, KT1_PREFIX]
                    .iter()
                    .any(|p| p == prefix)
                {
                    return Err(invalid("unknown address prefix".to_string()));
                }
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for ChainAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.chain, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_parsing() {
        assert_eq!("eth".parse::<Chain>().unwrap(), Chain::Ethereum);
        assert_eq!("EVM".parse::<Chain>().unwrap(), Chain::Ethereum);
        assert_eq!("tezos".parse::<Chain>().unwrap(), Chain::TezosGhostnet);
        assert_eq!("xtz".parse::<Chain>().unwrap(), Chain::TezosGhostnet);
        assert_eq!(
            "tezos:ghostnet".parse::<Chain>().unwrap(),
            Chain::TezosGhostnet
        );
        assert!("solana".parse::<Chain>().is_err());
    }

    #[test]
    fn test_chain_wire_encoding() {
        assert_eq!(serde_json::to_string(&Chain::Ethereum).unwrap(), "1");
        assert_eq!(
            serde_json::to_string(&Chain::TezosGhostnet).unwrap(),
            "\"tezos:ghostnet\""
        );

        let eth: Chain = serde_json::from_str("1").unwrap();
        assert_eq!(eth, Chain::Ethereum);
        let tezos: Chain = serde_json::from_str("\"tezos:ghostnet\"").unwrap();
        assert_eq!(tezos, Chain::TezosGhostnet);

        assert!(serde_json::from_str::<Chain>("146").is_err());
    }

    #[test]
    fn test_eth_address_validation() {
        let valid = ChainAddress::new(
            Chain::Ethereum,
            "0x1234567890abcdef1234567890abcdef12345678",
        );
        assert!(valid.validate().is_ok());

        let no_prefix =
            ChainAddress::new(Chain::Ethereum, "1234567890abcdef1234567890abcdef12345678");
        assert!(no_prefix.validate().is_err());

        let too_short = ChainAddress::new(Chain::Ethereum, "0x1234");
        assert!(too_short.validate().is_err());
    }

    #[test]
    fn test_tezos_address_validation() {
        let token = ChainAddress::new(Chain::TezosGhostnet, "KT1Hrnr3Tn5HDCS8UU5KkDBDu4D6rjXMfkwh");
        assert!(token.validate().is_ok());

        let implicit =
            ChainAddress::new(Chain::TezosGhostnet, "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb");
        assert!(implicit.validate().is_ok());

        let corrupted =
            ChainAddress::new(Chain::TezosGhostnet, "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjc");
        assert!(corrupted.validate().is_err());

        let evm = ChainAddress::new(
            Chain::TezosGhostnet,
            "0x1234567890abcdef1234567890abcdef12345678",
        );
        assert!(evm.validate().is_err());
    }
}
