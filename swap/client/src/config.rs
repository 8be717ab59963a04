// Copyright (c) 2024 The Botho Foundation

//! Maker client configuration.

use fusion_swap_core::{
    dto::parse_u256, Address, Chain, OrderPolicy, TimeLocks, Token, TokenRegistry,
    LIMIT_ORDER_PROTOCOL,
};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the resolver HTTP API
    #[serde(default = "default_resolver_url")]
    pub resolver_url: String,

    /// Source chain connection and maker account
    #[serde(default)]
    pub ethereum: EthereumClientConfig,

    /// Destination chain counterparty
    #[serde(default)]
    pub tezos: TezosClientConfig,

    /// Tokens added to (or replacing) the built-in registry
    #[serde(default)]
    pub tokens: TokenLists,

    /// Order policy overrides
    #[serde(default)]
    pub policy: PolicyConfig,
}

fn default_resolver_url() -> String {
    "http://localhost:8080".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthereumClientConfig {
    /// HTTP RPC URL, used to read the latest block timestamp
    #[serde(default = "default_eth_rpc_url")]
    pub rpc_url: String,

    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Escrow factory orders are bound to
    #[serde(default)]
    pub escrow_factory: String,

    /// Limit order protocol the maker signs for
    #[serde(default = "default_limit_order_protocol")]
    pub limit_order_protocol: String,

    /// Path to a file holding the hex private key of the maker
    pub maker_key_file: Option<String>,
}

impl Default for EthereumClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_eth_rpc_url(),
            chain_id: default_chain_id(),
            escrow_factory: String::new(),
            limit_order_protocol: default_limit_order_protocol(),
            maker_key_file: None,
        }
    }
}

fn default_eth_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

fn default_chain_id() -> u64 {
    1
}

fn default_limit_order_protocol() -> String {
    LIMIT_ORDER_PROTOCOL.to_checksum(None)
}

impl EthereumClientConfig {
    pub fn limit_order_protocol(&self) -> Result<Address, ClientError> {
        self.limit_order_protocol.parse().map_err(|e| {
            ClientError::Config(format!(
                "ethereum.limit_order_protocol {:?}: {}",
                self.limit_order_protocol, e
            ))
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TezosClientConfig {
    /// Implicit account of the resolver that fills on Tezos (tz1...)
    #[serde(default)]
    pub resolver_address: String,

    /// Maker account that receives the destination funds
    pub receiver: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenLists {
    #[serde(default)]
    pub ethereum: Vec<Token>,
    #[serde(default)]
    pub tezos: Vec<Token>,
}

impl TokenLists {
    /// The built-in registry extended with the configured tokens.
    pub fn registry(&self) -> TokenRegistry {
        let mut registry = TokenRegistry::defaults();
        for token in &self.ethereum {
            registry.insert(Chain::Ethereum, token.clone());
        }
        for token in &self.tezos {
            registry.insert(Chain::TezosGhostnet, token.clone());
        }
        registry
    }
}

/// Overrides of [`OrderPolicy`]. Unset fields keep the built-in value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub time_locks: Option<TimeLocks>,

    /// Wei, decimal string
    pub ethereum_safety_deposit: Option<String>,

    /// Mutez, decimal string
    pub tezos_safety_deposit: Option<String>,

    /// Auction duration in seconds
    pub auction_duration: Option<u64>,
}

impl PolicyConfig {
    pub fn to_policy(&self) -> Result<OrderPolicy, ClientError> {
        let mut policy = OrderPolicy::default();

        if let Some(time_locks) = self.time_locks {
            time_locks.validate()?;
            policy.time_locks = time_locks;
        }
        if let Some(deposit) = &self.ethereum_safety_deposit {
            policy.safety_deposits.insert(
                Chain::Ethereum,
                parse_u256("policy.ethereum_safety_deposit", deposit)?,
            );
        }
        if let Some(deposit) = &self.tezos_safety_deposit {
            policy.safety_deposits.insert(
                Chain::TezosGhostnet,
                parse_u256("policy.tezos_safety_deposit", deposit)?,
            );
        }
        if let Some(duration) = self.auction_duration {
            policy.auction_duration = duration;
        }
        Ok(policy)
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Check the settings an order cannot be built without.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.ethereum.escrow_factory.is_empty() {
            return Err(ClientError::Config(
                "ethereum.escrow_factory is not set".to_string(),
            ));
        }
        if self.tezos.resolver_address.is_empty() {
            return Err(ClientError::Config(
                "tezos.resolver_address is not set".to_string(),
            ));
        }
        self.ethereum.limit_order_protocol()?;
        if self.ethereum.chain_id != Chain::Ethereum.domain_chain_id() {
            return Err(ClientError::Config(format!(
                "ethereum.chain_id {} is not supported, expected {}",
                self.ethereum.chain_id,
                Chain::Ethereum.domain_chain_id()
            )));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            resolver_url: default_resolver_url(),
            ethereum: EthereumClientConfig::default(),
            tezos: TezosClientConfig::default(),
            tokens: TokenLists::default(),
            policy: PolicyConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_swap_core::{TokenKind, U256};
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.resolver_url, "http://localhost:8080");
        assert_eq!(config.ethereum.chain_id, 1);
        assert_eq!(config.ethereum.limit_order_protocol().unwrap(), LIMIT_ORDER_PROTOCOL);
        assert!(config.validate().is_err());
        assert_eq!(config.policy.to_policy().unwrap(), OrderPolicy::default());
    }

    #[test]
    fn test_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
resolver_url = "http://resolver.local:8080"

[ethereum]
rpc_url = "http://127.0.0.1:8545"
escrow_factory = "0x1111111111111111111111111111111111111111"
maker_key_file = "/etc/fusion/maker.key"

[tezos]
resolver_address = "tz1c8PEDNfj6UxoQM2XCyfTHM5KbGGgoqDrH"
receiver = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb"

[[tokens.ethereum]]
symbol = "DAI"
decimals = 18
type = "erc-20"
address = "0x6B175474E89094C44Da98b954EedeAC495271d0F"

[[tokens.tezos]]
symbol = "kUSD"
decimals = 18
type = "fa2"
address = "KT1K9gCRgaLRFKTErYt1wVxA3Frb9FjasjTV"
token_id = 0

[policy]
ethereum_safety_deposit = "2000000000000000"
auction_duration = 300

[policy.time_locks]
src_withdrawal = 10
src_public_withdrawal = 200
src_cancellation = 201
src_public_cancellation = 202
dst_withdrawal = 10
dst_public_withdrawal = 150
dst_cancellation = 151
"#
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolver_url, "http://resolver.local:8080");
        assert_eq!(config.ethereum.maker_key_file.as_deref(), Some("/etc/fusion/maker.key"));
        assert_eq!(
            config.tezos.receiver.as_deref(),
            Some("tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb")
        );

        let registry = config.tokens.registry();
        assert_eq!(registry.find(Chain::Ethereum, "dai").unwrap().decimals, 18);
        assert!(registry.find(Chain::Ethereum, "USDC").is_ok());
        assert!(matches!(
            registry.find(Chain::TezosGhostnet, "kUSD").unwrap().kind,
            TokenKind::Fa2 { token_id: 0, .. }
        ));

        let policy = config.policy.to_policy().unwrap();
        assert_eq!(policy.time_locks.src_cancellation, 201);
        assert_eq!(policy.auction_duration, 300);
        assert_eq!(
            policy.safety_deposit(Chain::Ethereum),
            U256::from(2_000_000_000_000_000u64)
        );
        assert_eq!(policy.safety_deposit(Chain::TezosGhostnet), U256::from(1_000u64));
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let policy = PolicyConfig {
            time_locks: Some(TimeLocks {
                src_withdrawal: 100,
                src_public_withdrawal: 50,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(policy.to_policy(), Err(ClientError::Swap(_))));

        let policy = PolicyConfig {
            tezos_safety_deposit: Some("lots".to_string()),
            ..Default::default()
        };
        assert!(policy.to_policy().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ClientConfig::from_file("/nonexistent/client.toml").unwrap_err();
        assert!(err.starts_with("Failed to read config"));
    }
}
