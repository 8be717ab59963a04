// Copyright (c) 2024 The Botho Foundation

//! Resolver service configuration.

use fusion_swap_core::{Chain, LIMIT_ORDER_PROTOCOL};
use serde::{Deserialize, Serialize};

use crate::resolver::DEFAULT_COMPLETED_CAPACITY;

/// Main resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Ethereum connection
    pub ethereum: EthereumConfig,

    /// Tezos connection
    pub tezos: TezosConfig,

    /// Swap policy
    #[serde(default)]
    pub resolver: ResolverSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

/// Ethereum connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthereumConfig {
    /// HTTP RPC URL
    pub rpc_url: String,

    /// Chain ID (1 for mainnet and mainnet forks)
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Escrow factory address
    pub escrow_factory: String,

    /// Limit order protocol makers sign orders for
    #[serde(default = "default_limit_order_protocol")]
    pub limit_order_protocol: String,

    /// Resolver contract that fills orders and deploys escrows
    pub resolver_contract: String,

    /// Path to a file holding the hex private key of the resolver account
    pub private_key_file: Option<String>,

    /// Blocks to wait on top of the inclusion block
    #[serde(default = "default_eth_confirmations")]
    pub confirmations: u64,

    /// Upper bound for any single transaction to confirm
    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout_secs: u64,

    #[serde(default = "default_eth_gas_limit")]
    pub gas_limit: u64,
}

fn default_chain_id() -> u64 {
    1
}

fn default_limit_order_protocol() -> String {
    LIMIT_ORDER_PROTOCOL.to_checksum(None)
}

fn default_eth_confirmations() -> u64 {
    1
}

fn default_confirmation_timeout() -> u64 {
    300
}

fn default_eth_gas_limit() -> u64 {
    10_000_000
}

/// Tezos connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TezosConfig {
    /// Node RPC URL
    pub rpc_url: String,

    /// Escrow factory contract (KT1...)
    pub escrow_factory: String,

    /// Path to a file holding the `edsk` secret key of the resolver account
    pub secret_key_file: Option<String>,

    #[serde(default = "default_tezos_fee")]
    pub fee_mutez: u64,

    #[serde(default = "default_tezos_gas_limit")]
    pub gas_limit: u64,

    #[serde(default = "default_tezos_storage_limit")]
    pub storage_limit: u64,

    /// Interval between block polls while waiting for inclusion
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout_secs: u64,
}

fn default_tezos_fee() -> u64 {
    100_000 // 0.1 tez
}

fn default_tezos_gas_limit() -> u64 {
    1_040_000
}

fn default_tezos_storage_limit() -> u64 {
    60_000
}

fn default_poll_interval() -> u64 {
    2
}

/// A swap direction the resolver accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub src: Chain,
    pub dst: Chain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Accepted directions. Only Ethereum to Tezos is enabled by default.
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteConfig>,

    /// Finished orders whose final status stays queryable
    #[serde(default = "default_completed_order_capacity")]
    pub completed_order_capacity: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            routes: default_routes(),
            completed_order_capacity: default_completed_order_capacity(),
        }
    }
}

fn default_completed_order_capacity() -> usize {
    DEFAULT_COMPLETED_CAPACITY
}

fn default_routes() -> Vec<RouteConfig> {
    vec![RouteConfig {
        src: Chain::Ethereum,
        dst: Chain::TezosGhostnet,
    }]
}

impl ResolverConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            ethereum: EthereumConfig {
                rpc_url: "http://localhost:8545".to_string(),
                chain_id: default_chain_id(),
                escrow_factory: "0x0000000000000000000000000000000000000000".to_string(),
                limit_order_protocol: default_limit_order_protocol(),
                resolver_contract: "0x0000000000000000000000000000000000000000".to_string(),
                private_key_file: None,
                confirmations: default_eth_confirmations(),
                confirmation_timeout_secs: default_confirmation_timeout(),
                gas_limit: default_eth_gas_limit(),
            },
            tezos: TezosConfig {
                rpc_url: "https://rpc.ghostnet.teztnets.com".to_string(),
                escrow_factory: String::new(),
                secret_key_file: None,
                fee_mutez: default_tezos_fee(),
                gas_limit: default_tezos_gas_limit(),
                storage_limit: default_tezos_storage_limit(),
                poll_interval_secs: default_poll_interval(),
                confirmation_timeout_secs: default_confirmation_timeout(),
            },
            resolver: ResolverSettings::default(),
        }
    }
}
