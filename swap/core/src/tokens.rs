// Copyright (c) 2024 The Botho Foundation

//! Known tokens per chain.

use std::collections::HashMap;

use alloy::primitives::{utils::parse_units, U256};
use serde::{Deserialize, Serialize};

use crate::{chains::Chain, error::SwapError, order::Asset};

/// Token standard and on-chain location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TokenKind {
    /// The chain's native currency (ETH, XTZ)
    #[serde(rename = "native")]
    Native,
    #[serde(rename = "erc-20")]
    Erc20 { address: String },
    #[serde(rename = "fa1.2")]
    Fa12 { address: String },
    #[serde(rename = "fa2")]
    Fa2 { address: String, token_id: u64 },
}

impl TokenKind {
    pub fn is_native(&self) -> bool {
        matches!(self, TokenKind::Native)
    }

    pub fn supported_on(&self, chain: Chain) -> bool {
        match self {
            TokenKind::Native => true,
            TokenKind::Erc20 { .. } => chain.is_evm(),
            TokenKind::Fa12 { .. } | TokenKind::Fa2 { .. } => !chain.is_evm(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub decimals: u8,
    #[serde(flatten)]
    pub kind: TokenKind,
}

impl Token {
    pub fn native(symbol: &str, decimals: u8) -> Self {
        Self {
            symbol: symbol.to_string(),
            decimals,
            kind: TokenKind::Native,
        }
    }

    pub fn erc20(symbol: &str, decimals: u8, address: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            decimals,
            kind: TokenKind::Erc20 {
                address: address.to_string(),
            },
        }
    }

    pub fn fa12(symbol: &str, decimals: u8, address: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            decimals,
            kind: TokenKind::Fa12 {
                address: address.to_string(),
            },
        }
    }

    /// Parse a human amount such as `"100.5"` into base units.
    pub fn parse_amount(&self, amount: &str) -> Result<U256, SwapError> {
        let amount = amount.trim();
        let invalid = |reason: String| SwapError::InvalidAmount {
            field: "amount",
            reason,
        };

        if amount.starts_with('-') {
            return Err(invalid(format!("{} is negative", amount)));
        }
        let parsed = parse_units(amount, self.decimals)
            .map_err(|e| invalid(format!("{:?}: {}", amount, e)))?
            .get_absolute();
        if parsed.is_zero() {
            return Err(invalid("must be positive".to_string()));
        }
        Ok(parsed)
    }
}

/// Symbol-indexed token lists per chain.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<Chain, Vec<Token>>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tokens the swap contracts were deployed with.
    pub fn defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(Chain::Ethereum, Token::native("ETH", 18));
        registry.insert(
            Chain::Ethereum,
            Token::erc20("USDC", 6, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
        );
        registry.insert(Chain::TezosGhostnet, Token::native("XTZ", 6));
        registry.insert(
            Chain::TezosGhostnet,
            Token::fa12("USDT", 6, "KT1Hrnr3Tn5HDCS8UU5KkDBDu4D6rjXMfkwh"),
        );
        registry
    }

    /// Add a token, replacing any token with the same symbol on that chain.
    pub fn insert(&mut self, chain: Chain, token: Token) {
        let tokens = self.tokens.entry(chain).or_default();
        tokens.retain(|t| !t.symbol.eq_ignore_ascii_case(&token.symbol));
        tokens.push(token);
    }

    pub fn tokens(&self, chain: Chain) -> &[Token] {
        self.tokens.get(&chain).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up a token by case-insensitive symbol.
    pub fn find(&self, chain: Chain, symbol: &str) -> Result<&Token, SwapError> {
        self.tokens(chain)
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| SwapError::TokenNotFound {
                chain,
                symbol: symbol.to_string(),
            })
    }

    /// The order asset for a token. Native currencies cannot be escrowed
    /// through the factory and are rejected.
    pub fn asset(&self, chain: Chain, symbol: &str) -> Result<(Asset, &Token), SwapError> {
        let token = self.find(chain, symbol)?;
        let asset = match &token.kind {
            TokenKind::Native => {
                return Err(SwapError::NativeTokenUnsupported {
                    chain,
                    symbol: token.symbol.clone(),
                })
            }
            TokenKind::Erc20 { address } | TokenKind::Fa12 { address } => Asset::new(address),
            TokenKind::Fa2 { address, token_id } => {
                Asset::with_token_id(address, U256::from(*token_id))
            }
        };
        Ok((asset, token))
    }
}
