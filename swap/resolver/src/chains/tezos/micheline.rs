// Copyright (c) 2024 The Botho Foundation

//! Micheline JSON builders for escrow entrypoint parameters.

use fusion_swap_core::{Immutables, Stage, U256};
use serde_json::{json, Value};

pub fn bytes(value: &[u8]) -> Value {
    json!({ "bytes": hex::encode(value) })
}

pub fn string(value: &str) -> Value {
    json!({ "string": value })
}

pub fn int(value: impl ToString) -> Value {
    json!({ "int": value.to_string() })
}

pub fn unit() -> Value {
    json!({ "prim": "Unit" })
}

pub fn left(value: Value) -> Value {
    json!({ "prim": "Left", "args": [value] })
}

pub fn right(value: Value) -> Value {
    json!({ "prim": "Right", "args": [value] })
}

/// Right-comb pair. Two or more fields are written as a flat `Pair` which
/// the node expands into nested pairs.
pub fn pair(values: Vec<Value>) -> Value {
    json!({ "prim": "Pair", "args": values })
}

/// Token variant. The or-type annotations are sorted, giving
/// `fA12 | (fA2 | tEZ)`. An empty address or `tez` means native tez.
pub fn token(address: &str, token_id: Option<U256>) -> Value {
    if address.is_empty() || address.eq_ignore_ascii_case("tez") {
        return right(right(unit()));
    }
    match token_id {
        Some(id) => right(left(pair(vec![string(address), int(id)]))),
        None => left(string(address)),
    }
}

/// Per-stage deadlines in milliseconds, as the escrow compares them against
/// `Tezos.get_now()` converted to milliseconds.
pub fn timelocks(immutables: &Immutables) -> Value {
    let deployed_at = immutables.deployed_at.unwrap_or_default();
    let deadlines = Stage::ALL
        .iter()
        .map(|stage| int(immutables.time_locks.deadline(deployed_at, *stage) * 1000))
        .collect();
    pair(deadlines)
}

/// Escrow immutables record in field order.
pub fn immutables(immutables: &Immutables) -> Value {
    pair(vec![
        bytes(immutables.order_hash.as_slice()),
        bytes(immutables.hash_lock.as_b256().as_slice()),
        string(&immutables.maker),
        string(&immutables.taker),
        token(&immutables.token, immutables.token_id),
        int(immutables.amount),
        int(immutables.safety_deposit),
        timelocks(immutables),
    ])
}
