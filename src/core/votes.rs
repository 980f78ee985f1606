//! Session-scoped community votes.
//!
//! The server-known counts live on the product record; this state holds the
//! current session's unpersisted toggle per product and applies it as an
//! optimistic delta. Nothing here talks to the network.

use std::collections::HashMap;

use crate::core::catalog::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

/// Per-session vote per product id. A user holds at most one direction per
/// product at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteState {
    entries: HashMap<u64, VoteDirection>,
}

impl VoteState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, product_id: u64) -> Option<VoteDirection> {
        self.entries.get(&product_id).copied()
    }

    /// Toggles a vote: voting the same direction twice cancels it, voting
    /// the opposite direction overwrites it.
    pub fn toggle(&mut self, product_id: u64, direction: VoteDirection) {
        if self.entries.get(&product_id) == Some(&direction) {
            self.entries.remove(&product_id);
        } else {
            self.entries.insert(product_id, direction);
        }
    }
}

/// Net community score: server counts plus the session's local vote.
pub fn net_score(product: &Product, state: &VoteState) -> i64 {
    let local = match state.get(product.id) {
        Some(VoteDirection::Up) => 1,
        Some(VoteDirection::Down) => -1,
        None => 0,
    };
    i64::from(product.votes.up) - i64::from(product.votes.down) + local
}
