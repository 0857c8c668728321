//! Trader Pool: append-only set of authenticated identities.
//!
//! Written by the sequential login phase, read concurrently by the order
//! wave. Entries are never removed or replaced, so an index handed out once
//! stays valid for the whole process.

use std::sync::Arc;

use rand::rngs::OsRng;
use rand::Rng;
use tokio::sync::RwLock;

use super::types::Trader;

#[derive(Debug, Clone, Default)]
pub struct TraderPool {
    traders: Arc<RwLock<Vec<Arc<Trader>>>>,
}

impl TraderPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a trader and return its index.
    pub async fn append(&self, trader: Trader) -> usize {
        let mut traders = self.traders.write().await;
        traders.push(Arc::new(trader));
        traders.len() - 1
    }

    pub async fn get(&self, index: usize) -> Option<Arc<Trader>> {
        self.traders.read().await.get(index).cloned()
    }

    pub async fn size(&self) -> usize {
        self.traders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.traders.read().await.is_empty()
    }

    /// Uniformly pick a trader using the OS CSPRNG.
    /// Index and lookup happen under one read guard.
    pub async fn pick_random(&self) -> Option<(usize, Arc<Trader>)> {
        let traders = self.traders.read().await;
        let index = random_index(traders.len())?;
        Some((index, Arc::clone(&traders[index])))
    }

    pub async fn usernames(&self) -> Vec<String> {
        self.traders
            .read()
            .await
            .iter()
            .map(|t| t.username.clone())
            .collect()
    }
}

/// Uniform index in `[0, len)`; `None` when `len == 0`.
pub fn random_index(len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(OsRng.gen_range(0..len))
}
