//! Ordered list of agent configurations, cheapest first.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODELS: [&str; 9] = [
    "gpt-4.1-nano",
    "gpt-4o-mini",
    "gpt-4.1-mini",
    "o1-mini",
    "o4-mini",
    "o3-mini",
    "gpt-4.1",
    "o3",
    "gpt-4o",
];

/// Tier after `current`, wrapping to the default tier past the end.
pub fn next_tier(current: usize, len: usize) -> usize {
    if current + 1 < len {
        current + 1
    } else {
        0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelLadder {
    tiers: Vec<String>,
}

impl Default for ModelLadder {
    fn default() -> Self {
        Self::new(DEFAULT_MODELS.iter().map(|m| m.to_string()).collect())
    }
}

impl ModelLadder {
    /// An empty list falls back to the default ladder.
    pub fn new(tiers: Vec<String>) -> Self {
        if tiers.is_empty() {
            return Self::default();
        }
        Self { tiers }
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Index of `name`, or the default tier when unknown.
    pub fn tier_of(&self, name: Option<&str>) -> usize {
        name.and_then(|n| self.tiers.iter().position(|t| t == n))
            .unwrap_or(0)
    }

    pub fn model(&self, tier: usize) -> &str {
        self.tiers
            .get(tier)
            .or_else(|| self.tiers.first())
            .map(String::as_str)
            .unwrap_or(DEFAULT_MODELS[0])
    }

    pub fn tiers(&self) -> &[String] {
        &self.tiers
    }
}
