//! Base tile definitions and ingest normalization
//!
//! A tile is an image reference, a selection weight, and four edge-rule
//! lists (one per side, N/E/S/W order). Edge keys are the compatibility
//! vocabulary: two tiles may touch across a border iff the facing sides
//! share at least one key.

use crate::spatial::Direction;
use serde::{Deserialize, Serialize};

/// One edge rule: a compatibility key and a bias weight
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRule {
    /// Normalized (trimmed, lowercased) compatibility key
    pub key: String,
    /// Positive bias weight used by neighbor-aware selection
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl EdgeRule {
    /// Create a rule with the default weight
    pub fn keyed(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            weight: default_weight(),
        }
    }
}

/// A base tile definition prior to variant expansion
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileDef {
    /// Unique, non-empty identifier
    pub id: String,
    /// Forward-slash-normalized relative image path
    pub file: String,
    /// Positive selection weight
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Edge rules per side, indexed by [`Direction`]
    pub edges: [Vec<EdgeRule>; Direction::COUNT],
}

impl TileDef {
    /// Create a tile with uniform weight and the given per-side rules
    pub fn new(
        id: impl Into<String>,
        file: impl Into<String>,
        edges: [Vec<EdgeRule>; Direction::COUNT],
    ) -> Self {
        Self {
            id: id.into(),
            file: file.into(),
            weight: default_weight(),
            edges,
        }
    }
}

const fn default_weight() -> f64 {
    1.0
}

/// Normalize an edge key: trim surrounding whitespace and lowercase
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalize a list of tiles in ingest order
///
/// Keys are trimmed and lowercased, rules with empty keys are dropped,
/// non-positive weights are coerced to 1, and file paths are
/// forward-slash-normalized. The operation is idempotent.
pub fn normalize_tiles(tiles: Vec<TileDef>) -> Vec<TileDef> {
    tiles.into_iter().map(normalize_tile).collect()
}

fn normalize_tile(mut tile: TileDef) -> TileDef {
    if tile.weight <= 0.0 {
        tile.weight = default_weight();
    }
    tile.file = tile.file.replace('\\', "/");
    for side in &mut tile.edges {
        side.retain(|rule| !rule.key.trim().is_empty());
        for rule in side.iter_mut() {
            rule.key = normalize_key(&rule.key);
            if rule.weight <= 0.0 {
                rule.weight = default_weight();
            }
        }
    }
    tile
}
