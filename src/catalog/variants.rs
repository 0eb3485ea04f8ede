//! Variant expansion: rotations, deduplication, and edge-key maps
//!
//! The ordered variant list produced here defines every bit position used
//! by the rest of the engine, so expansion order is stable: variants appear
//! in the order they were first generated and duplicates keep the earliest
//! occurrence.

use crate::catalog::tiles::{EdgeRule, TileDef};
use crate::spatial::Direction;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::Write as _;

/// A concrete placeable unit: a base tile plus a fixed rotation
#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    /// Identifier of the base tile
    pub tile_id: String,
    /// Image file reference shared with the base tile
    pub file: String,
    /// Number of 90° clockwise rotations applied to the base edges
    pub rotation: u8,
    /// Selection weight carried over from the base tile
    pub weight: f64,
    /// Rotated edge-rule lists, indexed by [`Direction`]
    pub sides: [Vec<EdgeRule>; Direction::COUNT],
    /// Per-side map from edge key to the maximum rule weight for that key
    side_keys: [HashMap<String, f64>; Direction::COUNT],
}

impl Variant {
    fn from_sides(tile: &TileDef, rotation: u8, sides: [Vec<EdgeRule>; Direction::COUNT]) -> Self {
        let side_keys = build_key_maps(&sides);
        Self {
            tile_id: tile.id.clone(),
            file: tile.file.clone(),
            rotation,
            weight: tile.weight,
            sides,
            side_keys,
        }
    }

    /// Maximum rule weight recorded for `key` on the given side, or 0
    pub fn key_weight(&self, direction: Direction, key: &str) -> f64 {
        self.side_keys
            .get(direction.index())
            .and_then(|keys| keys.get(key))
            .copied()
            .unwrap_or(0.0)
    }

    /// Whether `other` may sit on the `direction` side of this variant
    ///
    /// The facing sides must share at least one edge key; an empty side
    /// makes the pair incompatible.
    pub fn fits(&self, direction: Direction, other: &Self) -> bool {
        let Some(own) = self.side_keys.get(direction.index()) else {
            return false;
        };
        let Some(facing) = other.side_keys.get(direction.opposite().index()) else {
            return false;
        };
        if own.is_empty() || facing.is_empty() {
            return false;
        }
        // Probe the smaller map against the larger one
        let (small, large) = if own.len() <= facing.len() {
            (own, facing)
        } else {
            (facing, own)
        };
        small.keys().any(|key| large.contains_key(key))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.tile_id, u32::from(self.rotation) * 90)
    }
}

/// Expand normalized tiles into the ordered variant list
///
/// With rotation disabled every tile yields exactly one variant. With
/// rotation enabled the three further 90° clockwise rotations are
/// generated, suppressing `(file, edges)` duplicates so symmetric tiles
/// don't inflate the catalog.
pub fn expand_variants(tiles: &[TileDef], allow_rotate: bool) -> Vec<Variant> {
    let mut variants = Vec::new();
    let mut seen = HashSet::new();
    let rotations = if allow_rotate { 4u8 } else { 1u8 };

    for tile in tiles {
        let mut sides = tile.edges.clone();
        for rotation in 0..rotations {
            if rotation > 0 {
                sides = rotate_sides_cw(&sides);
            }
            if seen.insert(dedup_signature(&tile.file, &sides)) {
                variants.push(Variant::from_sides(tile, rotation, sides.clone()));
            }
        }
    }

    variants
}

/// Rotate edge lists by 90° clockwise: N←W, E←N, S←E, W←S
fn rotate_sides_cw(sides: &[Vec<EdgeRule>; Direction::COUNT]) -> [Vec<EdgeRule>; Direction::COUNT] {
    [
        sides[Direction::West.index()].clone(),
        sides[Direction::North.index()].clone(),
        sides[Direction::East.index()].clone(),
        sides[Direction::South.index()].clone(),
    ]
}

// Signature format: file + per-side "key:weight" runs. Weight participates
// because two rules differing only in weight are distinct catalog entries.
fn dedup_signature(file: &str, sides: &[Vec<EdgeRule>; Direction::COUNT]) -> String {
    let mut signature = String::from(file);
    for side in sides {
        signature.push(';');
        for rule in side {
            let _ = write!(signature, "{}:{}|", rule.key, rule.weight);
        }
    }
    signature
}

fn build_key_maps(
    sides: &[Vec<EdgeRule>; Direction::COUNT],
) -> [HashMap<String, f64>; Direction::COUNT] {
    let mut maps: [HashMap<String, f64>; Direction::COUNT] = Default::default();
    for (side, map) in sides.iter().zip(maps.iter_mut()) {
        for rule in side {
            let entry = map.entry(rule.key.clone()).or_insert(rule.weight);
            if rule.weight > *entry {
                *entry = rule.weight;
            }
        }
    }
    maps
}
