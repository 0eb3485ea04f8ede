//! Persisted tileset catalog ingest
//!
//! The on-disk format is versioned JSON (version 2). Format problems never
//! reach the engine: a wrong version or unparseable file is archived next
//! to the original with a timestamped suffix and an empty catalog is
//! returned, matching the recovery behavior hosts rely on.

use crate::catalog::tiles::{normalize_tiles, EdgeRule, TileDef};
use crate::io::configuration::{ARCHIVE_SUFFIX, DEFAULT_TILE_SIZE, SUPPORTED_CATALOG_VERSION};
use crate::io::error::Result;
use crate::spatial::Direction;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// A loaded, normalized catalog
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogData {
    /// Tile edge length in pixels, for renderers
    pub tile_size: u32,
    /// Normalized tile definitions in file order
    pub tiles: Vec<TileDef>,
}

impl CatalogData {
    /// The catalog used when no usable file exists
    pub fn empty() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            tiles: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    meta: MetaSection,
    #[serde(default)]
    tiles: Vec<TileEntry>,
}

#[derive(Default, Deserialize)]
struct MetaSection {
    #[serde(default)]
    version: u32,
    #[serde(rename = "tileSize", default = "default_tile_size")]
    tile_size: u32,
}

#[derive(Deserialize)]
struct TileEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    file: String,
    #[serde(default = "default_entry_weight")]
    weight: f64,
    #[serde(default)]
    edges: EdgeSection,
}

#[derive(Default, Deserialize)]
struct EdgeSection {
    #[serde(default)]
    n: Vec<EdgeEntry>,
    #[serde(default)]
    e: Vec<EdgeEntry>,
    #[serde(default)]
    s: Vec<EdgeEntry>,
    #[serde(default)]
    w: Vec<EdgeEntry>,
}

#[derive(Deserialize)]
struct EdgeEntry {
    #[serde(default)]
    key: String,
    #[serde(default = "default_entry_weight")]
    weight: f64,
}

const fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

const fn default_entry_weight() -> f64 {
    1.0
}

/// Load and normalize a catalog file
///
/// A missing file yields an empty catalog. A file that fails to parse or
/// carries the wrong `meta.version` is archived and an empty catalog is
/// returned; only filesystem-level read failures surface as errors.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
#[allow(clippy::print_stderr)]
pub fn load_catalog(path: &Path) -> Result<CatalogData> {
    if !path.exists() {
        return Ok(CatalogData::empty());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| {
        crate::io::error::GenerationError::FileSystem {
            path: path.to_path_buf(),
            operation: "read catalog",
            source,
        }
    })?;

    let parsed: CatalogFile = match serde_json::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(error) => {
            eprintln!("Catalog '{}' is not valid JSON: {error}", path.display());
            archive_catalog(path);
            return Ok(CatalogData::empty());
        }
    };

    if parsed.meta.version != SUPPORTED_CATALOG_VERSION {
        eprintln!(
            "Catalog '{}' has unsupported version {} (expected {})",
            path.display(),
            parsed.meta.version,
            SUPPORTED_CATALOG_VERSION
        );
        archive_catalog(path);
        return Ok(CatalogData::empty());
    }

    let mut seen_ids = HashSet::new();
    let mut tiles = Vec::with_capacity(parsed.tiles.len());
    for entry in parsed.tiles {
        if entry.id.trim().is_empty() || entry.file.trim().is_empty() {
            eprintln!(
                "Catalog '{}': dropping entry with empty id or file",
                path.display()
            );
            continue;
        }
        if !seen_ids.insert(entry.id.clone()) {
            eprintln!(
                "Catalog '{}': dropping duplicate tile id '{}'",
                path.display(),
                entry.id
            );
            continue;
        }
        tiles.push(convert_entry(entry));
    }

    Ok(CatalogData {
        tile_size: parsed.meta.tile_size,
        tiles: normalize_tiles(tiles),
    })
}

fn convert_entry(entry: TileEntry) -> TileDef {
    let mut edges: [Vec<EdgeRule>; Direction::COUNT] = Default::default();
    let sections = [entry.edges.n, entry.edges.e, entry.edges.s, entry.edges.w];
    for (side, section) in edges.iter_mut().zip(sections) {
        *side = section
            .into_iter()
            .map(|rule| EdgeRule {
                key: rule.key,
                weight: rule.weight,
            })
            .collect();
    }

    TileDef {
        id: entry.id,
        file: entry.file,
        weight: entry.weight,
        edges,
    }
}

/// Path a bad catalog is moved to: `<name>.<unix-seconds>.bak`
pub fn archive_path(path: &Path, stamp: u64) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "catalog.json".to_string());
    let archived = format!("{name}.{stamp}.{ARCHIVE_SUFFIX}");
    path.parent()
        .map_or_else(|| PathBuf::from(&archived), |parent| parent.join(&archived))
}

// Best effort: a failed archive must not block the empty-catalog recovery.
#[allow(clippy::print_stderr)]
fn archive_catalog(path: &Path) {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    let target = archive_path(path, stamp);
    if let Err(error) = std::fs::rename(path, &target) {
        eprintln!(
            "Failed to archive bad catalog '{}' to '{}': {error}",
            path.display(),
            target.display()
        );
    }
}
