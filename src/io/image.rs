//! PNG export of collapsed maps
//!
//! Each variant gets a stable color hashed from its identity, so repeated
//! exports of the same catalog agree without a palette file. Uncollapsed
//! cells render transparent, which is what makes partial maps after a
//! terminal error legible.

use crate::catalog::variants::Variant;
use crate::io::error::{invalid_parameter, GenerationError, Result};
use image::{ImageBuffer, Rgba};
use ndarray::Array2;
use std::path::Path;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Stable display color for one variant
///
/// Channels are floored away from black so every tile is visible against
/// the transparent background.
pub fn variant_color(variant: &Variant) -> [u8; 4] {
    let hash = fnv1a(format!("{}#{}", variant.tile_id, variant.rotation).as_bytes());
    let bytes = hash.to_le_bytes();
    [
        64 + bytes[0] % 192,
        64 + bytes[1] % 192,
        64 + bytes[2] % 192,
        255,
    ]
}

/// Display colors for the whole variant list, indexed by variant
pub fn variant_colors(variants: &[Variant]) -> Vec<[u8; 4]> {
    variants.iter().map(variant_color).collect()
}

/// Export a collapsed map as a PNG
///
/// The map is shaped `(height, width)`; each cell becomes a
/// `scale x scale` pixel block. Uncollapsed cells are transparent.
///
/// # Errors
///
/// Returns an error if the map is empty, the scale is zero, a variant
/// index has no color, the parent directory cannot be created, or the
/// image cannot be saved.
pub fn export_map_png(
    map: &Array2<Option<u32>>,
    colors: &[[u8; 4]],
    scale: u32,
    output_path: &str,
) -> Result<()> {
    let (height, width) = map.dim();
    if width == 0 || height == 0 {
        return Err(invalid_parameter(
            "map",
            &format!("{width}x{height}"),
            &"cannot export an empty map",
        ));
    }
    if scale == 0 {
        return Err(invalid_parameter(
            "scale",
            &0,
            &"pixel scale must be at least 1",
        ));
    }

    let mut img = ImageBuffer::new(width as u32 * scale, height as u32 * scale);

    for ((y, x), cell) in map.indexed_iter() {
        let color = match cell {
            Some(variant) => {
                let rgba = colors.get(*variant as usize).ok_or_else(|| {
                    invalid_parameter(
                        "variant",
                        variant,
                        &format!("no color for variant index (have {})", colors.len()),
                    )
                })?;
                Rgba(*rgba)
            }
            None => Rgba([0, 0, 0, 0]),
        };
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(x as u32 * scale + dx, y as u32 * scale + dy, color);
            }
        }
    }

    if let Some(parent) = Path::new(output_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| GenerationError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }
    }

    img.save(output_path)
        .map_err(|e| GenerationError::ImageExport {
            path: output_path.into(),
            source: e,
        })?;

    Ok(())
}
