//! TrueType font registration for chart text.
//!
//! Chart text goes through `plotters`' `ab_glyph` backend, which only knows
//! the fonts registered with it. A TTF file is read once, leaked for the
//! process lifetime and registered under the `sans-serif` family in every
//! style the charts use.

use std::path::{Path, PathBuf};

use plotters::style::{FontStyle, register_font as plotters_register_font};

use crate::error::{PerfError, Result};

/// Font family name the chart module draws with.
pub const FAMILY: &str = "sans-serif";

/// Locations tried when no font is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Candidate font paths in the order they are tried.
pub fn candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => SYSTEM_FONTS.iter().map(PathBuf::from).collect(),
    }
}

/// Register the first readable font and return its path.
///
/// An explicit path is the only candidate when given.
pub fn register_font(explicit: Option<&Path>) -> Result<PathBuf> {
    let mut tried = Vec::new();
    for path in candidates(explicit) {
        match std::fs::read(&path) {
            Ok(bytes) => {
                let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                match register_all_styles(bytes) {
                    Ok(()) => return Ok(path),
                    Err(reason) => tried.push(format!("{} ({reason})", path.display())),
                }
            }
            Err(e) => tried.push(format!("{} ({e})", path.display())),
        }
    }
    Err(PerfError::FontUnavailable { tried })
}

fn register_all_styles(bytes: &'static [u8]) -> std::result::Result<(), String> {
    for style in [
        FontStyle::Normal,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::Oblique,
    ] {
        plotters_register_font(FAMILY, style, bytes).map_err(|_| "not a TrueType font".to_string())?;
    }
    Ok(())
}
