//! Track format decoders
//!
//! Each supported track format implements the [`TrackDecoder`] port. The
//! decoder is chosen from the file extension.

use std::path::Path;

use crate::ports::TrackDecoder;

pub mod gpx;

pub use self::gpx::GpxTrackDecoder;

/// File extensions with a registered decoder
pub const SUPPORTED_EXTENSIONS: &[&str] = &["gpx"];

/// True if the file name carries a supported track extension (case-insensitive)
pub fn is_supported(filename: &str) -> bool {
    extension_of(filename)
        .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(&ext)))
        .unwrap_or(false)
}

/// Pick a decoder for a path based on its extension
pub fn decoder_for_path(path: &Path) -> Option<Box<dyn TrackDecoder>> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "gpx" => Some(Box::new(GpxTrackDecoder)),
        _ => None,
    }
}

fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_string())
}
