// SPDX-License-Identifier: MPL-2.0
//! Archive extraction into a frame manifest.
//!
//! Every non-directory entry of a zip archive is classified by name;
//! qualifying entries are decompressed into memory and ordered naturally.
//! A single entry that fails to decompress is skipped with a warning, only
//! an unreadable archive or one with no frames fails the extraction.

use crate::domain::frame::{FrameCandidate, Manifest};
use crate::error::ExtractError;
use crate::media::classifier::{classify, classify_name};
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Local file header signature shared by every zip archive.
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Signature of an archive with no entries (end of central directory only).
const EMPTY_ZIP_MAGIC: &[u8; 4] = b"PK\x05\x06";

/// Entry names skipped during extraction, with the reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Entries that were not frames (unknown type or metadata).
    pub discarded: Vec<String>,
    /// Entries that looked like frames but could not be decompressed.
    pub failed: Vec<(String, String)>,
}

/// Returns whether `bytes` start with a zip signature.
#[must_use]
pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(EMPTY_ZIP_MAGIC)
}

/// Extracts the frames of a zip archive.
///
/// # Errors
///
/// Returns [`ExtractError::Corrupt`] when the archive cannot be parsed and
/// [`ExtractError::Empty`] when no entry qualifies as a frame.
pub fn extract(archive_bytes: &[u8]) -> Result<Manifest, ExtractError> {
    extract_with_report(archive_bytes).map(|(manifest, _)| manifest)
}

/// Like [`extract`], also returning what was left out.
///
/// # Errors
///
/// See [`extract`].
pub fn extract_with_report(
    archive_bytes: &[u8],
) -> Result<(Manifest, ExtractionReport), ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes))
        .map_err(|e| ExtractError::Corrupt(e.to_string()))?;

    let mut candidates = Vec::new();
    let mut report = ExtractionReport::default();

    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping unreadable archive entry");
                report.failed.push((format!("#{index}"), e.to_string()));
                continue;
            }
        };

        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_owned();
        let Some(kind) = classify_name(&name).kind() else {
            tracing::debug!(entry = %name, "discarding non-frame entry");
            report.discarded.push(name);
            continue;
        };

        let capacity = usize::try_from(entry.size()).unwrap_or(0);
        let mut payload = Vec::with_capacity(capacity);
        if let Err(e) = entry.read_to_end(&mut payload) {
            tracing::warn!(entry = %name, error = %e, "failed to decompress archive entry");
            report.failed.push((name, e.to_string()));
            continue;
        }

        candidates.push(FrameCandidate::new(name, payload, kind));
    }

    if candidates.is_empty() {
        return Err(ExtractError::Empty);
    }

    let manifest = Manifest::from_candidates(candidates, true);
    tracing::debug!(
        frames = manifest.total_frames(),
        discarded = report.discarded.len(),
        failed = report.failed.len(),
        "archive extracted"
    );
    Ok((manifest, report))
}

/// Builds the one-frame manifest of a non-archive reference.
///
/// # Errors
///
/// Returns [`ExtractError::Empty`] when the file is neither a structured
/// nor a raster image.
pub fn single_frame(filename: &str, bytes: Vec<u8>) -> Result<Manifest, ExtractError> {
    let kind = classify(filename, &bytes)
        .kind()
        .ok_or(ExtractError::Empty)?;
    Ok(Manifest::single(FrameCandidate::new(filename, bytes, kind)))
}
