//! Writing chunks to disk as individual files.

use super::classifier::ContentType;
use crate::core::error::Result;
use crate::core::types::Chunk;
use std::fs;
use std::path::{Path, PathBuf};

/// `{prefix}_{index:03}.{ext}`
pub fn chunk_file_name(prefix: &str, index: usize, content_type: ContentType) -> String {
    format!("{prefix}_{index:03}.{}", content_type.extension())
}

/// Write every chunk into `dir`, creating it if needed.
///
/// Existing files with the same names are overwritten. Returns the
/// paths in chunk order.
pub fn write_chunks(
    chunks: &[Chunk],
    dir: &Path,
    prefix: &str,
    content_type: ContentType,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let path = dir.join(chunk_file_name(prefix, chunk.index, content_type));
        fs::write(&path, &chunk.content)?;
        paths.push(path);
    }

    tracing::info!("Wrote {} chunk files to {:?}", paths.len(), dir);
    Ok(paths)
}
