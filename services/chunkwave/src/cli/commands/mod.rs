//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a
//! specific CLI command.

pub mod chunk;
pub mod config;
pub mod detect;
pub mod simulate;

use std::path::Path;

// Re-export argument types for use in mod.rs
pub use chunk::ChunkArgs;
pub use config::ConfigArgs;
pub use detect::DetectArgs;
pub use simulate::SimulateArgs;

/// Read an input file, with a readable error when it is missing
pub(crate) fn read_input(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    std::fs::read_to_string(path).map_err(|e| {
        format!(
            "Cannot read '{}': {}. Make sure the file exists and is UTF-8 text.",
            path.display(),
            e
        )
        .into()
    })
}
