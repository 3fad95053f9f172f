//! Configuration errors raised before or while documenting a file.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// No language profile is registered for the file's extension.
    #[error("no language profile for {}", .0.display())]
    UnknownLanguage(PathBuf),

    /// An output path without a usable file name.
    #[error("malformed documentation path: {}", .0.display())]
    MalformedPath(PathBuf),

    #[error("unknown format: {0}. Use html or json")]
    UnknownFormat(String),

    /// An input file that does not live under the source root.
    #[error("{} is outside the source root {}", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// Two inputs that would be written to the same page.
    #[error(
        "{} and {} both map to {}",
        .first.display(),
        .second.display(),
        .output.display()
    )]
    OutputCollision {
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
    },
}
