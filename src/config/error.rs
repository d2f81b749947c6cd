//! Configuration error types.

use thiserror::Error;

/// Errors detected while validating the dispatch configuration.
///
/// These are the only fatal errors in the system: they are reported before
/// any work starts and terminate the process with a non-zero exit code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Directory mode and an extension filter cannot be combined.
    #[error("directory mode (-d) cannot be combined with an extension filter (-e)")]
    DirectoryModeWithExtensions,

    /// The concurrency budget must allow at least one run in flight.
    #[error("concurrency budget must be at least 1")]
    InvalidBudget,

    /// No executable name was given.
    #[error("missing command")]
    MissingCommand,

    /// No paths were given to dispatch over.
    #[error("no paths given")]
    MissingPaths,
}
