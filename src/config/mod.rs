//! Dispatch configuration.
//!
//! Every knob is parsed once at startup into an immutable [`DispatchConfig`]
//! that components receive at construction. Nothing in this crate reads
//! configuration from global mutable state.

mod error;

pub use error::ConfigError;

use std::collections::HashSet;
use std::path::PathBuf;

use crate::core::filter::PathFilter;
use crate::core::types::CommandSpec;

/// Default concurrency budget when `-P` is not given.
pub const DEFAULT_PARALLEL: usize = 2;

/// Immutable configuration for one dispatch pass.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Executable to run once per path.
    pub command: String,
    /// Fixed arguments passed before any per-task path.
    pub args: Vec<String>,
    /// Explicit paths, or traversal roots in recursive mode.
    pub paths: Vec<PathBuf>,
    /// Maximum simultaneous command executions.
    pub parallel: usize,
    /// Walk the given paths recursively instead of using them directly.
    pub recursive: bool,
    /// Normalized extension filter for recursive file traversal.
    pub extensions: Option<HashSet<String>>,
    /// Discovered directories, not files, are the units of work.
    pub directory_mode: bool,
    /// Run the command with each discovered directory as its working
    /// directory instead of appending the path as an argument.
    pub cwd_mode: bool,
}

impl DispatchConfig {
    /// Check the flag combinations the CLI cannot express as clap
    /// constraints. Called before any work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command.is_empty() {
            return Err(ConfigError::MissingCommand);
        }
        if self.paths.is_empty() {
            return Err(ConfigError::MissingPaths);
        }
        if self.parallel == 0 {
            return Err(ConfigError::InvalidBudget);
        }
        if self.directory_mode && self.extensions.is_some() {
            return Err(ConfigError::DirectoryModeWithExtensions);
        }
        Ok(())
    }

    /// The command every worker shares.
    pub fn command_spec(&self) -> CommandSpec {
        CommandSpec::new(&self.command, self.args.clone())
    }

    /// The filter recursive traversal applies to each visited entry.
    pub fn filter(&self) -> PathFilter {
        if self.directory_mode {
            PathFilter::Directories
        } else {
            match &self.extensions {
                Some(set) => PathFilter::with_extensions(set.clone()),
                None => PathFilter::all_files(),
            }
        }
    }
}

/// Split the single command-argument string the CLI receives on whitespace.
pub fn split_command_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_owned).collect()
}

/// Normalize a comma-separated extension list: lower-case, dot-prefixed.
///
/// Empty input (or input that normalizes to nothing) means "match every
/// file" and yields `None`.
pub fn parse_extensions(raw: &str) -> Option<HashSet<String>> {
    let set: HashSet<String> = raw
        .split(',')
        .filter_map(|segment| {
            let ext = segment.trim().trim_start_matches('.').to_lowercase();
            if ext.is_empty() {
                None
            } else {
                Some(format!(".{ext}"))
            }
        })
        .collect();
    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}
