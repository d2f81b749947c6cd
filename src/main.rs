//! fanrun - run a command over many paths with bounded concurrency.
//!
//! Usage:
//!   fanrun [OPTIONS] <COMMAND> <COMMAND_ARGS> <PATH>...
//!
//! Each path (given directly, or discovered with -r) gets one run of the
//! command, with at most -P runs in flight. Output is decoded from
//! Shift-JIS and serialized so runs never interleave.

use clap::Parser;
use fanrun::{
    config, CommandRunner, DispatchConfig, Dispatcher, LogFileSink, OutputSink, PathSource,
    StdoutSink,
};
use std::path::PathBuf;
use tracing::{error, info};

/// fanrun - a concurrency-bounded command dispatcher
#[derive(Parser)]
#[command(name = "fanrun")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Maximum simultaneous command executions
    #[arg(short = 'P', value_name = "N", default_value_t = config::DEFAULT_PARALLEL)]
    parallel: usize,

    /// Walk the given paths recursively and dispatch over discovered entries
    #[arg(short = 'r')]
    recursive: bool,

    /// Restrict recursive file traversal to these extensions,
    /// comma-separated without spaces (e.g. png,jpg)
    #[arg(short = 'e', value_name = "EXT1,EXT2", conflicts_with = "directory_mode")]
    extensions: Option<String>,

    /// Treat discovered directories, not files, as the units of work
    #[arg(short = 'd')]
    directory_mode: bool,

    /// With -r/-d, run the command inside each discovered directory instead
    /// of appending it as an argument
    #[arg(short = 'c')]
    cwd_mode: bool,

    /// Append output to a log file next to the executable instead of stdout
    #[arg(short = 'l', long = "log")]
    log: bool,

    /// Executable to run once per path
    #[arg(value_name = "COMMAND")]
    command: String,

    /// Arguments for the command, as a single string split on whitespace
    #[arg(value_name = "COMMAND_ARGS", allow_hyphen_values = true)]
    command_args: String,

    /// Paths to dispatch over (traversal roots with -r)
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr; the sink owns stdout.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            // Bad invocation: usage text, exit 1, before any work starts.
            let _ = err.print();
            std::process::exit(1);
        }
        // --help / --version go to stdout and exit 0.
        Err(err) => err.exit(),
    };

    let config = DispatchConfig {
        command: cli.command,
        args: config::split_command_args(&cli.command_args),
        paths: cli.paths,
        parallel: cli.parallel,
        recursive: cli.recursive,
        extensions: cli.extensions.as_deref().and_then(config::parse_extensions),
        directory_mode: cli.directory_mode,
        cwd_mode: cli.cwd_mode,
    };
    if let Err(err) = config.validate() {
        error!(error = %err, "invalid configuration");
        std::process::exit(1);
    }

    let sink: Box<dyn OutputSink> = if cli.log {
        match LogFileSink::beside_executable().await {
            Ok(sink) => {
                info!(path = %sink.path().display(), "writing output to log file");
                Box::new(sink)
            }
            Err(err) => {
                error!(error = %err, "failed to open log file");
                std::process::exit(1);
            }
        }
    } else {
        Box::new(StdoutSink::new())
    };

    let source = if config.recursive {
        PathSource::recursive(config.paths.clone(), config.filter())
    } else {
        PathSource::flat(config.paths.clone())
    };

    let runner = CommandRunner::new(config.command_spec(), config.cwd_mode);
    let dispatcher = Dispatcher::new(runner, config.parallel);

    let summary = dispatcher.dispatch(source, sink).await;
    info!(
        launched = summary.launched,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "dispatch complete"
    );
    // Per-run failures were reported in the output stream; the exit code
    // stays 0 once dispatch has fully drained.
}
