//! DRY ledger command-line client

mod commands;

use clap::Parser;
use commands::Cli;
use std::process::exit;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays scriptable
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(cli.verbosity, rust_log.as_deref()))
        .init();

    let result = cli
        .ledger_config()
        .and_then(|config| cli.command.parse(&config));

    match result {
        Ok(output) => println!("{output}"),
        Err(error) => {
            eprintln!("{error:#}");
            exit(1);
        }
    }
}

/// `RUST_LOG` wins unless `-v` is given, which then sets the default level
fn log_filter(verbosity: u8, rust_log: Option<&str>) -> EnvFilter {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    match rust_log.filter(|directives| !directives.is_empty()) {
        Some(directives) if verbosity == 0 => EnvFilter::new(directives),
        Some(directives) => EnvFilter::new(directives).add_directive(level.into()),
        None => EnvFilter::default().add_directive(level.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_rust_log_honoured_without_verbosity() {
        let filter = log_filter(0, Some("debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_verbosity_sets_default_level() {
        assert_eq!(log_filter(0, None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(1, Some("")).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(2, Some("warn")).max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
