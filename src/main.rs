//! The herald of a single greeting.
//!
//! Makes sure a bot is in a Slack channel, posts a message there, and replies
//! to it in a thread. Run once; any failure along the way exits with `1`.
//!
//! See [workflow] for the steps and [config] for how they're configured.

use clap::Parser;
use config::Config;
use dotenvy::dotenv;
use dump::Dumps;
use error::Failure;
use slack::api::SlackClient;
use std::{env, fs::OpenOptions, io, path::Path, path::PathBuf, process::ExitCode, sync::Arc};
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{fmt, prelude::*};
use workflow::{Context, Runner};

mod config;
mod de;
mod dump;
mod error;
mod slack;
mod workflow;

#[derive(Debug, Parser)]
#[command(
    name = "hermes",
    about = "Post a message and a threaded reply to a Slack channel"
)]
struct Cli {
    /// Settings file; `hermes.toml` is used if present when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Where the raw Slack responses are written.
    #[arg(long, value_name = "DIR", default_value = ".")]
    dump_dir: PathBuf,

    /// Log file, appended to alongside the console output.
    #[arg(long, value_name = "PATH", default_value = "hermes.log")]
    log_file: PathBuf,
}

/// Application entrypoint. Initialises tracing, loads configuration, and runs
/// the workflow to completion.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_status(&e));
        }
    };

    if let Err(e) = init_tracing(&cli.log_file) {
        eprintln!("Could not open {}: {}", cli.log_file.display(), e);
        return ExitCode::FAILURE;
    }

    let has_dotenv = dotenv().is_ok();
    if !has_dotenv {
        warn!("No .env found");
    }

    let res = run(cli, |key| env::var(key).ok()).await;

    ExitCode::from(exit_status(&res))
}

/// Log to the console and, without colour codes, to `log_file`.
fn init_tracing(log_file: &Path) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .compact()
                .with_writer(Arc::new(file)),
        )
        .with(LevelFilter::INFO)
        .init();

    Ok(())
}

async fn run<F>(cli: Cli, var: F) -> Result<Context, Failure>
where
    F: Fn(&str) -> Option<String>,
{
    let config = Config::load(cli.config.as_deref(), var)?;
    info!(api_base = %config.api_base, "Loaded configuration");

    let runner = Runner::new(
        SlackClient::new(config.api_base.clone()),
        Dumps::new(cli.dump_dir),
    );

    runner.run(Context::from(config)).await
}

/// `0` for `--help`, `1` for bad arguments.
fn usage_status(e: &clap::Error) -> u8 {
    if e.use_stderr() {
        1
    } else {
        0
    }
}

/// `0` on success, otherwise `1` having logged why.
fn exit_status<T>(res: &Result<T, Failure>) -> u8 {
    match res {
        Ok(_) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ConfigError, slack::error::SlackError, workflow::Step};

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status::<()>(&Ok(())), 0);
        assert_eq!(
            exit_status::<()>(&Err(Failure::Config(ConfigError::MissingToken))),
            1
        );
        assert_eq!(
            exit_status::<()>(&Err(Failure::Slack(
                Step::PostReply,
                SlackError::APIResponseMissingError
            ))),
            1
        );
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["hermes"]);

        assert_eq!(cli.config, None);
        assert_eq!(cli.dump_dir, PathBuf::from("."));
        assert_eq!(cli.log_file, PathBuf::from("hermes.log"));
    }

    #[test]
    fn test_cli_args() {
        let cli = Cli::parse_from([
            "hermes",
            "--config",
            "conf/hermes.toml",
            "--dump-dir",
            "/tmp/dumps",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("conf/hermes.toml")));
        assert_eq!(cli.dump_dir, PathBuf::from("/tmp/dumps"));
    }

    #[test]
    fn test_usage_status() {
        let e = Cli::try_parse_from(["hermes", "--bogus"]).unwrap_err();
        assert_eq!(usage_status(&e), 1);

        let e = Cli::try_parse_from(["hermes", "--dump-dir"]).unwrap_err();
        assert_eq!(usage_status(&e), 1);

        let e = Cli::try_parse_from(["hermes", "--help"]).unwrap_err();
        assert_eq!(usage_status(&e), 0);
    }

    #[tokio::test]
    async fn test_run_without_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hermes.toml");
        std::fs::write(&path, "channel_id = \"C1\"\n").unwrap();

        let cli = Cli::parse_from([
            "hermes",
            "--config",
            path.to_str().unwrap(),
            "--dump-dir",
            dir.path().to_str().unwrap(),
        ]);

        let res = run(cli, |_| None).await;
        assert!(matches!(res, Err(Failure::Config(ConfigError::MissingToken))));
        assert_eq!(exit_status(&res), 1);
    }
}
