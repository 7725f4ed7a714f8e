// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runo - call-session state machine for outbound sales calls.
//!
//! This is the binary entry point. It loads the layered configuration,
//! installs logging, and runs one of the inspection or simulation commands.

mod inspect;
mod simulate;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use runo_config::RunoConfig;
use runo_session::CallProfile;

/// Runo - call-session state machine for outbound sales calls.
#[derive(Parser, Debug)]
#[command(name = "runo", version, about, long_about = None)]
struct Cli {
    /// Load this config file instead of the layered search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the effective configuration as TOML.
    Config,
    /// Print the disposition rule table.
    Rules,
    /// Print the auto follow-up timestamp for a stage.
    FollowUp {
        /// Stage code whose follow-up rule applies.
        #[arg(long)]
        stage: Option<String>,
    },
    /// Run one call session against in-process loopback collaborators.
    Simulate {
        /// Subject (record) id to dial.
        #[arg(long)]
        subject: String,
        /// Calling context: lead, course_allocation or webinar_attendee.
        #[arg(long, default_value = "lead")]
        profile: CallProfile,
        /// Make the dial request fail.
        #[arg(long)]
        fail_dial: bool,
        /// Call duration reported by the loopback dialer, in seconds.
        #[arg(long, default_value_t = 3)]
        duration: u64,
        /// Never send a termination signal, so the no-response deadline fires.
        #[arg(long)]
        silent: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => runo_config::load_and_validate_path(path),
        None => runo_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            runo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);
    let use_color = !cli.no_color && std::io::stdout().is_terminal();

    if let Err(e) = run(cli.command, &config, use_color).await {
        eprintln!("error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(
    command: Option<Commands>,
    config: &RunoConfig,
    use_color: bool,
) -> Result<(), runo_core::RunoError> {
    match command {
        Some(Commands::Config) => inspect::run_config(config),
        Some(Commands::Rules) => inspect::run_rules(config, use_color),
        Some(Commands::FollowUp { stage }) => inspect::run_follow_up(config, stage.as_deref()),
        Some(Commands::Simulate {
            subject,
            profile,
            fail_dial,
            duration,
            silent,
        }) => {
            let options = simulate::SimulateOptions {
                subject,
                profile,
                fail_dial,
                duration_secs: duration,
                silent,
            };
            let report = simulate::run_simulate(config, options, use_color).await?;
            println!(
                "session {} finished {} after {}",
                report.receipt.session_id, report.final_status, report.elapsed
            );
            Ok(())
        }
        None => {
            println!("runo: use --help for available commands");
            Ok(())
        }
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("runo={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use runo_core::CallContextKind;

    #[test]
    fn binary_loads_config_defaults() {
        let config = runo_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.session.watchdog_timeout_ms, 30_000);
    }

    #[test]
    fn simulate_parses_profile_and_flags() {
        let cli = Cli::try_parse_from([
            "runo",
            "simulate",
            "--subject",
            "LEAD-7",
            "--profile",
            "course_allocation",
            "--fail-dial",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Simulate {
                subject,
                profile,
                fail_dial,
                duration,
                silent,
            }) => {
                assert_eq!(subject, "LEAD-7");
                assert_eq!(profile.kind, CallContextKind::CourseAllocation);
                assert!(fail_dial);
                assert_eq!(duration, 3);
                assert!(!silent);
            }
            other => panic!("expected simulate, got {other:?}"),
        }
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let parsed = Cli::try_parse_from(["runo", "simulate", "--subject", "X", "--profile", "sales"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn follow_up_stage_is_optional() {
        let cli = Cli::try_parse_from(["runo", "--no-color", "follow-up"]).unwrap();
        assert!(cli.no_color);
        assert!(matches!(cli.command, Some(Commands::FollowUp { stage: None })));
    }
}
