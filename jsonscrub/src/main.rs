// jsonscrub/src/main.rs
//! jsonscrub entry point.
//!
//! Exit codes: 0 when every document was processed, 2 when at least one
//! document failed, 1 when the run itself could not proceed.

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use jsonscrub::cli::{Cli, Commands};
use jsonscrub::commands::rules::run_rules;
use jsonscrub::commands::sanitize::{run_sanitize, SanitizeOptions};
use jsonscrub::logger;
use jsonscrub::ui::output_format;
use jsonscrub_core::{load_config, DirRuleSource, EmbeddedRuleSource, RuleSource};

async fn run(args: Cli) -> Result<ExitCode> {
    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let rule_source: Arc<dyn RuleSource> = match &args.rules_dir {
        Some(dir) => Arc::new(DirRuleSource::new(dir)),
        None => Arc::new(EmbeddedRuleSource),
    };

    match args.command {
        Commands::Sanitize(cmd) => {
            let opts = SanitizeOptions {
                files: cmd.files,
                out_dir: cmd.out_dir,
                diff: cmd.diff,
                export: !cmd.no_export,
                json: cmd.json,
                quiet: args.quiet,
            };
            let report = run_sanitize(config, rule_source, opts).await?;
            if report.failed > 0 {
                Ok(ExitCode::from(2))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Commands::Rules(cmd) => {
            run_rules(&config, rule_source, cmd.kind.as_deref(), &mut io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    if args.quiet {
        logger::init_logger(Some(log::LevelFilter::Off));
    } else if args.debug {
        logger::init_logger(Some(log::LevelFilter::Debug));
    } else {
        logger::init_logger(None);
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            let _ = output_format::print_error_message(
                &mut io::stderr(),
                &format!("{:#}", e),
                io::stderr().is_terminal(),
            );
            ExitCode::FAILURE
        }
    }
}
