//! Implementation of the `xfrag check` command.

use std::path::PathBuf;

use clap::Args;
use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use xfrag::{ConfigError, GeneratorConfig};

use super::input::read_file;
use crate::output::SourceDiagnostic;

/// Arguments for the check command.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Configuration file to check (.json)
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for check results.
#[derive(Debug, Serialize)]
struct CheckJson {
    valid: bool,
    problems: Vec<String>,
    tokens: Vec<String>,
    fragments: Vec<String>,
    injection_keys: Vec<String>,
}

/// Run the check command.
pub fn run_check(args: CheckArgs) -> Result<i32> {
    let content = read_file(&args.config, "configuration")?;

    let (config, problems) = match GeneratorConfig::from_json_str(&content) {
        Ok(config) => (Some(config), Vec::new()),
        Err(ConfigError::Json(err)) => {
            return Err(SourceDiagnostic::from_json_error(&args.config, &content, &err).into());
        }
        Err(err) => (
            None,
            err.problems().iter().map(ToString::to_string).collect(),
        ),
    };

    if args.json {
        let output = CheckJson {
            valid: config.is_some(),
            problems: problems.clone(),
            tokens: config
                .as_ref()
                .map(|c| c.tokens.names().map(str::to_string).collect())
                .unwrap_or_default(),
            fragments: config
                .as_ref()
                .map(|c| c.fragments.iter().map(|f| f.source_key.clone()).collect())
                .unwrap_or_default(),
            injection_keys: config
                .as_ref()
                .map(|c| c.injection_keys().into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
        };
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else if let Some(config) = &config {
        println!(
            "{} {}: {} token(s), {} fragment(s), {} injection path(s), {} token rule(s), {} group(s)",
            "ok".green().bold(),
            args.config.display(),
            config.tokens.len(),
            config.fragments.len(),
            config.injection_paths.len(),
            config.token_rules.len(),
            config.groups.len(),
        );
    } else {
        eprintln!(
            "{} {}: {} problem(s)",
            "invalid".red().bold(),
            args.config.display(),
            problems.len()
        );
        for problem in &problems {
            eprintln!("  - {problem}");
        }
    }

    if config.is_some() {
        Ok(exitcode::OK)
    } else {
        Ok(exitcode::DATAERR)
    }
}
