//! Implementation of the `xfrag inject` command.

use std::fs::write;
use std::path::PathBuf;

use clap::Args;
use miette::{miette, Result};
use owo_colors::OwoColorize;
use xfrag::inject::apply_all;
use xfrag::{GroupPick, Picks, Resolution};

use super::input::{load_config, load_document, parse_group_pick, parse_pick};
use super::resolve::resolve_fragments;

/// Arguments for the inject command.
#[derive(Debug, Args)]
pub struct InjectArgs {
    /// Configuration file (.json)
    pub config: PathBuf,

    /// XML document to insert into
    pub document: PathBuf,

    /// The comma-separated input line
    #[arg(long)]
    pub line: String,

    /// Inject only this fragment key
    #[arg(long)]
    pub key: Option<String>,

    /// Choose target candidate N (1-based) instead of deciding automatically
    #[arg(long, requires = "key", value_parser = parse_pick)]
    pub pick: Option<usize>,

    /// Choose a group instance by number (1-based) or display value
    #[arg(long, requires = "key", value_parser = parse_group_pick)]
    pub group_pick: Option<GroupPick>,

    /// Write the result here instead of standard output
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run the inject command.
pub fn run_inject(args: InjectArgs) -> Result<i32> {
    let config = load_config(&args.config)?;
    let document = load_document(&args.document)?;
    let picks = Picks {
        group: args.group_pick.clone(),
        target: args.pick,
    };

    let results = resolve_fragments(&config, &document, &args.line, args.key.as_deref(), &picks)?;

    let mut insertions = Vec::new();
    let mut skipped = 0_usize;
    for result in &results {
        match &result.outcome {
            Ok(resolution @ Resolution::Selected { target, .. }) => {
                if let Some(insertion) = resolution.plan(&result.text) {
                    let (line, column) = insertion.line_col(document.source());
                    eprintln!(
                        "{} {} into {target} at {line}:{column}",
                        "inserted".green(),
                        result.key
                    );
                    insertions.push(insertion);
                }
            }
            Ok(Resolution::Ambiguous(ambiguity)) => {
                skipped += 1;
                eprintln!(
                    "{} {}: {} candidate(s) for {}; rerun with --key {} --pick N",
                    "skipped".yellow(),
                    result.key,
                    ambiguity.candidates.len(),
                    ambiguity.path,
                    result.key
                );
            }
            Ok(Resolution::NoTarget { path }) => {
                skipped += 1;
                eprintln!("{} {}: no target for {}", "skipped".yellow(), result.key, path);
            }
            Err(e) => {
                skipped += 1;
                eprintln!("{} {}: {}", "error:".red().bold(), result.key, e);
            }
        }
    }

    let text = apply_all(document.source(), &insertions);
    match &args.output {
        Some(path) => write(path, text)
            .map_err(|e| miette!("Cannot write output {}: {}", path.display(), e))?,
        None => print!("{text}"),
    }

    if insertions.is_empty() && skipped > 0 {
        Ok(exitcode::DATAERR)
    } else {
        Ok(exitcode::OK)
    }
}
