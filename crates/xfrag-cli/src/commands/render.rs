//! Implementation of the `xfrag render` command.

use std::path::PathBuf;

use clap::Args;
use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use xfrag::{RenderOptions, RenderOutput, Renderer};

use super::input::{load_config, load_document, read_file, read_stdin};

/// Arguments for the render command.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Configuration file (.json)
    pub config: PathBuf,

    /// File holding the input lines. Reads standard input when neither
    /// --input nor --text is given.
    #[arg(long, conflicts_with = "text")]
    pub input: Option<PathBuf>,

    /// Input lines given inline
    #[arg(long)]
    pub text: Option<String>,

    /// Document to read tokens from when a line leaves them empty
    #[arg(long)]
    pub document: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not report conditions referencing undefined or empty tokens
    #[arg(long)]
    pub no_warnings: bool,
}

/// JSON output for render results.
#[derive(Debug, Serialize)]
struct RenderJson {
    fragments: Vec<FragmentJson>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct FragmentJson {
    key: String,
    text: String,
}

/// Run the render command.
pub fn run_render(args: RenderArgs) -> Result<i32> {
    let config = load_config(&args.config)?;
    let selection = match (&args.input, &args.text) {
        (Some(path), _) => read_file(path, "input")?,
        (None, Some(text)) => text.clone(),
        (None, None) => read_stdin()?,
    };

    let options = RenderOptions::builder()
        .warn_on_invalid_tokens(!args.no_warnings)
        .build();
    let renderer = Renderer::with_options(&config, options);

    let rendered = match &args.document {
        Some(path) => {
            let document = load_document(path)?;
            renderer.render_selection_with_document(&selection, &document)
        }
        None => renderer.render_selection(&selection),
    };
    let output = match rendered {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return Ok(exitcode::DATAERR);
        }
    };

    if args.json {
        print_json(&output)?;
    } else {
        print_text(&output);
    }
    Ok(exitcode::OK)
}

fn print_json(output: &RenderOutput) -> Result<()> {
    let json = RenderJson {
        fragments: output
            .fragments
            .iter()
            .map(|f| FragmentJson {
                key: f.key.clone(),
                text: f.text.clone(),
            })
            .collect(),
        warnings: output.warnings.iter().map(ToString::to_string).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
    Ok(())
}

fn print_text(output: &RenderOutput) {
    for (i, fragment) in output.fragments.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", format!("== {} ==", fragment.key).cyan().bold());
        println!("{}", fragment.text);
    }
    for warning in &output.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}
