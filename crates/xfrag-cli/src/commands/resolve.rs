//! Implementation of the `xfrag resolve` command.

use std::path::PathBuf;

use clap::Args;
use miette::{miette, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::debug;
use xfrag::{
    AmbiguityStage, GeneratorConfig, GroupPick, InjectError, InjectionResolver, Picks, Renderer,
    Resolution, XmlDocument,
};

use super::input::{load_config, load_document, parse_group_pick, parse_pick};
use crate::output::table::format_candidates_table;

/// Arguments for the resolve command.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Configuration file (.json)
    pub config: PathBuf,

    /// XML document to resolve against
    pub document: PathBuf,

    /// The comma-separated input line
    #[arg(long)]
    pub line: String,

    /// Resolve only this fragment key
    #[arg(long)]
    pub key: Option<String>,

    /// Choose target candidate N (1-based) instead of deciding automatically
    #[arg(long, requires = "key", value_parser = parse_pick)]
    pub pick: Option<usize>,

    /// Choose a group instance by number (1-based) or display value
    #[arg(long, requires = "key", value_parser = parse_group_pick)]
    pub group_pick: Option<GroupPick>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// One rendered fragment and where it resolved to.
pub(super) struct KeyResolution {
    pub key: String,
    pub text: String,
    pub outcome: Result<Resolution, InjectError>,
}

/// Render `line` and resolve the target of each fragment it produced.
///
/// Without `key`, fragments that have no injection path are left out.
pub(super) fn resolve_fragments(
    config: &GeneratorConfig,
    document: &XmlDocument,
    line: &str,
    key: Option<&str>,
    picks: &Picks,
) -> Result<Vec<KeyResolution>> {
    let output = Renderer::new(config)
        .render_selection_with_document(line, document)
        .map_err(|e| miette!("{}", e))?;
    for warning in &output.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    let Some(rendered) = output.lines.into_iter().next() else {
        return Ok(Vec::new());
    };

    if let Some(key) = key {
        if !rendered.fragments.iter().any(|f| f.key == key) {
            return Err(miette!("fragment '{}' is not rendered for this line", key));
        }
    }

    let resolver = InjectionResolver::new(config, document);
    let mut results = Vec::new();
    for fragment in rendered.fragments {
        if key.is_some_and(|k| k != fragment.key) {
            continue;
        }
        let outcome = resolver.resolve_with(&fragment.key, &rendered.tokens, picks);
        if key.is_none() && matches!(outcome, Err(InjectError::UnmappedKey { .. })) {
            debug!(key = %fragment.key, "fragment has no injection path");
            continue;
        }
        results.push(KeyResolution {
            key: fragment.key,
            text: fragment.text,
            outcome,
        });
    }
    Ok(results)
}

/// JSON output for one resolved key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolutionJson {
    key: String,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<CandidateJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    candidates: Vec<CandidateJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct CandidateJson {
    path: String,
    line: usize,
    column: usize,
    exact: bool,
}

/// Run the resolve command.
pub fn run_resolve(args: ResolveArgs) -> Result<i32> {
    let config = load_config(&args.config)?;
    let document = load_document(&args.document)?;
    let picks = Picks {
        group: args.group_pick.clone(),
        target: args.pick,
    };

    let results = resolve_fragments(&config, &document, &args.line, args.key.as_deref(), &picks)?;
    let failed = results.iter().any(|r| r.outcome.is_err());

    if args.json {
        let json: Vec<ResolutionJson> = results
            .iter()
            .map(|r| to_json(r, &document))
            .collect();
        println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
    } else {
        if results.is_empty() {
            println!("no rendered fragment has an injection path");
        }
        for result in &results {
            print_resolution(result, &document);
        }
    }

    if failed {
        Ok(exitcode::DATAERR)
    } else {
        Ok(exitcode::OK)
    }
}

fn print_resolution(result: &KeyResolution, document: &XmlDocument) {
    let key = result.key.bold();
    match &result.outcome {
        Ok(Resolution::Selected { target, .. }) => {
            let (line, column) = document.line_col(target.position.open_tag_start);
            println!("{key}: {} {target} ({line}:{column})", "selected".green());
        }
        Ok(Resolution::Ambiguous(ambiguity)) => {
            let stage = match &ambiguity.stage {
                AmbiguityStage::Group { name } => format!("group '{name}'"),
                AmbiguityStage::Target => "target".to_string(),
            };
            println!(
                "{key}: {} {stage} for {} ({} exact match(es))",
                "ambiguous".yellow(),
                ambiguity.path,
                ambiguity.exact_matches.len()
            );
            println!("{}", format_candidates_table(ambiguity, document));
        }
        Ok(Resolution::NoTarget { path }) => {
            println!("{key}: {} {path}", "no target for".red());
        }
        Err(e) => println!("{key}: {} {e}", "error:".red().bold()),
    }
}

fn to_json(result: &KeyResolution, document: &XmlDocument) -> ResolutionJson {
    let mut json = ResolutionJson {
        key: result.key.clone(),
        outcome: "error",
        path: None,
        target: None,
        stage: None,
        candidates: Vec::new(),
        error: None,
    };
    match &result.outcome {
        Ok(Resolution::Selected { path, target }) => {
            let (line, column) = document.line_col(target.position.open_tag_start);
            json.outcome = "selected";
            json.path = Some(path.to_string());
            json.target = Some(CandidateJson {
                path: target.to_string(),
                line,
                column,
                exact: true,
            });
        }
        Ok(Resolution::Ambiguous(ambiguity)) => {
            json.outcome = "ambiguous";
            json.path = Some(ambiguity.path.to_string());
            json.stage = Some(match &ambiguity.stage {
                AmbiguityStage::Group { name } => format!("group:{name}"),
                AmbiguityStage::Target => "target".to_string(),
            });
            json.candidates = ambiguity
                .candidates
                .iter()
                .enumerate()
                .map(|(index, candidate)| {
                    let (line, column) = document.line_col(candidate.position.open_tag_start);
                    CandidateJson {
                        path: candidate.to_string(),
                        line,
                        column,
                        exact: ambiguity.exact_matches.contains(&index),
                    }
                })
                .collect();
        }
        Ok(Resolution::NoTarget { path }) => {
            json.outcome = "noTarget";
            json.path = Some(path.to_string());
        }
        Err(e) => json.error = Some(e.to_string()),
    }
    json
}
