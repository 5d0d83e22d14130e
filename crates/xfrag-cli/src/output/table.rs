//! Table formatting utilities for CLI output.

use comfy_table::{presets, ContentArrangement, Table};
use xfrag::{Ambiguity, Choice, XmlDocument};

/// Format the choices of an ambiguous resolution as an ASCII table.
///
/// Rows are numbered from 1, matching `--pick`.
pub fn format_candidates_table(ambiguity: &Ambiguity, document: &XmlDocument) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Candidate", "Line", "Exact"]);

    for (row, choice) in ambiguity.choices.iter().enumerate() {
        match choice {
            Choice::Candidate(index) => {
                let candidate = &ambiguity.candidates[*index];
                let (line, _) = document.line_col(candidate.position.open_tag_start);
                let exact = if ambiguity.exact_matches.contains(index) {
                    "yes"
                } else {
                    ""
                };
                table.add_row(vec![
                    (row + 1).to_string(),
                    candidate.to_string(),
                    line.to_string(),
                    exact.to_string(),
                ]);
            }
            Choice::Skip => {
                table.add_row(vec![
                    "-".to_string(),
                    "(skip)".to_string(),
                    String::new(),
                    String::new(),
                ]);
            }
        }
    }

    table
}
