//! Epics command: list the configured epics.

use std::fmt::Write as _;
use std::io;

use anyhow::{Context, Result};
use et_core::{Epic, EpicSet};

fn fields(epic: &Epic) -> String {
    let fields: Vec<&str> = [
        (epic.match_title, "title"),
        (epic.match_description, "description"),
        (epic.match_location, "location"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();
    if fields.is_empty() {
        "(none)".to_string()
    } else {
        fields.join(",")
    }
}

/// Formats the epic list as an aligned table.
pub fn format_epics(epics: &EpicSet) -> String {
    let mut output = String::new();

    if epics.is_empty() {
        writeln!(output, "No epics configured.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Add [[epics]] entries with a name and keyword to config.toml."
        )
        .unwrap();
        return output;
    }

    let name_width = epics
        .iter()
        .map(|e| e.name.as_str().len())
        .chain(["NAME".len()])
        .max()
        .unwrap_or_default();
    let keyword_width = epics
        .iter()
        .map(|e| e.keyword.len() + 2)
        .chain(["KEYWORD".len()])
        .max()
        .unwrap_or_default();

    writeln!(
        output,
        "{:<name_width$}  {:<keyword_width$}  {:<7}  {:<7}  FIELDS",
        "NAME", "KEYWORD", "CASE", "COLOR"
    )
    .unwrap();
    for epic in epics {
        let keyword = format!("/{}/", epic.keyword);
        let case = if epic.case_sensitive { "match" } else { "ignore" };
        writeln!(
            output,
            "{:<name_width$}  {keyword:<keyword_width$}  {case:<7}  {:<7}  {}",
            epic.name.as_str(),
            epic.color,
            fields(epic)
        )
        .unwrap();
    }
    output
}

/// Runs the epics command.
pub fn run(out: &mut impl io::Write, epics: &EpicSet, json: bool) -> Result<()> {
    if json {
        let output = serde_json::to_string_pretty(epics).context("failed to serialize epics")?;
        writeln!(out, "{output}")?;
    } else {
        write!(out, "{}", format_epics(epics))?;
    }
    Ok(())
}
