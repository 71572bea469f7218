use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::installer::normalize_name;
use crate::models::{CoreError, InstallerAction, InstallerResult};

/// `name (version)` or `name (version, /path/to/checkout)`
static LEGACY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+\(([^,)]+)").expect("valid legacy list regex"));

const OUTDATED_HEADER_LINES: usize = 2;

#[derive(Debug, Deserialize)]
struct ListEntry {
    name: String,
    version: String,
}

/// Parses `list` output into normalized name -> installed version.
///
/// JSON output is recognised by its leading `[`; anything else is read as
/// the legacy `name (version)` listing.
pub fn parse_installed(output: &str) -> InstallerResult<BTreeMap<String, String>> {
    if output.trim_start().starts_with('[') {
        parse_installed_json(output)
    } else {
        Ok(parse_installed_legacy(output))
    }
}

fn parse_installed_json(output: &str) -> InstallerResult<BTreeMap<String, String>> {
    let entries: Vec<ListEntry> = serde_json::from_str(output).map_err(|e| {
        CoreError::parse_failure(format!("invalid pip list JSON: {e}"))
            .with_action(InstallerAction::ListInstalled)
    })?;

    Ok(entries
        .into_iter()
        .map(|entry| (normalize_name(entry.name.trim()), entry.version.trim().to_string()))
        .collect())
}

fn parse_installed_legacy(output: &str) -> BTreeMap<String, String> {
    let mut installed = BTreeMap::new();

    for line in output.lines().map(str::trim).filter(|line| !line.is_empty()) {
        match LEGACY_LINE.captures(line) {
            Some(captures) => {
                installed.insert(normalize_name(&captures[1]), captures[2].trim().to_string());
            }
            None => tracing::debug!(line, "skipping unparsable pip list line"),
        }
    }

    installed
}

/// Parses the `list --outdated` column table into normalized name ->
/// latest version. Only the name and latest columns are read.
pub fn parse_outdated_table(output: &str) -> BTreeMap<String, String> {
    let mut latest = BTreeMap::new();

    for line in output.lines().skip(OUTDATED_HEADER_LINES) {
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 3 {
            if !columns.is_empty() {
                tracing::debug!(line, "skipping short pip outdated row");
            }
            continue;
        }
        latest.insert(normalize_name(columns[0]), columns[2].to_string());
    }

    latest
}

/// Computes the effective outdated version for each requirement.
///
/// The table's latest version wins when it lists the package; otherwise
/// the requirement's own `==` pin is used, else an empty string. Keys are
/// normalized names.
pub fn reconcile_outdated<R: AsRef<str>>(
    requirements: &[R],
    outdated: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    requirements
        .iter()
        .map(|requirement| {
            let (name, declared) = split_requirement(requirement.as_ref());
            let key = normalize_name(name);
            let effective = outdated
                .get(&key)
                .cloned()
                .unwrap_or_else(|| declared.to_string());
            (key, effective)
        })
        .collect()
}

/// Splits a requirement token into its bare name and declared `==` pin.
fn split_requirement(requirement: &str) -> (&str, &str) {
    if requirement.contains("://") {
        return (requirement, "");
    }
    let Some(index) = requirement.find(['<', '>', '=', '!', '~']) else {
        return (requirement, "");
    };
    let (name, specifier) = requirement.split_at(index);
    // Only a plain `==` declares a pin; `===` and ranges do not.
    match specifier.strip_prefix("==") {
        Some(version) if !version.starts_with('=') => (name, version),
        _ => (name, ""),
    }
}
