use std::sync::LazyLock;

use regex::Regex;

/// `git+https://host/repo.git@rev#egg=name&subdirectory=...`
static EGG_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://\S*#egg=([^&#\[\s]+)").expect("valid egg regex")
});

/// `name[extra1,extra2]`
static EXTRAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\[\]]+)\[.*\]$").expect("valid extras regex"));

/// Canonical comparison key for a package reference.
///
/// VCS/URL references yield their egg name, extras are stripped, and the
/// result is lower-cased with underscores folded into hyphens. Any input is
/// accepted.
pub fn normalize_name(raw: &str) -> String {
    let name = if let Some(captures) = EGG_FRAGMENT.captures(raw) {
        captures.get(1).map_or(raw, |m| m.as_str())
    } else if let Some(captures) = EXTRAS.captures(raw) {
        captures.get(1).map_or(raw, |m| m.as_str())
    } else {
        raw
    };

    name.to_lowercase().replace('_', "-")
}
