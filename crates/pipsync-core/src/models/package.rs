use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::installer::normalize_name;

/// One installer invocation kind, used to attribute requests and errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InstallerAction {
    ListInstalled,
    ListOutdated,
    Install,
    Upgrade,
    Uninstall,
}

impl InstallerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListInstalled => "list",
            Self::ListOutdated => "list-outdated",
            Self::Install => "install",
            Self::Upgrade => "upgrade",
            Self::Uninstall => "uninstall",
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VersionInfo {
    pub current: Option<String>,
    pub candidate: Option<String>,
}

/// Version data for a single reconciliation pass, keyed by normalized name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VersionTable {
    entries: BTreeMap<String, VersionInfo>,
}

impl VersionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-sizes the table with an empty record for every key.
    pub fn with_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let entries = keys
            .into_iter()
            .map(|key| (key.into(), VersionInfo::default()))
            .collect();
        Self { entries }
    }

    /// Returns the record for `key`, inserting an empty one when missing.
    pub fn entry(&mut self, key: impl Into<String>) -> &mut VersionInfo {
        self.entries.entry(key.into()).or_default()
    }

    pub fn get(&self, key: &str) -> Option<&VersionInfo> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, VersionInfo> {
        self.entries.iter()
    }

    /// Looks up raw package references in declared order.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> Vec<VersionInfo> {
        names
            .iter()
            .map(|name| {
                self.entries
                    .get(&normalize_name(name.as_ref()))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{VersionInfo, VersionTable};

    #[test]
    fn entry_inserts_default_once() {
        let mut table = VersionTable::new();
        table.entry("boto").current = Some("2.25.0".to_string());
        table.entry("boto").candidate = Some("2.49.0".to_string());

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("boto"),
            Some(&VersionInfo {
                current: Some("2.25.0".to_string()),
                candidate: Some("2.49.0".to_string()),
            })
        );
    }

    #[test]
    fn project_preserves_declared_order_and_normalizes() {
        let mut table = VersionTable::with_keys(["django", "six"]);
        table.entry("django").current = Some("1.8.2".to_string());

        let projected = table.project(&["six", "Django", "missing"]);
        assert_eq!(projected.len(), 3);
        assert_eq!(projected[0], VersionInfo::default());
        assert_eq!(projected[1].current.as_deref(), Some("1.8.2"));
        assert_eq!(projected[2], VersionInfo::default());

        let keys: Vec<&str> = table.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["django", "six"]);
    }
}
