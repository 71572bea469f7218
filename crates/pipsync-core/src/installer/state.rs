use crate::execution::ProcessSpawnRequest;
use crate::installer::{
    ActionKind, Installer, build_requirements, normalize_name, parse_installed,
    parse_outdated_table, reconcile_outdated,
};
use crate::models::{InstallerAction, InstallerResult, VersionTable};

impl Installer<'_> {
    /// Current and candidate versions for the declared packages.
    ///
    /// Runs `list` (JSON where the installer supports it) and
    /// `list --outdated`, then merges both by normalized name. Every
    /// declared package has a record, empty when nothing is known.
    pub fn load_versions<N, V>(&self, names: &[N], versions: &[V]) -> InstallerResult<VersionTable>
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let mut table = VersionTable::with_keys(names.iter().map(|name| normalize_name(name.as_ref())));

        let list = self
            .compose(Some("list"), ActionKind::List, &[])
            .env("PIP_FORMAT", "json");
        let raw = self
            .executor
            .run_and_collect_stdout(ProcessSpawnRequest::new(InstallerAction::ListInstalled, list))?;
        for (key, version) in parse_installed(&raw)? {
            if !version.is_empty() {
                table.entry(key).current = Some(version);
            }
        }

        let requirements = build_requirements(names, versions, true);
        let outdated = self
            .compose(Some("list"), ActionKind::List, &["--outdated".to_string()])
            .env("PIP_FORMAT", "columns");
        let raw = self
            .executor
            .run_and_collect_stdout(ProcessSpawnRequest::new(InstallerAction::ListOutdated, outdated))?;
        let latest = parse_outdated_table(&raw);
        for (key, effective) in reconcile_outdated(&requirements, &latest) {
            if !effective.is_empty() {
                table.entry(key).candidate = Some(effective);
            }
        }

        tracing::debug!(
            declared = names.len(),
            known = table.len(),
            "loaded installed package versions"
        );
        Ok(table)
    }
}
