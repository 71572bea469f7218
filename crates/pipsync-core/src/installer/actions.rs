use crate::execution::ProcessSpawnRequest;
use crate::installer::{ActionKind, Installer, build_requirements};
use crate::models::{CoreError, InstallerAction, InstallerResult};

const UPGRADE_FLAG: &str = "--upgrade";
const CONFIRM_FLAG: &str = "--yes";

impl Installer<'_> {
    /// `install` with requirements built from the raw names.
    pub fn install<N, V>(&self, names: &[N], versions: &[V]) -> InstallerResult<String>
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        validate_package_names(names, InstallerAction::Install)?;
        let requirements = build_requirements(names, versions, false);
        tracing::info!(packages = %requirements.join(" "), "installing python packages");

        let command = self.compose(Some("install"), ActionKind::Install, &requirements);
        self.executor
            .run_and_collect_stdout(ProcessSpawnRequest::new(InstallerAction::Install, command))
    }

    /// `install` with `--upgrade` leading the global options.
    pub fn upgrade<N, V>(&self, names: &[N], versions: &[V]) -> InstallerResult<String>
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        validate_package_names(names, InstallerAction::Upgrade)?;
        let requirements = build_requirements(names, versions, false);
        tracing::info!(packages = %requirements.join(" "), "upgrading python packages");

        let global_options = self.settings.options.with_leading_flag(UPGRADE_FLAG);
        let command = self.compose_with_global(
            Some("install"),
            &global_options,
            ActionKind::Install,
            &requirements,
        );
        self.executor
            .run_and_collect_stdout(ProcessSpawnRequest::new(InstallerAction::Upgrade, command))
    }

    /// `uninstall --yes` for the raw names. The installer cannot scope an
    /// uninstall to a version, so `versions` is never passed on.
    pub fn remove<N, V>(&self, names: &[N], versions: &[V]) -> InstallerResult<String>
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        validate_package_names(names, InstallerAction::Uninstall)?;
        if versions.iter().any(|version| !version.as_ref().trim().is_empty()) {
            tracing::debug!("ignoring declared versions for uninstall");
        }
        let mut args = Vec::with_capacity(names.len() + 1);
        args.push(CONFIRM_FLAG.to_string());
        args.extend(names.iter().map(|name| name.as_ref().to_string()));
        tracing::info!(packages = %args[1..].join(" "), "removing python packages");

        let command = self.compose(Some("uninstall"), ActionKind::Install, &args);
        self.executor
            .run_and_collect_stdout(ProcessSpawnRequest::new(InstallerAction::Uninstall, command))
    }
}

/// Rejects blank names and names the installer would parse as options.
fn validate_package_names<N: AsRef<str>>(names: &[N], action: InstallerAction) -> InstallerResult<()> {
    if names.is_empty() {
        return Err(
            CoreError::invalid_input("at least one package name is required").with_action(action),
        );
    }

    for name in names {
        let name = name.as_ref();
        if name.trim().is_empty() {
            return Err(
                CoreError::invalid_input("package name must not be blank").with_action(action)
            );
        }
        if name.trim_start().starts_with('-') {
            return Err(CoreError::invalid_input(format!(
                "package name '{name}' looks like a command-line option"
            ))
            .with_action(action));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_package_names;
    use crate::models::{CoreErrorKind, InstallerAction};

    #[test]
    fn accepts_names_urls_and_extras() {
        validate_package_names(
            &["django", "git+https://host/repo#egg=pkg", "requests[security]"],
            InstallerAction::Install,
        )
        .unwrap();
    }

    #[test]
    fn rejects_option_like_and_blank_names() {
        let error = validate_package_names(&["--index-url=https://evil"], InstallerAction::Install)
            .expect_err("expected invalid input");
        assert_eq!(error.kind, CoreErrorKind::InvalidInput);
        assert_eq!(error.action, Some(InstallerAction::Install));

        assert!(validate_package_names(&[" "], InstallerAction::Uninstall).is_err());

        let none: [&str; 0] = [];
        assert!(validate_package_names(&none, InstallerAction::Upgrade).is_err());
    }
}
