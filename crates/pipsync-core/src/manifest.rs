//! JSON manifest declaring the packages to reconcile.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::installer::DEFAULT_INTERPRETER;
use crate::models::{
    CoreError, DefaultProvider, InstallerResult, Options, PackageAction, PackageIntent,
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub environment: Option<PythonEnvironment>,
    #[serde(default)]
    pub packages: Vec<PackageSpec>,
}

/// The interpreter environment that owns the declared packages.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PythonEnvironment {
    #[serde(default)]
    pub interpreter: Option<PathBuf>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

impl DefaultProvider for PythonEnvironment {
    fn default_user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    fn default_group(&self) -> Option<&str> {
        self.group.as_deref()
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value.clone()],
            Self::Many(values) => values.clone(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSpec {
    pub package_name: OneOrMany,
    #[serde(default)]
    pub version: Option<OneOrMany>,
    #[serde(default)]
    pub action: PackageAction,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub list_options: Options,
    #[serde(default)]
    pub install_options: Options,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub allow_downgrade: bool,
    // Accepted only so they can be refused with a clear message.
    #[serde(default)]
    pub response_file: Option<String>,
    #[serde(default)]
    pub response_file_variables: Option<serde_json::Value>,
}

impl PackageSpec {
    pub fn to_intent(
        &self,
        parent: Option<Arc<dyn DefaultProvider>>,
    ) -> InstallerResult<PackageIntent> {
        if self.response_file.is_some() {
            return Err(CoreError::invalid_input(
                "response_file is not supported for python packages",
            ));
        }
        if self.response_file_variables.is_some() {
            return Err(CoreError::invalid_input(
                "response_file_variables is not supported for python packages",
            ));
        }

        let versions = self.version.as_ref().map(OneOrMany::to_vec).unwrap_or_default();
        let mut intent = PackageIntent::new(self.package_name.to_vec(), versions)?
            .action(self.action)
            .options(self.options.clone())
            .list_options(self.list_options.clone())
            .install_options(self.install_options.clone())
            .allow_downgrade(self.allow_downgrade);

        intent.user = self.user.clone();
        intent.group = self.group.clone();
        intent.parent = parent;
        Ok(intent)
    }
}

impl Manifest {
    pub fn from_json(content: &str) -> InstallerResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| CoreError::invalid_input(format!("invalid manifest: {e}")))
    }

    pub fn load(path: &Path) -> InstallerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::invalid_input(format!(
                "failed to read manifest {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn interpreter(&self) -> PathBuf {
        self.environment
            .as_ref()
            .and_then(|environment| environment.interpreter.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INTERPRETER))
    }

    /// Validated intents in declaration order.
    pub fn intents(&self) -> InstallerResult<Vec<PackageIntent>> {
        let parent = self
            .environment
            .clone()
            .map(|environment| Arc::new(environment) as Arc<dyn DefaultProvider>);

        self.packages
            .iter()
            .map(|spec| spec.to_intent(parent.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Manifest;
    use crate::models::{CoreErrorKind, Options, PackageAction};

    const MANIFEST: &str = r#"{
        "environment": { "interpreter": "/srv/venv/bin/python", "user": "app", "group": "app" },
        "packages": [
            { "package_name": "django", "version": "1.8.3", "action": "upgrade",
              "options": ["--no-cache-dir"], "install_options": "--pre" },
            { "package_name": ["requests", "six"], "version": ["2.31.0", ""], "user": "deploy" },
            { "package_name": "boto", "action": "remove" }
        ]
    }"#;

    #[test]
    fn loads_packages_with_parent_defaults() {
        let manifest = Manifest::from_json(MANIFEST).unwrap();
        assert_eq!(manifest.interpreter().to_str(), Some("/srv/venv/bin/python"));

        let intents = manifest.intents().unwrap();
        assert_eq!(intents.len(), 3);

        assert_eq!(intents[0].action, PackageAction::Upgrade);
        assert_eq!(intents[0].versions, vec!["1.8.3"]);
        assert_eq!(
            intents[0].options,
            Options::Tokens(vec!["--no-cache-dir".to_string()])
        );
        assert_eq!(intents[0].install_options, Options::Joined("--pre".to_string()));
        assert_eq!(intents[0].effective_user(), Some("app"));

        assert_eq!(intents[1].names, vec!["requests", "six"]);
        assert_eq!(intents[1].effective_user(), Some("deploy"));
        assert_eq!(intents[1].effective_group(), Some("app"));

        assert_eq!(intents[2].action, PackageAction::Remove);
        assert_eq!(intents[2].versions, vec![""]);
    }

    #[test]
    fn defaults_to_python3_without_environment() {
        let manifest = Manifest::from_json(r#"{"packages": [{"package_name": "six"}]}"#).unwrap();
        assert_eq!(manifest.interpreter().to_str(), Some("python3"));
        assert!(manifest.intents().unwrap()[0].parent.is_none());
    }

    #[test]
    fn rejects_response_file() {
        let manifest = Manifest::from_json(
            r#"{"packages": [{"package_name": "six", "response_file": "answers.txt"}]}"#,
        )
        .unwrap();
        let error = manifest.intents().expect_err("expected usage error");
        assert_eq!(error.kind, CoreErrorKind::InvalidInput);
        assert!(error.message.contains("response_file"));
    }

    #[test]
    fn rejects_unknown_fields_and_mismatched_versions() {
        let unknown = Manifest::from_json(r#"{"packages": [{"package_name": "six", "source": "x"}]}"#)
            .expect_err("expected invalid manifest");
        assert_eq!(unknown.kind, CoreErrorKind::InvalidInput);

        let manifest = Manifest::from_json(
            r#"{"packages": [{"package_name": ["a", "b"], "version": "1.0"}]}"#,
        )
        .unwrap();
        assert!(manifest.intents().is_err());
    }
}
