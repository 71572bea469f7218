use std::fmt::Debug;
use std::sync::Arc;

use serde::Deserialize;

use crate::models::{CoreError, InstallerResult, Options};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PackageAction {
    #[default]
    Install,
    Upgrade,
    Remove,
}

impl PackageAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Upgrade => "upgrade",
            Self::Remove => "remove",
        }
    }
}

/// Supplies execution defaults to the packages declared inside it.
///
/// Implemented by environments that own an interpreter and run it as a
/// particular account.
pub trait DefaultProvider: Debug + Send + Sync {
    fn default_user(&self) -> Option<&str>;

    fn default_group(&self) -> Option<&str>;
}

/// Desired state for one package resource, which may declare several
/// packages through parallel name/version lists.
#[derive(Clone, Debug)]
pub struct PackageIntent {
    pub names: Vec<String>,
    pub versions: Vec<String>,
    pub action: PackageAction,
    pub options: Options,
    pub list_options: Options,
    pub install_options: Options,
    pub user: Option<String>,
    pub group: Option<String>,
    /// Carried for the convergence planner; the installer itself never
    /// inspects it.
    pub allow_downgrade: bool,
    pub parent: Option<Arc<dyn DefaultProvider>>,
}

impl PackageIntent {
    /// Declares packages with positional versions. An empty `versions`
    /// list pads every name with an empty version.
    pub fn new(names: Vec<String>, versions: Vec<String>) -> InstallerResult<Self> {
        if names.is_empty() {
            return Err(CoreError::invalid_input(
                "package resource must declare at least one package name",
            ));
        }

        let versions = if versions.is_empty() {
            vec![String::new(); names.len()]
        } else if versions.len() == names.len() {
            versions
        } else {
            return Err(CoreError::invalid_input(format!(
                "package resource declares {} names but {} versions",
                names.len(),
                versions.len()
            )));
        };

        Ok(Self {
            names,
            versions,
            action: PackageAction::default(),
            options: Options::Unset,
            list_options: Options::Unset,
            install_options: Options::Unset,
            user: None,
            group: None,
            allow_downgrade: false,
            parent: None,
        })
    }

    pub fn single(name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            names: vec![name.into()],
            versions: vec![version.unwrap_or_default().to_string()],
            action: PackageAction::default(),
            options: Options::Unset,
            list_options: Options::Unset,
            install_options: Options::Unset,
            user: None,
            group: None,
            allow_downgrade: false,
            parent: None,
        }
    }

    pub fn action(mut self, action: PackageAction) -> Self {
        self.action = action;
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn list_options(mut self, options: Options) -> Self {
        self.list_options = options;
        self
    }

    pub fn install_options(mut self, options: Options) -> Self {
        self.install_options = options;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn allow_downgrade(mut self, allow: bool) -> Self {
        self.allow_downgrade = allow;
        self
    }

    pub fn parent(mut self, parent: Arc<dyn DefaultProvider>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn effective_user(&self) -> Option<&str> {
        self.user
            .as_deref()
            .or_else(|| self.parent.as_deref().and_then(|parent| parent.default_user()))
    }

    pub fn effective_group(&self) -> Option<&str> {
        self.group
            .as_deref()
            .or_else(|| self.parent.as_deref().and_then(|parent| parent.default_group()))
    }
}
