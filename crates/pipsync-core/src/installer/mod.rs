//! Reconciliation engine driving the pip command line.
//!
//! [`Installer::load_versions`] reads the installed and outdated listings
//! and joins them by normalized name; [`Installer::install`],
//! [`Installer::upgrade`] and [`Installer::remove`] each run exactly one
//! batched installer invocation.

use std::path::PathBuf;

use crate::execution::{BlockingExecutor, CommandSpec};
use crate::models::{Options, PackageIntent};

mod actions;
pub mod command;
mod normalize;
pub mod parse;
mod requirement;
mod state;

pub use command::{ActionKind, compose_command};
pub use normalize::normalize_name;
pub use parse::{parse_installed, parse_outdated_table, reconcile_outdated};
pub use requirement::build_requirements;

pub const DEFAULT_INTERPRETER: &str = "python3";
pub const DEFAULT_RUNNER: [&str; 2] = ["-m", "pip.__main__"];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstallerSettings {
    pub interpreter: PathBuf,
    pub runner: Vec<String>,
    pub options: Options,
    pub list_options: Options,
    pub install_options: Options,
    pub user: Option<String>,
    pub group: Option<String>,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            runner: DEFAULT_RUNNER.iter().map(|token| token.to_string()).collect(),
            options: Options::Unset,
            list_options: Options::Unset,
            install_options: Options::Unset,
            user: None,
            group: None,
        }
    }
}

impl InstallerSettings {
    /// Settings for one package resource, with user/group falling back to
    /// the resource's parent environment.
    pub fn for_intent(intent: &PackageIntent, interpreter: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            options: intent.options.clone(),
            list_options: intent.list_options.clone(),
            install_options: intent.install_options.clone(),
            user: intent.effective_user().map(str::to_string),
            group: intent.effective_group().map(str::to_string),
            ..Self::default()
        }
    }

    fn action_options(&self, kind: ActionKind) -> &Options {
        match kind {
            ActionKind::Install => &self.install_options,
            ActionKind::List => &self.list_options,
        }
    }
}

pub struct Installer<'e> {
    settings: InstallerSettings,
    executor: &'e BlockingExecutor,
}

impl<'e> Installer<'e> {
    pub fn new(settings: InstallerSettings, executor: &'e BlockingExecutor) -> Self {
        Self { settings, executor }
    }

    pub fn settings(&self) -> &InstallerSettings {
        &self.settings
    }

    /// Builds an installer command using the configured global options and
    /// the option channel for `kind`.
    pub fn compose(
        &self,
        subcommand: Option<&str>,
        kind: ActionKind,
        extra_args: &[String],
    ) -> CommandSpec {
        self.compose_with_global(subcommand, &self.settings.options, kind, extra_args)
    }

    fn compose_with_global(
        &self,
        subcommand: Option<&str>,
        global_options: &Options,
        kind: ActionKind,
        extra_args: &[String],
    ) -> CommandSpec {
        compose_command(
            &self.settings.interpreter,
            &self.settings.runner,
            subcommand,
            global_options,
            self.settings.action_options(kind),
            extra_args,
        )
        .env("PIP_DISABLE_PIP_VERSION_CHECK", "1")
        .user(self.settings.user.as_deref())
        .group(self.settings.group.as_deref())
    }
}
