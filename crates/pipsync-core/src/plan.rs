//! Convergence decisions: which declared packages need the resource's
//! action, given what the installer reported.

use std::cmp::Ordering;

use crate::installer::Installer;
use crate::models::{InstallerResult, PackageAction, PackageIntent, VersionInfo, VersionTable};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Plan {
    pub action: PackageAction,
    pub names: Vec<String>,
    pub versions: Vec<String>,
    /// Packages left alone because acting would downgrade them.
    pub skipped: Vec<String>,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReconcileReport {
    pub action: PackageAction,
    pub changed: Vec<String>,
    pub skipped: Vec<String>,
    /// Version data in declared order, as read before any change.
    pub versions: Vec<VersionInfo>,
    pub dry_run: bool,
}

/// Selects the packages of `intent` whose state differs from the target.
pub fn plan(intent: &PackageIntent, table: &VersionTable) -> Plan {
    let mut plan = Plan {
        action: intent.action,
        ..Plan::default()
    };

    let infos = table.project(&intent.names);
    for ((name, version), info) in intent.names.iter().zip(&intent.versions).zip(&infos) {
        let version = version.trim();
        let current = info.current.as_deref();

        let (needs_action, target) = match intent.action {
            PackageAction::Install => {
                let differs = current.is_none_or(|current| is_exact_pin(version) && version != current);
                (differs, Some(version))
            }
            PackageAction::Upgrade => {
                // An exact pin is what the upgrade command installs, so it
                // decides both convergence and the downgrade target.
                let pin = is_exact_pin(version).then_some(version);
                let candidate = info.candidate.as_deref();
                let differs = match (current, pin) {
                    (None, _) => true,
                    (Some(current), Some(pin)) => pin != current,
                    (Some(current), None) => candidate.is_some_and(|c| c != current),
                };
                (differs, pin.or(candidate))
            }
            PackageAction::Remove => (current.is_some(), None),
        };

        if !needs_action {
            continue;
        }

        if !intent.allow_downgrade
            && let (Some(current), Some(target)) = (current, target)
            && is_downgrade(current, target)
        {
            tracing::warn!(
                package = name.as_str(),
                current,
                target,
                "refusing to downgrade python package"
            );
            plan.skipped.push(name.clone());
            continue;
        }

        plan.names.push(name.clone());
        plan.versions.push(version.to_string());
    }

    plan
}

/// Loads versions, plans, and unless `dry_run` executes the plan as one
/// batched installer call.
pub fn reconcile(
    installer: &Installer<'_>,
    intent: &PackageIntent,
    dry_run: bool,
) -> InstallerResult<ReconcileReport> {
    let table = installer.load_versions(&intent.names, &intent.versions)?;
    let plan = plan(intent, &table);

    if plan.is_noop() {
        tracing::info!(
            packages = %intent.names.join(" "),
            action = intent.action.as_str(),
            "python packages up to date"
        );
    } else if dry_run {
        tracing::info!(
            packages = %plan.names.join(" "),
            action = plan.action.as_str(),
            "dry run, not changing python packages"
        );
    } else {
        match plan.action {
            PackageAction::Install => installer.install(&plan.names, &plan.versions)?,
            PackageAction::Upgrade => installer.upgrade(&plan.names, &plan.versions)?,
            PackageAction::Remove => installer.remove(&plan.names, &plan.versions)?,
        };
    }

    Ok(ReconcileReport {
        action: plan.action,
        changed: plan.names,
        skipped: plan.skipped,
        versions: table.project(&intent.names),
        dry_run,
    })
}

fn is_exact_pin(version: &str) -> bool {
    version.starts_with(|c: char| c.is_ascii_digit())
}

/// True only when both versions are plain dotted release numbers and the
/// target sorts below the current one.
fn is_downgrade(current: &str, target: &str) -> bool {
    match (release_segments(current), release_segments(target)) {
        (Some(current), Some(target)) => compare_release(&target, &current) == Ordering::Less,
        _ => false,
    }
}

fn release_segments(version: &str) -> Option<Vec<u64>> {
    version
        .trim()
        .split('.')
        .map(|segment| segment.parse::<u64>().ok())
        .collect()
}

fn compare_release(left: &[u64], right: &[u64]) -> Ordering {
    let len = left.len().max(right.len());
    (0..len)
        .map(|index| {
            let l = left.get(index).copied().unwrap_or(0);
            let r = right.get(index).copied().unwrap_or(0);
            l.cmp(&r)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::{is_downgrade, plan};
    use crate::models::{PackageAction, PackageIntent, VersionTable};

    fn table(rows: &[(&str, Option<&str>, Option<&str>)]) -> VersionTable {
        let mut table = VersionTable::new();
        for (name, current, candidate) in rows {
            let entry = table.entry(*name);
            entry.current = current.map(str::to_string);
            entry.candidate = candidate.map(str::to_string);
        }
        table
    }

    #[test]
    fn install_targets_missing_and_mismatched_pins() {
        let intent = PackageIntent::new(
            vec!["django".into(), "six".into(), "requests".into(), "boto".into()],
            vec!["1.8.3".into(), "".into(), ">=2.0".into(), "2.25.0".into()],
        )
        .unwrap();
        let versions = table(&[
            ("django", Some("1.8.2"), None),
            ("requests", Some("2.31.0"), None),
            ("boto", Some("2.25.0"), None),
        ]);

        let plan = plan(&intent, &versions);
        assert_eq!(plan.action, PackageAction::Install);
        assert_eq!(plan.names, vec!["django", "six"]);
        assert_eq!(plan.versions, vec!["1.8.3", ""]);
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn upgrade_follows_candidate_version() {
        let intent = PackageIntent::new(
            vec!["Django".into(), "pip".into()],
            vec!["1.8.3".into(), "".into()],
        )
        .unwrap()
        .action(PackageAction::Upgrade);
        let versions = table(&[
            ("django", Some("1.8.2"), Some("1.9.0")),
            ("pip", Some("24.0"), Some("24.0")),
        ]);

        let plan = plan(&intent, &versions);
        assert_eq!(plan.names, vec!["Django"]);
        assert_eq!(plan.versions, vec!["1.8.3"]);
    }

    #[test]
    fn remove_targets_installed_packages_only() {
        let intent = PackageIntent::new(vec!["a".into(), "b".into()], Vec::new())
            .unwrap()
            .action(PackageAction::Remove);
        let versions = table(&[("b", Some("1.0"), None)]);

        let plan = plan(&intent, &versions);
        assert_eq!(plan.names, vec!["b"]);
    }

    #[test]
    fn downgrade_is_skipped_unless_allowed() {
        let intent = PackageIntent::single("django", Some("1.7.0"));
        let versions = table(&[("django", Some("1.8.2"), None)]);

        let refused = plan(&intent, &versions);
        assert!(refused.is_noop());
        assert_eq!(refused.skipped, vec!["django"]);

        let allowed = plan(&intent.clone().allow_downgrade(true), &versions);
        assert_eq!(allowed.names, vec!["django"]);

        // The upgrade installs the pin, so a newer candidate must not hide
        // the downgrade.
        let upgrade = PackageIntent::single("django", Some("1.7.0")).action(PackageAction::Upgrade);
        let newer = table(&[("django", Some("1.8.2"), Some("5.0"))]);

        let refused = plan(&upgrade, &newer);
        assert!(refused.is_noop());
        assert_eq!(refused.skipped, vec!["django"]);

        let allowed = plan(&upgrade.clone().allow_downgrade(true), &newer);
        assert_eq!(allowed.names, vec!["django"]);
        assert_eq!(allowed.versions, vec!["1.7.0"]);
    }

    #[test]
    fn upgrade_pin_matching_current_is_satisfied() {
        let intent = PackageIntent::single("django", Some("1.8.3")).action(PackageAction::Upgrade);
        let versions = table(&[("django", Some("1.8.3"), Some("1.9.0"))]);

        let plan = plan(&intent, &versions);
        assert!(plan.is_noop());
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn unpinned_upgrade_guards_on_candidate() {
        let intent = PackageIntent::single("pip", Some(">=19")).action(PackageAction::Upgrade);
        let versions = table(&[("pip", Some("24.0"), Some("23.3"))]);

        let plan = plan(&intent, &versions);
        assert!(plan.is_noop());
        assert_eq!(plan.skipped, vec!["pip"]);
    }

    #[test]
    fn nothing_to_do_is_noop() {
        let intent = PackageIntent::single("six", Some("1.16.0"));
        let versions = table(&[("six", Some("1.16.0"), Some("1.16.0"))]);
        assert!(plan(&intent, &versions).is_noop());
    }

    #[test]
    fn downgrade_detection_needs_plain_release_numbers() {
        assert!(is_downgrade("1.8.2", "1.7"));
        assert!(!is_downgrade("1.8", "1.8.0"));
        assert!(!is_downgrade("1.8.2", "1.9.0"));
        assert!(!is_downgrade("1.8.2", "1.7rc1"));
        assert!(!is_downgrade("2.0", ""));
    }
}
