use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use pipsync_core::execution::{BlockingExecutor, TokioProcessExecutor};
use pipsync_core::installer::{Installer, InstallerSettings};
use pipsync_core::manifest::Manifest;
use pipsync_core::models::{CoreError, VersionInfo};
use pipsync_core::plan::{ReconcileReport, reconcile};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PIPSYNC_LOG";
const USAGE: &str = "usage: pipsync [--dry-run] [--json] [--python PATH] <manifest.json>";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    manifest: PathBuf,
    python: Option<PathBuf>,
    dry_run: bool,
    json: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut manifest = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dry-run" => parsed.dry_run = true,
            "--json" => parsed.json = true,
            "--python" => {
                let path = args.next().ok_or("--python requires a path")?;
                parsed.python = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option '{flag}'")),
            path => {
                if manifest.replace(PathBuf::from(path)).is_some() {
                    return Err("only one manifest may be given".to_string());
                }
            }
        }
    }

    parsed.manifest = manifest.ok_or("missing manifest path")?;
    Ok(parsed)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: &CliArgs) -> Result<(), CoreError> {
    let manifest = Manifest::load(&args.manifest)?;
    let intents = manifest.intents()?;
    let interpreter = args.python.clone().unwrap_or_else(|| manifest.interpreter());
    let executor = BlockingExecutor::new(Arc::new(TokioProcessExecutor))?;

    tracing::debug!(
        manifest = %args.manifest.display(),
        interpreter = %interpreter.display(),
        resources = intents.len(),
        "reconciling python packages"
    );

    for intent in &intents {
        let installer = Installer::new(
            InstallerSettings::for_intent(intent, interpreter.clone()),
            &executor,
        );
        let report = reconcile(&installer, intent, args.dry_run)?;
        if args.json {
            println!("{}", report_json(&intent.names, &report));
        } else {
            println!("{}", report_line(&report));
        }
    }

    Ok(())
}

fn report_line(report: &ReconcileReport) -> String {
    let mut line = if report.changed.is_empty() {
        format!("{}: up to date", report.action.as_str())
    } else if report.dry_run {
        format!("{}: would change {}", report.action.as_str(), report.changed.join(" "))
    } else {
        format!("{}: changed {}", report.action.as_str(), report.changed.join(" "))
    };
    if !report.skipped.is_empty() {
        line.push_str(&format!(" (skipped downgrade: {})", report.skipped.join(" ")));
    }
    line
}

fn report_json(names: &[String], report: &ReconcileReport) -> serde_json::Value {
    let versions: serde_json::Map<String, serde_json::Value> = names
        .iter()
        .zip(&report.versions)
        .map(|(name, info)| (name.clone(), version_json(info)))
        .collect();

    serde_json::json!({
        "action": report.action.as_str(),
        "changed": report.changed,
        "skipped": report.skipped,
        "dry_run": report.dry_run,
        "versions": versions,
    })
}

fn version_json(info: &VersionInfo) -> serde_json::Value {
    serde_json::json!({
        "current": info.current,
        "candidate": info.candidate,
    })
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("pipsync: {message}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    init_logging();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(kind = ?error.kind, action = ?error.action, "reconciliation failed");
            eprintln!("pipsync: {}", error.message);
            if let Some(output) = error.output.as_ref()
                && !output.stdout.trim().is_empty()
            {
                eprintln!("{}", output.stdout.trim_end());
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pipsync_core::models::{PackageAction, VersionInfo};
    use pipsync_core::plan::ReconcileReport;

    use super::{CliArgs, parse_args, report_json, report_line};

    fn args(values: &[&str]) -> Result<CliArgs, String> {
        parse_args(values.iter().map(|value| value.to_string()))
    }

    #[test]
    fn parses_flags_in_any_order() {
        let parsed = args(&["--python", "/srv/venv/bin/python", "site.json", "--dry-run"]).unwrap();
        assert_eq!(
            parsed,
            CliArgs {
                manifest: PathBuf::from("site.json"),
                python: Some(PathBuf::from("/srv/venv/bin/python")),
                dry_run: true,
                json: false,
            }
        );
    }

    #[test]
    fn rejects_bad_usage() {
        assert!(args(&[]).is_err());
        assert!(args(&["--python"]).is_err());
        assert!(args(&["--verbose", "site.json"]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
    }

    fn report(changed: &[&str], dry_run: bool) -> ReconcileReport {
        ReconcileReport {
            action: PackageAction::Upgrade,
            changed: changed.iter().map(|name| name.to_string()).collect(),
            skipped: vec!["six".to_string()],
            versions: vec![VersionInfo {
                current: Some("1.8.2".to_string()),
                candidate: Some("1.9.0".to_string()),
            }],
            dry_run,
        }
    }

    #[test]
    fn summary_lines_describe_outcome() {
        assert_eq!(
            report_line(&report(&["django"], true)),
            "upgrade: would change django (skipped downgrade: six)"
        );
        assert_eq!(
            report_line(&report(&[], false)),
            "upgrade: up to date (skipped downgrade: six)"
        );
    }

    #[test]
    fn json_report_keys_versions_by_declared_name() {
        let value = report_json(&["Django".to_string()], &report(&["Django"], false));
        assert_eq!(value["action"], "upgrade");
        assert_eq!(value["versions"]["Django"]["candidate"], "1.9.0");
        assert_eq!(value["dry_run"], false);
    }
}
