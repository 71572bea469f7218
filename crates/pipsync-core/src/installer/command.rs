use std::path::Path;

use crate::execution::{CommandSpec, shell};
use crate::models::Options;

/// Which per-action option channel a command draws from. The installer
/// has no uninstall-specific options, so uninstall uses `Install`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ActionKind {
    Install,
    List,
}

/// Composes `interpreter runner [subcommand] global action extra`.
///
/// A `Joined` value on either option side forces the whole command into a
/// single shell string: fixed tokens are quoted where needed and joined
/// strings are inserted verbatim. Otherwise the command is a discrete
/// argument list and no shell is involved. Blank option tokens and blank
/// joined strings are dropped in both modes.
pub fn compose_command(
    interpreter: &Path,
    runner: &[String],
    subcommand: Option<&str>,
    global_options: &Options,
    action_options: &Options,
    extra_args: &[String],
) -> CommandSpec {
    if global_options.is_joined() || action_options.is_joined() {
        let interpreter = interpreter.to_string_lossy();
        let mut parts: Vec<String> = std::iter::once(interpreter.as_ref())
            .chain(runner.iter().map(String::as_str))
            .chain(subcommand)
            .map(shell::quote)
            .collect();
        push_shell_options(&mut parts, global_options);
        push_shell_options(&mut parts, action_options);
        parts.extend(extra_args.iter().map(|arg| shell::quote(arg)));

        return CommandSpec::shell(parts.join(" "));
    }

    CommandSpec::new(interpreter)
        .args(runner.iter().cloned())
        .args(subcommand)
        .args(option_tokens(global_options).cloned())
        .args(option_tokens(action_options).cloned())
        .args(extra_args.iter().cloned())
}

fn push_shell_options(parts: &mut Vec<String>, options: &Options) {
    match options {
        Options::Joined(joined) => {
            let joined = joined.trim();
            if !joined.is_empty() {
                parts.push(joined.to_string());
            }
        }
        Options::Unset | Options::Tokens(_) => {
            parts.extend(option_tokens(options).map(|token| shell::quote(token)));
        }
    }
}

fn option_tokens(options: &Options) -> impl Iterator<Item = &String> {
    let tokens: &[String] = match options {
        Options::Tokens(tokens) => tokens,
        Options::Unset | Options::Joined(_) => &[],
    };
    tokens.iter().filter(|token| !token.trim().is_empty())
}
