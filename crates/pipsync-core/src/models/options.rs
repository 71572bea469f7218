use serde::Deserialize;

/// Extra installer options as declared by the user.
///
/// A `Joined` value is a free-form, already shell-formatted string. Its
/// presence on either the global or the per-action side switches command
/// composition into shell-string mode.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum Options {
    #[default]
    Unset,
    Joined(String),
    Tokens(Vec<String>),
}

impl Options {
    pub fn is_joined(&self) -> bool {
        matches!(self, Self::Joined(_))
    }

    /// Returns a copy with `flag` placed ahead of any existing options,
    /// keeping the declared representation.
    pub fn with_leading_flag(&self, flag: &str) -> Self {
        match self {
            Self::Unset => Self::Tokens(vec![flag.to_string()]),
            Self::Joined(joined) if joined.trim().is_empty() => Self::Joined(flag.to_string()),
            Self::Joined(joined) => Self::Joined(format!("{flag} {joined}")),
            Self::Tokens(tokens) => {
                let mut prefixed = Vec::with_capacity(tokens.len() + 1);
                prefixed.push(flag.to_string());
                prefixed.extend(tokens.iter().cloned());
                Self::Tokens(prefixed)
            }
        }
    }
}

impl From<&str> for Options {
    fn from(value: &str) -> Self {
        Self::Joined(value.to_string())
    }
}

impl From<Vec<String>> for Options {
    fn from(value: Vec<String>) -> Self {
        Self::Tokens(value)
    }
}
