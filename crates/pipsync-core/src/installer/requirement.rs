use crate::installer::normalize_name;

/// Turns positional name/version pairs into installer requirement tokens.
///
/// Each token is one of: a URL/VCS reference, a bare name, `name==version`
/// for digit-leading versions, or `name` followed directly by an
/// operator-prefixed specifier such as `>=2.0`. A missing version is
/// treated as empty.
pub fn build_requirements<N, V>(names: &[N], versions: &[V], use_normalized_names: bool) -> Vec<String>
where
    N: AsRef<str>,
    V: AsRef<str>,
{
    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let version = versions.get(index).map_or("", |version| version.as_ref());
            if use_normalized_names {
                requirement(&normalize_name(name.as_ref()), version)
            } else {
                requirement(name.as_ref(), version)
            }
        })
        .collect()
}

fn requirement(name: &str, version: &str) -> String {
    let version = version.trim();

    if name.contains("://") {
        name.to_string()
    } else if version.contains("://") {
        version.to_string()
    } else if version.is_empty() {
        name.to_string()
    } else if version.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{name}=={version}")
    } else {
        format!("{name}{version}")
    }
}
