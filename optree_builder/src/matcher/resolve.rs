use std::collections::BTreeMap;

/// The outcome of looking an option name up against a node's aliases.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Resolution<'m, T> {
    /// Matched exactly one alias (`alias`, the value it maps to).
    Found(&'m str, &'m T),
    /// Matched nothing.
    Unknown,
    /// Prefix-matched several aliases (sorted).
    Ambiguous(Vec<String>),
}

/// Resolve `name` against `aliases`.
///
/// An exact match always wins, even when it is also the prefix of another alias.
/// Otherwise `name` must be the prefix of precisely one alias.
pub(crate) fn resolve<'m, T>(aliases: &'m BTreeMap<String, T>, name: &str) -> Resolution<'m, T> {
    if let Some((alias, value)) = aliases.get_key_value(name) {
        return Resolution::Found(alias, value);
    }

    // BTreeMap iterates in key order, so the candidates come out sorted.
    let mut candidates: Vec<(&'m String, &'m T)> = aliases
        .range(name.to_string()..)
        .take_while(|(alias, _)| alias.starts_with(name))
        .collect();

    match candidates.len() {
        0 => Resolution::Unknown,
        1 => {
            let (alias, value) = candidates.remove(0);
            Resolution::Found(alias, value)
        }
        _ => Resolution::Ambiguous(
            candidates
                .into_iter()
                .map(|(alias, _)| alias.clone())
                .collect(),
        ),
    }
}
