use regex::Regex;
use std::sync::OnceLock;

use crate::constant::COMPLETION_PLACEHOLDER;
use crate::model::{CompletionMode, ValueKind};
use crate::tree::{NodeId, OptionDescriptor, Tree};

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("internal error - whitespace pattern must compile"))
}

/// Split the shell's partial command line into the tokens to scan.
///
/// The program name is dropped.
/// A trailing empty token (the line ends in whitespace) is kept only when the word being completed is empty.
pub(crate) fn split_line(line: &str, current_word: &str) -> Vec<String> {
    let mut parts: Vec<String> = whitespace_regex()
        .split(line.trim_start())
        .map(String::from)
        .collect();

    if parts.len() > 1 && parts.last().map(String::is_empty).unwrap_or(false) && !current_word.is_empty() {
        parts.pop();
    }

    parts.into_iter().skip(1).collect()
}

/// Completion candidates for `partial` at the command `node`.
///
/// Option-looking partials (a leading dash, or slash with `windows`) complete against the visible option names/aliases.
/// Anything else completes against the sub-command names and the command's text suggestions.
pub(crate) fn complete(
    tree: &Tree,
    node: NodeId,
    partial: &str,
    mode: CompletionMode,
    windows: bool,
) -> Vec<String> {
    let command = tree.node(node);
    let mut candidates = Vec::default();
    let option_body = match partial.strip_prefix('/') {
        Some(body) if windows => Some(body),
        _ if partial.starts_with('-') => Some(partial.trim_start_matches('-')),
        _ => None,
    };

    if let Some(stripped) = option_body {
        let separated = stripped.split_once(|c: char| c == '=' || (windows && c == ':'));

        if let Some((name, value)) = separated {
            if let Some(id) = command.options.get(name) {
                candidates.extend(
                    values(tree.option(*id), value)
                        .into_iter()
                        .map(|v| format!("--{name}={v}")),
                );
            }
        } else {
            for (alias, id) in command
                .options
                .range(stripped.to_string()..)
                .take_while(|(alias, _)| alias.starts_with(stripped))
            {
                let option = tree.option(*id);

                if option.kind() == ValueKind::Bool {
                    candidates.push(format!("--{alias}"));
                } else {
                    candidates.push(format!("--{alias}="));
                    candidates.extend(
                        values(option, "")
                            .into_iter()
                            .map(|v| format!("--{alias}={v}")),
                    );
                }
            }

            if candidates.len() == 1 && candidates[0].ends_with('=') {
                // Keeps the shell from closing the word, so the argument may follow immediately.
                let placeholder = format!("{}{COMPLETION_PLACEHOLDER}", candidates[0]);
                candidates.push(placeholder);
            }
        }
    } else {
        candidates.extend(
            command
                .children
                .keys()
                .filter(|name| name.starts_with(partial))
                .cloned(),
        );

        if let Some(suggestions) = &command.suggestions {
            candidates.extend(
                suggestions
                    .candidates(partial)
                    .into_iter()
                    .filter(|s| s.starts_with(partial)),
            );
        }
    }

    finish(candidates, mode)
}

/// Completion candidates for an argument of `option`.
pub(crate) fn complete_value(
    option: &OptionDescriptor,
    partial: &str,
    mode: CompletionMode,
) -> Vec<String> {
    finish(values(option, partial), mode)
}

fn values(option: &OptionDescriptor, partial: &str) -> Vec<String> {
    option
        .suggested
        .iter()
        .chain(option.valid.iter())
        .filter(|v| v.starts_with(partial))
        .cloned()
        .collect()
}

fn finish(mut candidates: Vec<String>, mode: CompletionMode) -> Vec<String> {
    candidates.sort();
    candidates.dedup();

    if mode == CompletionMode::Readline && candidates.len() == 1 {
        candidates[0].push(' ');
    }

    candidates
}
