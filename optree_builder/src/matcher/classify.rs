use regex::Regex;
use std::sync::OnceLock;

use crate::constant::{LONESOME_DASH, TERMINATOR};
use crate::matcher::model::{OptionPair, Token};
use crate::model::Mode;

// prefix, body, optional separator + argument
fn option_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^(--?)([^=]+)(=.*)?$")
            .expect("internal error - option pattern must compile")
    })
}

fn windows_option_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^(--?|/)([^=:]+)([=:].*)?$")
            .expect("internal error - windows option pattern must compile")
    })
}

/// Decide whether `token` is an option, and if so which option(s) it names.
///
/// 1. Find a 'long' option, such as:
///  --initial
///  --initial=..
///  /initial:..    (windows style)
/// 2. Find 'short' option(s), decomposed per the `mode`:
///  -i             (all modes)
///  -iv            (Normal: `iv`, Bundling: `i` `v`, SingleDash: `i` with `v`)
///  -iv=..         (Bundling: only `v` takes the argument)
/// 3. Anything else is plain text.
///
/// This never looks at which options are declared.
pub(crate) fn classify(token: &str, mode: Mode, windows: bool) -> Token {
    if token == TERMINATOR {
        return Token::Terminator;
    }

    if token == LONESOME_DASH {
        return Token::Option(vec![OptionPair::new(LONESOME_DASH, None)]);
    }

    let regex = if windows {
        windows_option_regex()
    } else {
        option_regex()
    };

    let captures = match regex.captures(token) {
        Some(captures) => captures,
        None => return Token::Text,
    };
    let prefix = &captures[1];
    let body = &captures[2];

    if prefix == "-" && token.starts_with(TERMINATOR) {
        // The pattern backtracked off a `--` prefix (ex: `--=arg`), so the body is really empty.
        return Token::Text;
    }

    let suffix = captures.get(3).map(|m| m.as_str());
    // The suffix always starts with its (single byte) separator.
    let argument = suffix.map(|s| s[1..].to_string());

    if prefix == "--" || prefix == "/" {
        return Token::Option(vec![OptionPair::new(body, argument)]);
    }

    match mode {
        Mode::Normal => Token::Option(vec![OptionPair::new(body, argument)]),
        Mode::Bundling => {
            let mut pairs: Vec<OptionPair> = body
                .chars()
                .map(|single| OptionPair::new(single.to_string(), None))
                .collect();

            if let Some(last) = pairs.last_mut() {
                last.argument = argument;
            }

            Token::Option(pairs)
        }
        Mode::SingleDash => {
            let mut chars = body.chars();
            let head = chars
                .next()
                .expect("internal error - the option body matches at least one character");
            let rest = format!("{}{}", chars.as_str(), suffix.unwrap_or_default());
            let argument = if rest.is_empty() { None } else { Some(rest) };
            Token::Option(vec![OptionPair::new(head.to_string(), argument)])
        }
    }
}
