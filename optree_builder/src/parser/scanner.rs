use crate::matcher::{classify, resolve, ArgumentCounter, OptionPair, Resolution, Token};
use crate::model::{CompletionMode, Mode, UnknownMode};
use crate::parser::completion::{complete, complete_value};
use crate::parser::ParseError;
use crate::tree::{NodeId, OptionId, Tree, UnknownOption};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The result of a successful scan.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Scan {
    /// The deepest command reached.
    pub node: NodeId,
    /// The candidates, when scanning for completion.
    pub completions: Vec<String>,
}

/// A scan failure, pointing at the offending token.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ScanError {
    pub index: usize,
    pub error: ParseError,
}

/// Walk `tokens` from the command `start`, saving option values into the tree as they are matched.
///
/// Text is appended to the command being scanned at the time.
/// In completion mode, scanning stops at the final token and computes the candidates for it.
pub(crate) fn scan(
    completion: Option<CompletionMode>,
    tree: &mut Tree,
    start: NodeId,
    tokens: &[String],
    mode: Mode,
    windows: bool,
) -> Result<Scan, ScanError> {
    Scanner {
        tree,
        tokens,
        mode,
        windows,
        completion,
        current: start,
        index: 0,
    }
    .run()
}

enum Step {
    Continue,
    Stop,
    Complete(Vec<String>),
}

struct Scanner<'a> {
    tree: &'a mut Tree,
    tokens: &'a [String],
    mode: Mode,
    windows: bool,
    completion: Option<CompletionMode>,
    current: NodeId,
    // The token being scanned.
    index: usize,
}

impl<'a> Scanner<'a> {
    fn run(mut self) -> Result<Scan, ScanError> {
        let tokens = self.tokens;

        loop {
            if let Some(completion) = self.completion {
                if tokens.is_empty() || self.index + 1 == tokens.len() {
                    let partial = tokens
                        .get(self.index)
                        .map(String::as_str)
                        .unwrap_or_default();
                    let completions =
                        complete(self.tree, self.current, partial, completion, self.windows);
                    return Ok(self.finish(completions));
                }
            }

            let token = match tokens.get(self.index) {
                Some(token) => token,
                None => break,
            };

            let step = match classify(token, self.mode, self.windows) {
                Token::Terminator => {
                    self.flush(self.index + 1);
                    Step::Stop
                }
                Token::Option(pairs) => self.options(token, pairs)?,
                Token::Text => self.text(token),
            };

            match step {
                Step::Continue => self.index += 1,
                Step::Stop => break,
                Step::Complete(completions) => return Ok(self.finish(completions)),
            }
        }

        Ok(self.finish(Vec::default()))
    }

    fn finish(self, completions: Vec<String>) -> Scan {
        Scan {
            node: self.current,
            completions,
        }
    }

    // Move the tokens from `from` onwards (verbatim) into the current command's text.
    fn flush(&mut self, from: usize) {
        let tokens = self.tokens;
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Flushing {} token(s) into text.", tokens.len() - from);
        }
        self.tree
            .node_mut(self.current)
            .text
            .extend(tokens[from..].iter().cloned());
    }

    fn text(&mut self, token: &str) -> Step {
        let child = self.tree.node(self.current).children.get(token).copied();

        if let Some(child) = child {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Descending into command '{token}'.");
            }
            self.current = child;
            return Step::Continue;
        }

        if self.tree.node(self.current).settings.require_order {
            self.flush(self.index);
            Step::Stop
        } else {
            self.tree
                .node_mut(self.current)
                .text
                .push(token.to_string());
            Step::Continue
        }
    }

    fn options(&mut self, token: &str, pairs: Vec<OptionPair>) -> Result<Step, ScanError> {
        // A token with several unknown pieces is forwarded once.
        let mut forwarded = false;

        for pair in pairs {
            let resolved = match resolve(&self.tree.node(self.current).options, &pair.name) {
                Resolution::Found(alias, id) => Some((alias.to_string(), *id)),
                Resolution::Unknown => None,
                Resolution::Ambiguous(candidates) => {
                    return Err(ScanError {
                        index: self.index,
                        error: ParseError::Ambiguous {
                            token: pair.name,
                            candidates,
                        },
                    });
                }
            };

            match resolved {
                Some((alias, id)) => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Matched '{}' to the option {id:?} via '{alias}'.", pair.name);
                    }
                    self.tree.option_mut(id).mark_called(alias);

                    if let Some(completions) = self.arguments(id, pair.argument)? {
                        return Ok(Step::Complete(completions));
                    }
                }
                None => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("No option matches '{}'.", pair.name);
                    }
                    let node = self.tree.node_mut(self.current);
                    node.unknown.push(UnknownOption {
                        index: self.index,
                        token: token.to_string(),
                        name: pair.name,
                        argument: pair.argument,
                    });

                    if node.settings.require_order {
                        self.flush(self.index);
                        return Ok(Step::Stop);
                    }

                    if node.settings.unknown_mode != UnknownMode::Fail && !forwarded {
                        node.text.push(token.to_string());
                        forwarded = true;
                    }
                }
            }
        }

        Ok(Step::Continue)
    }

    // Take the arguments for the option `id`: first up to its minimum (required), then up to its maximum (as available).
    fn arguments(
        &mut self,
        id: OptionId,
        inline: Option<String>,
    ) -> Result<Option<Vec<String>>, ScanError> {
        let tokens = self.tokens;
        let lower_keys = self.tree.node(self.current).settings.map_keys_lower;
        let option_index = self.index;
        let option = self.tree.option_mut(id);
        let mut counter = ArgumentCounter::new(option.bound());

        if let Some(argument) = inline {
            option
                .save(&argument, lower_keys)
                .map_err(|error| ScanError {
                    index: option_index,
                    error,
                })?;
            counter.push();
        }

        while !counter.is_satisfied() {
            let next = self.index + 1;

            if let Some(completion) = self.completion {
                if next + 1 == tokens.len() {
                    if option.optional && !is_text(&tokens[next], self.mode, self.windows) {
                        // The argument may be left out, so the final token completes as usual.
                        break;
                    }

                    return Ok(Some(complete_value(option, &tokens[next], completion)));
                }
            }

            match tokens.get(next) {
                Some(token) if is_text(token, self.mode, self.windows) => {
                    option
                        .save(token, lower_keys)
                        .map_err(|error| ScanError { index: next, error })?;
                    counter.push();
                    self.index = next;
                }
                _ if option.optional => {
                    if counter.provided() == 0 {
                        option.restore_default();
                    }
                    break;
                }
                Some(token) => {
                    return Err(ScanError {
                        index: option_index,
                        error: ParseError::ArgumentLooksLikeOption {
                            option: option.name().to_string(),
                            token: token.clone(),
                        },
                    });
                }
                None => {
                    return Err(ScanError {
                        index: option_index,
                        error: ParseError::MissingArgument(option.name().to_string()),
                    });
                }
            }
        }

        while counter.is_open() {
            let next = self.index + 1;

            if self.completion.is_some() && next + 1 == tokens.len() {
                // Leave the final token to the regular completion.
                break;
            }

            match tokens.get(next) {
                Some(token) if is_text(token, self.mode, self.windows) && option.accepts(token) => {
                    option
                        .save(token, lower_keys)
                        .map_err(|error| ScanError { index: next, error })?;
                    counter.push();
                    self.index = next;
                }
                _ => break,
            }
        }

        Ok(None)
    }
}

fn is_text(token: &str, mode: Mode, windows: bool) -> bool {
    matches!(classify(token, mode, windows), Token::Text)
}
