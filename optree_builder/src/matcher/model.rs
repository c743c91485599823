/// One option named by a token, with its inline argument (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionPair {
    pub name: String,
    pub argument: Option<String>,
}

impl OptionPair {
    pub(crate) fn new(name: impl Into<String>, argument: Option<String>) -> Self {
        Self {
            name: name.into(),
            argument,
        }
    }
}

/// The classification of a single raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// The literal `--`.
    Terminator,
    /// An option-looking token, decomposed into one or more pairs.
    Option(Vec<OptionPair>),
    /// Anything else.
    Text,
}

/// The number of tokens an option occurrence consumes: `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bound {
    min: usize,
    max: usize,
}

impl Bound {
    pub(crate) fn new(min: usize, max: usize) -> Self {
        assert!(min <= max, "internal error - bound min must not exceed max");
        Self { min, max }
    }

    pub(crate) fn min(&self) -> usize {
        self.min
    }

    pub(crate) fn max(&self) -> usize {
        self.max
    }
}

/// Tracks how many arguments one option occurrence has taken so far.
#[derive(Debug)]
pub(crate) struct ArgumentCounter {
    bound: Bound,
    provided: usize,
}

impl ArgumentCounter {
    pub(crate) fn new(bound: Bound) -> Self {
        Self { bound, provided: 0 }
    }

    pub(crate) fn push(&mut self) {
        self.provided += 1;
    }

    pub(crate) fn provided(&self) -> usize {
        self.provided
    }

    /// More arguments may still be taken.
    pub(crate) fn is_open(&self) -> bool {
        self.provided < self.bound.max
    }

    /// The minimum has been reached.
    pub(crate) fn is_satisfied(&self) -> bool {
        self.provided >= self.bound.min
    }
}
