use crate::parser::{Error, ErrorContext};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Where everything `optree` prints ends up.
///
/// The default, [`ConsoleInterface`], writes to stdout/stderr.
/// Supply another via [`CommandLineParser::build_with`](crate::CommandLineParser::build_with) to capture or redirect output.
pub trait UserInterface {
    /// Print a line of regular output (ex: help).
    fn print(&self, message: String);

    /// Print a warning (ex: an unknown option under [`UnknownMode::Warn`](crate::UnknownMode::Warn)).
    fn print_warning(&self, message: String);

    /// Print an error.
    fn print_error(&self, error: &Error);

    /// Print the command line with a marker under the offending token.
    fn print_error_context(&self, error_context: ErrorContext);

    /// Print one shell completion candidate.
    fn print_completion(&self, candidate: String);
}

/// Writes regular output and completions to stdout; warnings and errors to stderr.
#[derive(Debug, Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_warning(&self, message: String) {
        eprintln!("Warning: {message}");
    }

    fn print_error(&self, error: &Error) {
        eprintln!("{error}");
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        eprintln!("{error_context}");
    }

    fn print_completion(&self, candidate: String) {
        println!("{candidate}");
    }
}

/// Lays text out in two columns; the middle column wraps (hyphenating long words).
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    padding: usize,
    left: usize,
    middle: usize,
}

// We'll target 95% of the total width, to ensure the renderer doesn't literally use the full space.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Allows precisely 3 words of average length (5) with a space between them.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;

impl ColumnRenderer {
    /// Produce a renderer with the middle column fitted to `total_width` (when known).
    pub(crate) fn guided(
        padding: usize,
        left: usize,
        middle: usize,
        total_width: Option<usize>,
    ) -> Self {
        let non_middle = left + padding;

        let middle = match total_width {
            Some(total_width) => {
                let target_total_width = (total_width as f64 * TARGET_TOTAL_FACTOR) as usize;

                if middle + non_middle <= target_total_width {
                    std::cmp::max(middle, MINIMUM_MIDDLE_WIDTH)
                } else if non_middle < target_total_width {
                    std::cmp::max(target_total_width - non_middle, MINIMUM_MIDDLE_WIDTH)
                } else {
                    MINIMUM_MIDDLE_WIDTH
                }
            }
            None => std::cmp::min(middle, MINIMUM_MIDDLE_WIDTH),
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Columns left={left}, padding={padding} within {total_width:?}.  Selecting middle: {middle}.");
        }

        Self::new(padding, left, middle)
    }

    pub(crate) fn new(padding: usize, left: usize, middle: usize) -> Self {
        assert!(padding >= 1, "internal error - padding must be at least 1");
        // So that we can always hyphenate.
        assert!(middle >= 2, "internal error - middle must be at least 2");
        Self {
            padding,
            left,
            middle,
        }
    }

    pub(crate) fn render(&self, indent: usize, left: &str, middle: &str) -> Vec<String> {
        let padding = " ".repeat(self.padding);
        let left_width = self.left;
        let middle_width = std::cmp::max(self.middle.saturating_sub(indent), 2);
        let parts = chunk(middle, middle_width);

        if parts.is_empty() {
            return vec![format!("{:indent$}{left}", "")];
        }

        parts
            .into_iter()
            .enumerate()
            .map(|(i, part)| {
                if i == 0 {
                    format!("{:indent$}{left:left_width$}{padding}{part}", "")
                } else {
                    format!("{:indent$}{:left_width$}{padding}{part}", "", "")
                }
            })
            .collect()
    }
}

pub(crate) fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ').filter(|word| !word.is_empty()) {
        if current.is_empty() {
            hyphenate(width, &mut lines, &mut current, word);
        } else if current.chars().count() + word.chars().count() < width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            hyphenate(width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

// Split a word that doesn't fit the width over several lines.
fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let characters: Vec<char> = word.chars().collect();
    let mut rest: &[char] = &characters;

    while rest.len() > width {
        let (head, tail) = rest.split_at(width - 1);
        lines.push(format!("{}-", head.iter().collect::<String>()));
        rest = tail;
    }

    current.extend(rest.iter());
}
