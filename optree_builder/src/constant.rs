pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_ALIAS: &str = "?";
pub(crate) const HELP_MESSAGE: &str = "Show this help message and exit.";
pub(crate) const HELP_COMMAND_MESSAGE: &str = "Use 'help <command>' for extra details.";

pub(crate) const TERMINATOR: &str = "--";
pub(crate) const LONESOME_DASH: &str = "-";

/// Holds the partial command line when the shell asks for completions.
pub const COMPLETION_LINE_ENV: &str = "COMP_LINE";
/// When set alongside [`COMPLETION_LINE_ENV`], completions are produced readline-style.
pub const COMPLETION_READLINE_ENV: &str = "ZSHELL";
/// Tells the invoking shell to restart its completion search with the printed candidates.
pub const COMPLETION_EXIT_CODE: i32 = 124;
// Appended to a lone `--name=` candidate so the shell doesn't close the word with a space.
pub(crate) const COMPLETION_PLACEHOLDER: &str = "\u{b7}";
