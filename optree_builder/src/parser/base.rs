use thiserror::Error;

use crate::model::ValueKind;

/// A mistake in how the command line parser was declared.
///
/// These indicate a bug in the program using `optree`, not a user input problem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An option declared without a name.
    #[error("Config error: options require a name.")]
    EmptyOptionName,

    /// A name/alias that already exists in the command.
    #[error("Config error: cannot duplicate the option '{alias}' in '{command}'.")]
    DuplicateOption {
        /// The command being declared against.
        command: String,
        /// The repeated name/alias.
        alias: String,
    },

    /// A name/alias that would shadow a different option in a sub-command.
    #[error("Config error: option '{alias}' collides with another option of the same name in '{command}'.")]
    AliasCollision {
        /// The sub-command where the collision happens.
        command: String,
        /// The colliding name/alias.
        alias: String,
    },

    /// A command declared without a name.
    #[error("Config error: commands require a name.")]
    EmptyCommandName,

    /// A command name that already exists under the same parent.
    #[error("Config error: cannot duplicate the command '{0}'.")]
    DuplicateCommand(String),

    /// An arity with `min < 1` or `max < min`.
    #[error("Config error: option '{option}' has an invalid arity (min={min}, max={max}); min must be at least 1 and max at least min.")]
    InvalidArity {
        /// The option name.
        option: String,
        /// The declared minimum.
        min: usize,
        /// The declared maximum.
        max: usize,
    },

    /// An arity declared on an option that takes a fixed number of arguments.
    #[error("Config error: option '{option}' of type {kind} does not accept a custom arity.")]
    ArityNotSupported {
        /// The option name.
        option: String,
        /// The option type.
        kind: ValueKind,
    },

    /// An environment variable bound to a repeated/map option.
    #[error("Config error: option '{option}' of type {kind} cannot be read from the environment.")]
    EnvNotSupported {
        /// The option name.
        option: String,
        /// The option type.
        kind: ValueKind,
    },
}

/// A problem with the tokens given on the command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The option needs an argument, but the tokens ran out.
    #[error("Missing argument for option '{0}'.")]
    MissingArgument(String),

    /// The option needs an argument, but the next token is itself an option.
    #[error("Missing argument for option '{option}' ('{token}' is an option); use '--{option}={token}' to pass an argument starting with '-'.")]
    ArgumentLooksLikeOption {
        /// The option name.
        option: String,
        /// The option-looking token.
        token: String,
    },

    /// The argument cannot be converted to the option's type.
    #[error("Option '{option}' cannot convert '{token}' to {expected}.")]
    InvalidConversion {
        /// The option name.
        option: String,
        /// The offending argument.
        token: String,
        /// What the argument should have looked like.
        expected: &'static str,
    },

    /// A map option argument without the `=` separator.
    #[error("Option '{option}' expects a 'key=value' argument, found '{token}'.")]
    NotKeyValue {
        /// The option name.
        option: String,
        /// The offending argument.
        token: String,
    },

    /// The argument is not one of the option's valid values.
    #[error("Option '{option}' does not accept '{token}' (valid values: {}).", .valid.join(", "))]
    InvalidChoice {
        /// The option name.
        option: String,
        /// The offending argument.
        token: String,
        /// The declared valid values.
        valid: Vec<String>,
    },

    /// An abbreviation matching several options.
    #[error("Ambiguous option '{token}', matches: {}.", .candidates.join(", "))]
    Ambiguous {
        /// The abbreviated option name.
        token: String,
        /// Every matching name/alias, sorted.
        candidates: Vec<String>,
    },

    /// An option-looking token matching no option (reported when the unknown mode is `Fail`).
    #[error("Unknown option '{0}'.")]
    UnknownOption(String),

    /// A required option that was neither given on the command line nor found in the environment.
    #[error("Missing required option '{0}'.")]
    MissingRequiredOption(String),
}

/// The error reported by command handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// The outcome of an unsuccessful [`Program`](crate::Program) call.
#[derive(Debug, Error)]
pub enum Error {
    /// Help was requested (and has already been printed).
    #[error("Help requested.")]
    Help,

    /// The command line could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The dispatched command handler failed.
    #[error("Command error: {0}")]
    Handler(HandlerError),
}

impl Error {
    /// The process exit code for this outcome: `0` for help, otherwise `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Help => 0,
            Error::Parse(_) | Error::Handler(_) => 1,
        }
    }
}
