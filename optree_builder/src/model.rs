use std::collections::BTreeMap;

/// How a single-dash token (`-abc`) is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// `-abc` names the option `abc` (same as `--abc`).
    #[default]
    Normal,
    /// `-abc` names the three options `a`, `b` and `c`.
    /// An `=` argument applies to the final option only: `-abc=1` is `-a -b -c=1`.
    Bundling,
    /// `-abc` names the option `a` with the argument `bc`.
    SingleDash,
}

/// What to do with an option-looking token that matches no declared option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownMode {
    /// Fail the parse with [`ParseError::UnknownOption`](crate::ParseError::UnknownOption).
    #[default]
    Fail,
    /// Report a warning and forward the token into the remaining text.
    Warn,
    /// Silently forward the token into the remaining text.
    Pass,
}

/// The flavour of shell completion being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    /// Bash-style: candidates are printed as-is.
    Shell,
    /// Readline-style: a lone candidate gets a trailing space to mark it complete.
    Readline,
}

/// The type tag of an option.
/// Determines how many tokens an occurrence consumes and how each token is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A flag; takes no argument unless given inline (`--flag=false`).
    Bool,
    /// A single string argument.
    String,
    /// A single `i64` argument.
    Int,
    /// A single `f64` argument.
    Float,
    /// A list of strings.
    Strings,
    /// A list of `i64`; each argument may also be an ascending range `a..b`.
    Ints,
    /// A map of `key=value` arguments.
    StringMap,
}

impl ValueKind {
    /// Whether this kind accumulates over several tokens (and so accepts a custom arity).
    pub fn is_repeated(&self) -> bool {
        matches!(self, ValueKind::Strings | ValueKind::Ints | ValueKind::StringMap)
    }

    /// Whether this kind may be bound to an environment variable.
    pub fn is_scalar(&self) -> bool {
        !self.is_repeated()
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            ValueKind::Bool => "boolean",
            ValueKind::String | ValueKind::Strings => "string",
            ValueKind::Int | ValueKind::Ints => "integer",
            ValueKind::Float => "float",
            ValueKind::StringMap => "key=value",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The accumulated value of an option.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Value {
    Bool(bool),
    String(String),
    Int(i64),
    Float(f64),
    Strings(Vec<String>),
    Ints(Vec<i64>),
    StringMap(BTreeMap<String, String>),
}

impl Value {
    /// The type tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::String(_) => ValueKind::String,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Strings(_) => ValueKind::Strings,
            Value::Ints(_) => ValueKind::Ints,
            Value::StringMap(_) => ValueKind::StringMap,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Strings(values) => write!(f, "[{}]", values.join(", ")),
            Value::Ints(values) => write!(
                f,
                "[{}]",
                values
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            Value::StringMap(values) => write!(
                f,
                "{{{}}}",
                values
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}
