use std::collections::BTreeMap;

use crate::matcher::Bound;
use crate::model::{Value, ValueKind};
use crate::parser::ConfigError;
use crate::tree::OptionDescriptor;

/// An option declaration.
///
/// Create with one of the typed constructors, then refine with the chained modifiers.
/// Names and aliases may be given with or without their leading dashes (`"verbose"`, `"--verbose"` and `"-v"` all work).
///
/// ### Example
/// ```
/// # use optree_builder as optree;
/// use optree::{CommandLineParser, Opt};
///
/// let mut program = CommandLineParser::new("program")
///     .add(Opt::string("profile", "default").alias("p").env("PROGRAM_PROFILE"))
///     .add(Opt::ints("ports").args(1, 3))
///     .build();
///
/// let parsed = program.parse_tokens(&["-p", "prod", "--ports", "80", "8000..8002"]).unwrap();
/// assert_eq!(parsed.string("profile"), Some("prod"));
/// assert_eq!(parsed.ints("ports"), Some(&[80, 8000, 8001, 8002][..]));
/// ```
#[derive(Debug, Clone)]
pub struct Opt {
    name: String,
    aliases: Vec<String>,
    default: Value,
    arity: Option<(usize, usize)>,
    optional: bool,
    required: bool,
    env: Option<String>,
    description: Option<String>,
    arg_name: Option<String>,
    suggested: Vec<String>,
    valid: Vec<String>,
}

impl Opt {
    fn new(name: impl Into<String>, default: Value) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::default(),
            default,
            arity: None,
            optional: false,
            required: false,
            env: None,
            description: None,
            arg_name: None,
            suggested: Vec::default(),
            valid: Vec::default(),
        }
    }

    /// A flag.
    /// Giving it sets the opposite of `default`, unless an inline argument says otherwise (`--flag=false`).
    pub fn bool(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, Value::Bool(default))
    }

    /// An option taking one string.
    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, Value::String(default.into()))
    }

    /// An option taking one integer.
    pub fn int(name: impl Into<String>, default: i64) -> Self {
        Self::new(name, Value::Int(default))
    }

    /// An option taking one float.
    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::new(name, Value::Float(default))
    }

    /// An option accumulating strings (one per argument, over every occurrence).
    pub fn strings(name: impl Into<String>) -> Self {
        Self::new(name, Value::Strings(Vec::default()))
    }

    /// An option accumulating integers.
    /// Each argument may also be an inclusive, ascending range: `1..3` gives `1, 2, 3`.
    pub fn ints(name: impl Into<String>) -> Self {
        Self::new(name, Value::Ints(Vec::default()))
    }

    /// An option accumulating `key=value` arguments (split at the first `=`).
    pub fn string_map(name: impl Into<String>) -> Self {
        Self::new(name, Value::StringMap(BTreeMap::default()))
    }

    /// Add an alternative name.
    /// Single character aliases are shown as `-x` in the help message.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Take between `min` and `max` arguments per occurrence (only for the accumulating types).
    ///
    /// The first `min` arguments are required.
    /// After that, arguments are taken while available (up to `max`).
    pub fn args(mut self, min: usize, max: usize) -> Self {
        self.arity.replace((min, max));
        self
    }

    /// Allow the option to be given without its argument, in which case it keeps its default.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Fail the parse when this option is given neither on the command line nor via its environment variable.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Read the value from the environment variable `variable` when the option isn't given on the command line (single-valued types only).
    pub fn env(mut self, variable: impl Into<String>) -> Self {
        self.env.replace(variable.into());
        self
    }

    /// Document the option in the help message.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// The argument placeholder shown in the help message (defaults to the upper-cased name).
    pub fn arg_name(mut self, arg_name: impl Into<String>) -> Self {
        self.arg_name.replace(arg_name.into());
        self
    }

    /// Values offered when completing this option's argument.
    pub fn suggested_values(mut self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggested = values.into_iter().map(Into::into).collect();
        self
    }

    /// The only values accepted (string types only); these are also offered when completing.
    pub fn valid_values(mut self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.valid = values.into_iter().map(Into::into).collect();
        self
    }
}

impl TryFrom<Opt> for OptionDescriptor {
    type Error = ConfigError;

    fn try_from(value: Opt) -> Result<Self, Self::Error> {
        let Opt {
            name,
            aliases,
            default,
            arity,
            optional,
            required,
            env,
            description,
            arg_name,
            suggested,
            valid,
        } = value;
        let name = undash(&name);

        if name.is_empty() {
            return Err(ConfigError::EmptyOptionName);
        }

        let kind = default.kind();
        let bound = match arity {
            None if kind == ValueKind::Bool => Bound::new(0, 0),
            None => Bound::new(1, 1),
            Some((min, max)) if kind.is_repeated() => {
                if min < 1 || max < min {
                    return Err(ConfigError::InvalidArity {
                        option: name,
                        min,
                        max,
                    });
                }

                Bound::new(min, max)
            }
            Some(_) => {
                return Err(ConfigError::ArityNotSupported { option: name, kind });
            }
        };

        if env.is_some() && !kind.is_scalar() {
            return Err(ConfigError::EnvNotSupported { option: name, kind });
        }

        let mut descriptor = OptionDescriptor::new(name, default, bound);

        for alias in aliases {
            let alias = undash(&alias);

            if alias.is_empty() {
                return Err(ConfigError::EmptyOptionName);
            }

            descriptor = descriptor.with_alias(alias);
        }

        descriptor.optional = optional && kind != ValueKind::Bool;
        descriptor.required = required;
        descriptor.env = env;
        descriptor.description = description;
        descriptor.arg_name = arg_name;
        descriptor.suggested = suggested;
        descriptor.valid = valid;
        Ok(descriptor)
    }
}

// `--name` and `-n` declare `name` and `n`; the lonesome dash `-` is kept as-is.
fn undash(name: &str) -> String {
    match name.trim_start_matches('-') {
        "" => name.to_string(),
        trimmed => trimmed.to_string(),
    }
}
