use crate::matcher::Bound;
use crate::model::{Value, ValueKind};
use crate::parser::ParseError;

/// A declared option, together with the value accumulated for it so far.
///
/// Exactly one descriptor exists per declaration.
/// Every command it propagates to refers to it by [`OptionId`](crate::tree::OptionId), so a value saved from any level is visible from every level.
#[derive(Debug, Clone)]
pub(crate) struct OptionDescriptor {
    name: String,
    // The name first, followed by each alias in declaration order.
    aliases: Vec<String>,
    bound: Bound,
    default: Value,
    value: Value,
    called: bool,
    used_alias: Option<String>,
    pub(crate) optional: bool,
    pub(crate) required: bool,
    pub(crate) env: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) arg_name: Option<String>,
    pub(crate) suggested: Vec<String>,
    pub(crate) valid: Vec<String>,
}

impl OptionDescriptor {
    pub(crate) fn new(name: impl Into<String>, default: Value, bound: Bound) -> Self {
        let name = name.into();
        Self {
            aliases: vec![name.clone()],
            name,
            bound,
            value: default.clone(),
            default,
            called: false,
            used_alias: None,
            optional: false,
            required: false,
            env: None,
            description: None,
            arg_name: None,
            suggested: Vec::default(),
            valid: Vec::default(),
        }
    }

    pub(crate) fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub(crate) fn kind(&self) -> ValueKind {
        self.default.kind()
    }

    pub(crate) fn bound(&self) -> Bound {
        self.bound
    }

    pub(crate) fn value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn is_called(&self) -> bool {
        self.called
    }

    pub(crate) fn used_alias(&self) -> Option<&str> {
        self.used_alias.as_deref()
    }

    /// Record an occurrence of the option under `alias`.
    /// A flag flips to the opposite of its default; any inline argument is saved afterwards.
    pub(crate) fn mark_called(&mut self, alias: impl Into<String>) {
        self.called = true;
        self.used_alias = Some(alias.into());

        if let Value::Bool(default) = self.default {
            self.value = Value::Bool(!default);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.value = self.default.clone();
        self.called = false;
        self.used_alias = None;
    }

    /// Reset a single-valued option back to its default (an optional argument that was left out).
    /// Accumulating options keep what they have collected.
    pub(crate) fn restore_default(&mut self) {
        if self.kind().is_scalar() {
            self.value = self.default.clone();
        }
    }

    /// Convert `argument` per the option type and store it.
    pub(crate) fn save(&mut self, argument: &str, lower_keys: bool) -> Result<(), ParseError> {
        if !self.valid.is_empty()
            && matches!(self.kind(), ValueKind::String | ValueKind::Strings)
            && !self.valid.iter().any(|v| v == argument)
        {
            return Err(ParseError::InvalidChoice {
                option: self.name.clone(),
                token: argument.to_string(),
                valid: self.valid.clone(),
            });
        }

        match &mut self.value {
            Value::Bool(value) => {
                *value = argument
                    .parse::<bool>()
                    .map_err(|_| conversion(&self.name, argument, ValueKind::Bool))?;
            }
            Value::String(value) => {
                *value = argument.to_string();
            }
            Value::Int(value) => {
                *value = argument
                    .parse::<i64>()
                    .map_err(|_| conversion(&self.name, argument, ValueKind::Int))?;
            }
            Value::Float(value) => {
                *value = argument
                    .parse::<f64>()
                    .map_err(|_| conversion(&self.name, argument, ValueKind::Float))?;
            }
            Value::Strings(values) => {
                values.push(argument.to_string());
            }
            Value::Ints(values) => match int_range(argument) {
                Some((start, end)) => values.extend(start..=end),
                None => {
                    return Err(ParseError::InvalidConversion {
                        option: self.name.clone(),
                        token: argument.to_string(),
                        expected: "an integer or ascending integer range (of at most 65536 values)",
                    })
                }
            },
            Value::StringMap(values) => match argument.split_once('=') {
                Some((key, value)) => {
                    let key = if lower_keys {
                        key.to_lowercase()
                    } else {
                        key.to_string()
                    };
                    values.insert(key, value.to_string());
                }
                None => {
                    return Err(ParseError::NotKeyValue {
                        option: self.name.clone(),
                        token: argument.to_string(),
                    })
                }
            },
        }

        Ok(())
    }

    /// Whether `token` is taken as a surplus argument (between the min and max arity).
    pub(crate) fn accepts(&self, token: &str) -> bool {
        match self.kind() {
            ValueKind::Ints => int_range(token).is_some(),
            ValueKind::StringMap => token.contains('='),
            _ => true,
        }
    }
}

fn conversion(option: &str, token: &str, kind: ValueKind) -> ParseError {
    ParseError::InvalidConversion {
        option: option.to_string(),
        token: token.to_string(),
        expected: kind.describe(),
    }
}

// The most values a single range token may expand to.
const MAXIMUM_RANGE_LENGTH: i128 = 1 << 16;

/// Parse `n` or the inclusive, ascending range `a..b` into its (inclusive) ends.
fn int_range(token: &str) -> Option<(i64, i64)> {
    match token.split_once("..") {
        Some((start, end)) => {
            let start = start.parse::<i64>().ok()?;
            let end = end.parse::<i64>().ok()?;
            let length = i128::from(end) - i128::from(start) + 1;

            if (1..=MAXIMUM_RANGE_LENGTH).contains(&length) {
                Some((start, end))
            } else {
                None
            }
        }
        None => token.parse::<i64>().ok().map(|value| (value, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn descriptor(default: Value) -> OptionDescriptor {
        let bound = if default.kind() == ValueKind::Bool {
            Bound::new(0, 0)
        } else {
            Bound::new(1, 1)
        };
        OptionDescriptor::new("opt", default, bound)
    }

    #[rstest]
    #[case("1", Some((1, 1)))]
    #[case("-4", Some((-4, -4)))]
    #[case("1..3", Some((1, 3)))]
    #[case("3..3", Some((3, 3)))]
    #[case("-1..1", Some((-1, 1)))]
    #[case("0..65535", Some((0, 65535)))]
    #[case("0..65536", None)]
    #[case("-9223372036854775808..9223372036854775807", None)]
    #[case("0..9223372036854775807", None)]
    #[case("3..1", None)]
    #[case("1..", None)]
    #[case("..1", None)]
    #[case("a..b", None)]
    #[case("x", None)]
    fn int_ranges(#[case] token: &str, #[case] expected: Option<(i64, i64)>) {
        assert_eq!(int_range(token), expected);
    }

    #[test]
    fn oversized_range() {
        // Setup
        let mut option = descriptor(Value::Ints(Vec::default()));
        let token = "-9223372036854775808..9223372036854775807";

        // Execute
        let result = option.save(token, false);

        // Verify
        assert_matches!(
            result,
            Err(ParseError::InvalidConversion { token: t, .. }) if t == token
        );
        assert_eq!(option.value(), &Value::Ints(Vec::default()));
        assert!(!option.accepts(token));
        assert!(option.accepts("-5..5"));
    }

    #[rstest]
    #[case(false, true)]
    #[case(true, false)]
    fn flag_negates_default(#[case] default: bool, #[case] expected: bool) {
        // Setup
        let mut option = descriptor(Value::Bool(default));

        // Execute
        option.mark_called("opt");

        // Verify
        assert!(option.is_called());
        assert_eq!(option.used_alias(), Some("opt"));
        assert_eq!(option.value(), &Value::Bool(expected));
    }

    #[test]
    fn flag_inline() {
        let mut option = descriptor(Value::Bool(false));
        option.mark_called("opt");
        option.save("false", false).unwrap();
        assert_eq!(option.value(), &Value::Bool(false));

        assert_matches!(
            option.save("maybe", false),
            Err(ParseError::InvalidConversion { expected: "boolean", .. })
        );
    }

    #[rstest]
    #[case(Value::Int(0), "12", Value::Int(12))]
    #[case(Value::Int(0), "-12", Value::Int(-12))]
    #[case(Value::Float(0.0), "1.5", Value::Float(1.5))]
    #[case(Value::String("x".to_string()), "abc", Value::String("abc".to_string()))]
    #[case(Value::String("x".to_string()), "", Value::String("".to_string()))]
    fn scalar(#[case] default: Value, #[case] argument: &str, #[case] expected: Value) {
        let mut option = descriptor(default);
        option.save(argument, false).unwrap();
        assert_eq!(option.value(), &expected);
    }

    #[rstest]
    #[case(Value::Int(0), "1.5", "integer")]
    #[case(Value::Int(0), "abc", "integer")]
    #[case(Value::Float(0.0), "abc", "float")]
    fn scalar_invalid(
        #[case] default: Value,
        #[case] argument: &str,
        #[case] expected: &'static str,
    ) {
        let mut option = descriptor(default.clone());

        let error = option.save(argument, false).unwrap_err();

        assert_eq!(
            error,
            ParseError::InvalidConversion {
                option: "opt".to_string(),
                token: argument.to_string(),
                expected,
            }
        );
        assert_eq!(option.value(), &default);
    }

    #[test]
    fn accumulate() {
        let mut strings = descriptor(Value::Strings(Vec::default()));
        strings.save("a", false).unwrap();
        strings.save("b", false).unwrap();
        assert_eq!(
            strings.value(),
            &Value::Strings(vec!["a".to_string(), "b".to_string()])
        );

        let mut ints = descriptor(Value::Ints(Vec::default()));
        ints.save("7", false).unwrap();
        ints.save("1..3", false).unwrap();
        assert_eq!(ints.value(), &Value::Ints(vec![7, 1, 2, 3]));
        assert_matches!(
            ints.save("3..1", false),
            Err(ParseError::InvalidConversion { .. })
        );
        assert_eq!(ints.value(), &Value::Ints(vec![7, 1, 2, 3]));
    }

    #[rstest]
    #[case(false, "Key")]
    #[case(true, "key")]
    fn map(#[case] lower: bool, #[case] expected_key: &str) {
        let mut option = descriptor(Value::StringMap(BTreeMap::default()));

        option.save("Key=a=b", lower).unwrap();

        assert_eq!(
            option.value(),
            &Value::StringMap(BTreeMap::from([(
                expected_key.to_string(),
                "a=b".to_string()
            )]))
        );
        assert_eq!(
            option.save("novalue", lower),
            Err(ParseError::NotKeyValue {
                option: "opt".to_string(),
                token: "novalue".to_string(),
            })
        );
    }

    #[test]
    fn valid_values() {
        let mut option = descriptor(Value::String("red".to_string()));
        option.valid = vec!["red".to_string(), "blue".to_string()];

        option.save("blue", false).unwrap();
        assert_matches!(
            option.save("pink", false),
            Err(ParseError::InvalidChoice { token, .. }) if token == "pink"
        );
        assert_eq!(option.value(), &Value::String("blue".to_string()));
    }

    #[test]
    fn restore_default() {
        let mut option = descriptor(Value::String("x".to_string()));
        option.save("y", false).unwrap();
        option.restore_default();
        assert_eq!(option.value(), &Value::String("x".to_string()));

        let mut strings = descriptor(Value::Strings(Vec::default()));
        strings.save("y", false).unwrap();
        strings.restore_default();
        assert_eq!(strings.value(), &Value::Strings(vec!["y".to_string()]));
    }

    #[rstest]
    #[case(Value::Ints(Vec::default()), "1..2", true)]
    #[case(Value::Ints(Vec::default()), "x", false)]
    #[case(Value::StringMap(BTreeMap::default()), "k=v", true)]
    #[case(Value::StringMap(BTreeMap::default()), "k", false)]
    #[case(Value::Strings(Vec::default()), "anything", true)]
    fn accepts(#[case] default: Value, #[case] token: &str, #[case] expected: bool) {
        assert_eq!(descriptor(default).accepts(token), expected);
    }
}
