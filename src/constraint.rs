//! Reusable per-field constraints.
//!
//! Constraints run after coercion, in declaration order. The validator stops
//! at the first one a field violates and moves on to the next field.
//!
//! # Examples
//!
//! ```
//! use binding_core::constraint::Constraint;
//! use binding_core::Value;
//!
//! let name = Constraint::MaxLength(5);
//! assert!(name.check(&Value::String("Bruce".into())).is_ok());
//!
//! let err = name.check(&Value::String("Barbara".into())).unwrap_err();
//! assert_eq!(err.constraint(), "max_length");
//! ```

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::schema::FieldType;
use crate::value::Value;

/// Email shape: local part, `@`, domain with at least one dot.
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// A predicate over one field's coerced value.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// At least this many characters
    MinLength(usize),
    /// At most this many characters
    MaxLength(usize),
    /// Strictly greater than
    Gt(i64),
    /// Greater than or equal to
    Ge(i64),
    /// Strictly less than
    Lt(i64),
    /// Less than or equal to
    Le(i64),
    /// Exact membership in a fixed set
    OneOf(Vec<String>),
    /// Shaped like an email address
    Email,
    /// Matches a regular expression
    Pattern(Regex),
}

impl Constraint {
    /// Builds a [`Constraint::OneOf`] from string slices.
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Builds a [`Constraint::Pattern`].
    ///
    /// # Errors
    ///
    /// Returns the regex compile error for an invalid pattern.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Constraint::Pattern)
    }

    /// Short machine-readable name, used in error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::MinLength(_) => "min_length",
            Constraint::MaxLength(_) => "max_length",
            Constraint::Gt(_) => "gt",
            Constraint::Ge(_) => "ge",
            Constraint::Lt(_) => "lt",
            Constraint::Le(_) => "le",
            Constraint::OneOf(_) => "one_of",
            Constraint::Email => "email",
            Constraint::Pattern(_) => "pattern",
        }
    }

    /// Whether this constraint can be declared on a field of type `ty`.
    pub fn applies_to(&self, ty: &FieldType) -> bool {
        match self {
            Constraint::MinLength(_) | Constraint::MaxLength(_) => matches!(
                ty,
                FieldType::String | FieldType::Secret | FieldType::Enum(_)
            ),
            Constraint::Gt(_) | Constraint::Ge(_) | Constraint::Lt(_) | Constraint::Le(_) => {
                matches!(ty, FieldType::Integer)
            }
            Constraint::OneOf(_) => matches!(ty, FieldType::String | FieldType::Enum(_)),
            Constraint::Email | Constraint::Pattern(_) => matches!(ty, FieldType::String),
        }
    }

    /// Checks `value` against this constraint.
    ///
    /// Values of a type the constraint does not apply to pass unchanged;
    /// the registry rejects such declarations up front.
    ///
    /// # Errors
    ///
    /// Returns a `ConstraintViolation` naming the constraint and the bound.
    /// The message never includes the offending value.
    pub fn check(&self, value: &Value) -> Result<(), ConstraintViolation> {
        match self {
            Constraint::MinLength(min) => match char_len(value) {
                Some(len) if len < *min => Err(self.violation(format!(
                    "ensure this value has at least {} characters",
                    min
                ))),
                _ => Ok(()),
            },
            Constraint::MaxLength(max) => match char_len(value) {
                Some(len) if len > *max => Err(self.violation(format!(
                    "ensure this value has at most {} characters",
                    max
                ))),
                _ => Ok(()),
            },
            Constraint::Gt(bound) => self.numeric(value, |n| n > *bound, "greater than", *bound),
            Constraint::Ge(bound) => {
                self.numeric(value, |n| n >= *bound, "greater than or equal to", *bound)
            }
            Constraint::Lt(bound) => self.numeric(value, |n| n < *bound, "less than", *bound),
            Constraint::Le(bound) => {
                self.numeric(value, |n| n <= *bound, "less than or equal to", *bound)
            }
            Constraint::OneOf(allowed) => membership(self.name(), allowed, value),
            Constraint::Email => match value {
                Value::String(s) if !email_regex().is_match(s) => {
                    Err(self.violation("value is not a valid email address"))
                }
                _ => Ok(()),
            },
            Constraint::Pattern(re) => match value {
                Value::String(s) if !re.is_match(s) => Err(self.violation(format!(
                    "string does not match pattern '{}'",
                    re.as_str()
                ))),
                _ => Ok(()),
            },
        }
    }

    fn numeric(
        &self,
        value: &Value,
        holds: impl Fn(i64) -> bool,
        relation: &str,
        bound: i64,
    ) -> Result<(), ConstraintViolation> {
        match value.as_i64() {
            Some(n) if !holds(n) => Err(self.violation(format!(
                "ensure this value is {} {}",
                relation, bound
            ))),
            _ => Ok(()),
        }
    }

    fn violation(&self, message: impl Into<String>) -> ConstraintViolation {
        ConstraintViolation::new(self.name(), message)
    }
}

fn char_len(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) | Value::Enum(s) => Some(s.chars().count()),
        Value::Secret(s) => Some(s.char_len()),
        _ => None,
    }
}

/// Checks an enum field's value against its declared members.
pub(crate) fn check_enum(members: &[String], value: &Value) -> Result<(), ConstraintViolation> {
    membership("enum", members, value)
}

fn membership(
    name: &'static str,
    allowed: &[String],
    value: &Value,
) -> Result<(), ConstraintViolation> {
    match value.as_str() {
        Some(s) if !allowed.iter().any(|a| a == s) => Err(ConstraintViolation::new(
            name,
            format!(
                "value is not a valid enumeration member; permitted: {}",
                quoted_list(allowed)
            ),
        )),
        _ => Ok(()),
    }
}

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A constraint that did not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    constraint: &'static str,
    message: String,
}

impl ConstraintViolation {
    /// Creates a violation for the named constraint.
    pub fn new(constraint: &'static str, message: impl Into<String>) -> Self {
        Self {
            constraint,
            message: message.into(),
        }
    }

    /// Name of the violated constraint (`max_length`, `gt`, ...).
    pub fn constraint(&self) -> &'static str {
        self.constraint
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn into_message(self) -> String {
        self.message
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.constraint, self.message)
    }
}

impl std::error::Error for ConstraintViolation {}
