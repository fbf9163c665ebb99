//! Pure field validation: raw value + declared constraints in, verdict out
//!
//! Applying a verdict to the interface (error line, styling) is the
//! caller's job; nothing in here touches UI state.

use super::field::{FieldKind, FormField};

/// Outcome of validating a single field
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub ok: bool,
    pub message: Option<String>,
}

impl Verdict {
    fn pass() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

/// Validate a field. Rules run in order; the first failure wins:
/// required, then type/range, then per-field semantic rules.
pub fn validate(field: &FormField) -> Verdict {
    let trimmed = field.raw_value.trim();

    if field.required && trimmed.is_empty() {
        return Verdict::fail("This field is required.");
    }

    match field.kind {
        FieldKind::Text => {}
        FieldKind::Email => {
            if !is_conventional_email(trimmed) {
                return Verdict::fail("Please enter a valid email address.");
            }
        }
        FieldKind::Number { min, max, integer } => {
            let value = match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => return Verdict::fail("Please enter a valid number."),
            };
            if integer && value.fract() != 0.0 {
                return Verdict::fail("Please enter a whole number.");
            }
            let below = min.is_some_and(|m| value < m);
            let above = max.is_some_and(|m| value > m);
            if below || above {
                return Verdict::fail(range_message(min, max));
            }
        }
        FieldKind::Select { options } => {
            if !options.contains(&trimmed) {
                return Verdict::fail("Please select an option from the list.");
            }
        }
    }

    semantic_rule(field.name, trimmed)
}

// Hard-coded per-field rules, evaluated only after the declared
// constraints passed.
fn semantic_rule(name: &str, trimmed: &str) -> Verdict {
    match name {
        "annual_income" | "monthly_salary" => match trimmed.parse::<f64>() {
            Ok(v) if v < 0.0 => Verdict::fail("Income cannot be negative."),
            _ => Verdict::pass(),
        },
        "credit_utilization_ratio" => match trimmed.parse::<f64>() {
            Ok(v) if !(0.0..=100.0).contains(&v) => {
                Verdict::fail("Credit utilization must be between 0% and 100%.")
            }
            _ => Verdict::pass(),
        },
        "age" => match trimmed.parse::<f64>() {
            Ok(v) if v.fract() != 0.0 => Verdict::fail("Age must be a whole number."),
            Ok(v) if !(18.0..=100.0).contains(&v) => {
                Verdict::fail("Please enter a number between 18 and 100.")
            }
            _ => Verdict::pass(),
        },
        _ => Verdict::pass(),
    }
}

// The message names the violated bound(s).
fn range_message(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!(
            "Please enter a number between {} and {}.",
            fmt_bound(min),
            fmt_bound(max)
        ),
        (Some(min), None) => format!("Please enter a number of at least {}.", fmt_bound(min)),
        (None, Some(max)) => format!("Please enter a number of at most {}.", fmt_bound(max)),
        (None, None) => unreachable!("range failure without declared bounds"),
    }
}

// Conventional local@domain.tld shape, nothing RFC-grade.
fn is_conventional_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

// Bounds print as integers when they are whole ("between 18 and 100",
// not "between 18.0 and 100.0").
fn fmt_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
