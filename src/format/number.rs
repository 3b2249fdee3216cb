use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

use super::{Bound, Format, Optional, Requirement, StepKind};

static NUMBER_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]*\.?[0-9]*$").expect("number pattern is a valid regex"));

// Float noise allowed when checking for whole pence.
const PENCE_TOLERANCE: f64 = 1e-6;

impl Format<f64, String, Optional> {
    /// Decimal numbers in plain notation: an optional leading minus, digits and
    /// at most one point. Surrounding whitespace is dropped from the raw text.
    pub fn number() -> Self {
        Format::custom(String::new(), |value: &f64| value.to_string()).then(
            StepKind::Transform,
            |s, cx| {
                s.raw = s.raw.trim().to_string();
                s.is_empty = s.raw.is_empty();
                if s.is_empty {
                    s.parsed = None;
                    return;
                }
                let parsed = NUMBER_SYNTAX
                    .is_match(&s.raw)
                    .then(|| s.raw.parse::<f64>().ok())
                    .flatten()
                    .filter(|n| n.is_finite());
                match parsed {
                    Some(n) => s.parsed = Some(n),
                    None => s.fail(cx.message_or(|| "Enter a valid number.".to_string())),
                }
            },
        )
    }
}

impl<Q: Requirement> Format<f64, String, Q> {
    pub fn positive(&self) -> Self {
        self.then(StepKind::Check, |s, cx| {
            if s.valid_value().is_some_and(|v| *v <= 0.0) {
                s.fail(cx.message_or(|| "Enter a positive value.".to_string()));
            }
        })
    }

    /// Inclusive lower bound. The message quotes the bound the way this
    /// format displays values.
    pub fn min(&self, min: impl Into<Bound<f64>>) -> Self {
        let bound = min.into();
        let hint = bound.clone();
        self.then(StepKind::Check, move |s, cx| {
            let min = cx.resolve(&bound);
            if s.valid_value().is_some_and(|v| *v < min) {
                s.fail(cx.message_or(|| {
                    format!("Enter a value greater than or equal to {}.", cx.render(&min))
                }));
            }
        })
        .with_limits(move |limits| limits.min = Some(hint))
    }

    /// Inclusive upper bound.
    pub fn max(&self, max: impl Into<Bound<f64>>) -> Self {
        let bound = max.into();
        let hint = bound.clone();
        self.then(StepKind::Check, move |s, cx| {
            let max = cx.resolve(&bound);
            if s.valid_value().is_some_and(|v| *v > max) {
                s.fail(cx.message_or(|| {
                    format!("Enter a value less than or equal to {}.", cx.render(&max))
                }));
            }
        })
        .with_limits(move |limits| limits.max = Some(hint))
    }

    /// Money with whole pence. Values that are exact to two places get their
    /// raw text padded to exactly two decimals ("25.5" becomes "25.50"), even
    /// when an earlier rule has failed; anything finer is rejected.
    pub fn decimals2(&self) -> Self {
        self.then(StepKind::Transform, |s, _| {
            if let Some(value) = s.parsed {
                s.raw = two_decimal_raw(value);
            }
        })
        .then(StepKind::Check, |s, cx| {
            let fractional = s.valid_value().is_some_and(|v| {
                let pence = v * 100.0;
                (pence - pence.round()).abs() > PENCE_TOLERANCE
            });
            if fractional {
                s.fail(cx.message_or(|| "No more than 2 digits for pence.".to_string()));
            }
        })
    }
}

/// `value` with exactly two decimals, when that is still the same number.
/// Otherwise the plain rendering, which the pence check then rejects.
fn two_decimal_raw(value: f64) -> String {
    let plain = value.to_string();
    let Ok(decimal) = Decimal::from_str(&plain) else {
        return plain;
    };
    let mut fixed = decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    fixed.rescale(2);
    let text = fixed.to_string();
    if text.parse::<f64>().is_ok_and(|n| n == value) {
        text
    } else {
        plain
    }
}
