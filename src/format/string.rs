use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{Format, Optional, Requirement, StepKind};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@]+@[^@]+\.[^@]+$").expect("email pattern is a valid regex")
});

impl Format<String, String, Optional> {
    /// Free text. The empty string is the empty value.
    pub fn string() -> Self {
        Format::custom(String::new(), String::clone).then(StepKind::Transform, |s, _| {
            s.is_empty = s.raw.is_empty();
            s.parsed = Some(s.raw.clone());
        })
    }
}

impl<Q: Requirement> Format<String, String, Q> {
    /// Strips surrounding whitespace from both the value and the raw text.
    pub fn trim(&self) -> Self {
        self.then(StepKind::Transform, |s, _| {
            if s.has_error() {
                return;
            }
            let Some(value) = s.parsed.as_deref() else {
                return;
            };
            let trimmed = value.trim().to_string();
            s.is_empty = trimmed.is_empty();
            s.raw.clone_from(&trimmed);
            s.parsed = Some(trimmed);
        })
    }

    /// Maps empty text to no value at all. Add it after [`Format::trim`].
    pub fn absent_when_empty(&self) -> Self {
        self.then(StepKind::Transform, |s, _| {
            if s.is_empty {
                s.parsed = None;
            }
        })
    }

    pub fn min_len(&self, min: usize) -> Self {
        self.then(StepKind::Check, move |s, cx| {
            if s.valid_value().is_some_and(|v| v.chars().count() < min) {
                s.fail(cx.message_or(|| format!("Enter at least {min} characters.")));
            }
        })
        .with_limits(|limits| limits.min_length = Some(min))
    }

    pub fn max_len(&self, max: usize) -> Self {
        self.then(StepKind::Check, move |s, cx| {
            if s.valid_value().is_some_and(|v| v.chars().count() > max) {
                s.fail(cx.message_or(|| format!("Enter no more than {max} characters.")));
            }
        })
        .with_limits(|limits| limits.max_length = Some(max))
    }

    pub fn email(&self) -> Self {
        self.then(StepKind::Check, |s, cx| {
            if s.valid_value().is_some_and(|v| !EMAIL.is_match(v)) {
                s.fail(cx.message_or(|| "Enter a valid email address.".to_string()));
            }
        })
    }

    pub fn one_of<I, S>(&self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: HashSet<String> = allowed.into_iter().map(Into::into).collect();
        self.then(StepKind::Check, move |s, cx| {
            if s.valid_value().is_some_and(|v| !allowed.contains(v)) {
                s.fail(cx.message_or(|| "Select one of the allowed values.".to_string()));
            }
        })
    }
}
