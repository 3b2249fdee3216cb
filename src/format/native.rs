use super::{Format, FormatValue, Optional, Requirement, StepKind};

impl<V: FormatValue> Format<V, Option<V>, Optional> {
    /// Values picked rather than typed (selects, toggles, pickers). The raw
    /// form is the value itself and `None` is empty.
    pub fn native() -> Self {
        Format::custom(None, |value: &V| Some(value.clone())).then(StepKind::Transform, |s, _| {
            s.is_empty = s.raw.is_none();
            s.parsed = s.raw.clone();
        })
    }
}

impl<V: FormatValue + PartialEq, Q: Requirement> Format<V, Option<V>, Q> {
    pub fn one_of(&self, allowed: impl IntoIterator<Item = V>) -> Self {
        let allowed: Vec<V> = allowed.into_iter().collect();
        self.then(StepKind::Check, move |s, cx| {
            if s.valid_value().is_some_and(|v| !allowed.contains(v)) {
                s.fail(cx.message_or(|| "Select one of the allowed values.".to_string()));
            }
        })
    }
}
