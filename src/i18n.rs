use crate::date::DateOrder;

// Regions whose short numeric dates put the month first.
const MONTH_FIRST_REGIONS: &[&str] = &[
    "us", "ph", "fm", "mh", "pw", "as", "gu", "mp", "pr", "um", "vi",
];

#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub enum Locale {
    #[default]
    System,
    Tag(String),
}

impl From<String> for Locale {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("system") {
            return Self::System;
        }
        Self::Tag(value.trim().to_string())
    }
}

impl From<&str> for Locale {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl Locale {
    /// The BCP 47 tag this locale resolves to, if any.
    ///
    /// `System` only resolves when the `i18n` feature is enabled.
    pub fn resolved_tag(&self) -> Option<String> {
        match self {
            Locale::System => system_locale(),
            Locale::Tag(tag) => Some(tag.clone()),
        }
    }

    /// Day/month order used for numeric date entry in this locale.
    pub fn date_order(&self) -> DateOrder {
        self.resolved_tag()
            .map(|tag| date_order_for_tag(&tag))
            .unwrap_or_default()
    }
}

pub fn date_order_for_tag(tag: &str) -> DateOrder {
    let normalized = tag.trim().replace('_', "-").to_ascii_lowercase();
    // A bare "en" follows the US convention, as most platforms do.
    if normalized == "en" {
        return DateOrder::MonthFirst;
    }
    let month_first = normalized
        .split('-')
        .skip(1)
        .filter(|segment| segment.len() == 2)
        .any(|region| MONTH_FIRST_REGIONS.contains(&region));
    if month_first {
        DateOrder::MonthFirst
    } else {
        DateOrder::DayFirst
    }
}

#[cfg(feature = "i18n")]
fn system_locale() -> Option<String> {
    sys_locale::get_locale()
}

#[cfg(not(feature = "i18n"))]
fn system_locale() -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_first_regions_are_detected() {
        assert_eq!(date_order_for_tag("en-US"), DateOrder::MonthFirst);
        assert_eq!(date_order_for_tag("en_us"), DateOrder::MonthFirst);
        assert_eq!(date_order_for_tag("es-PR"), DateOrder::MonthFirst);
        assert_eq!(date_order_for_tag("en"), DateOrder::MonthFirst);
    }

    #[test]
    fn everything_else_is_day_first() {
        assert_eq!(date_order_for_tag("en-GB"), DateOrder::DayFirst);
        assert_eq!(date_order_for_tag("de-DE"), DateOrder::DayFirst);
        assert_eq!(date_order_for_tag("zh-Hans-CN"), DateOrder::DayFirst);
        assert_eq!(date_order_for_tag(""), DateOrder::DayFirst);
    }

    #[test]
    fn explicit_tags_win_over_system() {
        let locale = Locale::from("en-GB");
        assert_eq!(locale.resolved_tag().as_deref(), Some("en-GB"));
        assert_eq!(locale.date_order(), DateOrder::DayFirst);
        assert_eq!(Locale::from(" System "), Locale::System);
    }
}
