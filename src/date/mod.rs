//! Forgiving date entry.
//!
//! [`SmartDateParser`] turns the short forms people actually type into a date
//! field ("26", "26/4", "t", "2023-") into a concrete [`NaiveDate`], guessing
//! the missing month or year relative to today.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, Days, Local, NaiveDate};
use regex::Regex;

#[cfg(test)]
mod tests;

/// Source of "today" for date parsing and dynamic bounds.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Reads the local calendar date from the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one day. Useful in tests and for replaying input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Order of day and month in slash and compact digit input.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum DateOrder {
    #[default]
    DayFirst,
    MonthFirst,
}

impl DateOrder {
    /// `strftime` pattern used to serialise dates in this order.
    pub const fn display_pattern(self) -> &'static str {
        match self {
            DateOrder::DayFirst => "%d/%m/%Y",
            DateOrder::MonthFirst => "%m/%d/%Y",
        }
    }

    fn day_month(self, first: u32, second: u32) -> (u32, u32) {
        match self {
            DateOrder::DayFirst => (first, second),
            DateOrder::MonthFirst => (second, first),
        }
    }
}

/// Which end of a partial period ("2023-", "2023-02") to resolve to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PeriodBias {
    Start,
    End,
}

/// Whether an ambiguous day or day+month resolves into the past or the future.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum GuessDirection {
    Down,
    Up,
}

impl fmt::Display for GuessDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuessDirection::Down => f.write_str("down"),
            GuessDirection::Up => f.write_str("up"),
        }
    }
}

static SLASH_LONG_YEAR: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})$"));
static SLASH_SHORT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{2})$"));
static COMPACT_FULL: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^([0-9]{2})([0-9]{2})([0-9]{2})$"));
static ISO_LONG_YEAR: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})$"));
static ISO_SHORT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^([0-9]{2})-([0-9]{1,2})-([0-9]{1,2})$"));
static DAY_ONLY: LazyLock<Regex> = LazyLock::new(|| pattern(r"^([0-9]{1,2})$"));
static SLASH_DAY_MONTH: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^([0-9]{1,2})/([0-9]{1,2})$"));
static COMPACT_DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| pattern(r"^([0-9]{2})([0-9]{2})$"));
static PARTIAL_YEAR: LazyLock<Regex> = LazyLock::new(|| pattern(r"^([0-9]{4}|[0-9]{2})-$"));
static PARTIAL_YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^([0-9]{4}|[0-9]{2})-([0-9]{1,2})$"));

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("date input pattern is a valid regex")
}

/// Resolves typed date input against a reference day.
///
/// Recognised input, tried in order:
///
/// 1. full dates: `d/M/yyyy`, `d/M/yy`, `ddMMyy`, `yyyy-M-d`, `yy-M-d`;
/// 2. `t` for today and `y` for yesterday;
/// 3. a bare day, placed in this month or the adjacent one;
/// 4. day and month (`d/M` or `ddMM`), placed in this year or the adjacent one;
/// 5. with a [`PeriodBias`], partial ISO periods `yyyy-`, `yy-`, `yyyy-M`, `yy-M`.
///
/// A shape that matches but names a day that does not exist fails outright; the
/// parser never moves on to a different month to make it fit. The `min` hint
/// only steers the guess direction and never rejects a result.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SmartDateParser {
    today: NaiveDate,
    min: Option<NaiveDate>,
    bias: Option<PeriodBias>,
    order: DateOrder,
}

impl SmartDateParser {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            min: None,
            bias: None,
            order: DateOrder::default(),
        }
    }

    pub fn min(mut self, min: impl Into<Option<NaiveDate>>) -> Self {
        self.min = min.into();
        self
    }

    pub fn bias(mut self, bias: impl Into<Option<PeriodBias>>) -> Self {
        self.bias = bias.into();
        self
    }

    pub fn order(mut self, order: DateOrder) -> Self {
        self.order = order;
        self
    }

    /// Guessing goes up only when the lower bound is yesterday or later.
    pub fn direction(&self) -> GuessDirection {
        let yesterday = self.today.checked_sub_days(Days::new(1));
        match (self.min, yesterday) {
            (Some(min), Some(yesterday)) if min >= yesterday => GuessDirection::Up,
            _ => GuessDirection::Down,
        }
    }

    pub fn parse(&self, input: &str) -> Option<NaiveDate> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(date) = self.parse_full(text) {
            return Some(date);
        }

        match text {
            "t" | "T" => return Some(self.today),
            "y" | "Y" => return self.today.checked_sub_days(Days::new(1)),
            _ => {}
        }

        if let Some(caps) = DAY_ONLY.captures(text) {
            return self.guess_day(number(&caps, 1)?);
        }

        if let Some(caps) = SLASH_DAY_MONTH
            .captures(text)
            .or_else(|| COMPACT_DAY_MONTH.captures(text))
        {
            let (day, month) = self.order.day_month(number(&caps, 1)?, number(&caps, 2)?);
            return self.guess_day_month(day, month);
        }

        self.bias.and_then(|bias| parse_period(text, bias))
    }

    fn parse_full(&self, text: &str) -> Option<NaiveDate> {
        let slash = |re: &Regex| {
            let caps = re.captures(text)?;
            let (day, month) = self.order.day_month(number(&caps, 1)?, number(&caps, 2)?);
            NaiveDate::from_ymd_opt(expand_year(&caps[3])?, month, day)
        };
        let iso = |re: &Regex| {
            let caps = re.captures(text)?;
            NaiveDate::from_ymd_opt(expand_year(&caps[1])?, number(&caps, 2)?, number(&caps, 3)?)
        };

        slash(&SLASH_LONG_YEAR)
            .or_else(|| slash(&SLASH_SHORT_YEAR))
            .or_else(|| slash(&COMPACT_FULL))
            .or_else(|| iso(&ISO_LONG_YEAR))
            .or_else(|| iso(&ISO_SHORT_YEAR))
    }

    fn guess_day(&self, day: u32) -> Option<NaiveDate> {
        let today = self.today;
        let (year, month) = match self.direction() {
            GuessDirection::Down if day > today.day() => previous_month(today.year(), today.month()),
            GuessDirection::Up if day < today.day() => next_month(today.year(), today.month()),
            _ => (today.year(), today.month()),
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn guess_day_month(&self, day: u32, month: u32) -> Option<NaiveDate> {
        let today = self.today;
        let typed = (month, day);
        let current = (today.month(), today.day());
        let year = match self.direction() {
            GuessDirection::Down if typed > current => today.year() - 1,
            GuessDirection::Up if typed < current => today.year() + 1,
            _ => today.year(),
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Free-function form of [`SmartDateParser`] with the default day-first order.
pub fn smart_date_parse(
    input: &str,
    today: NaiveDate,
    min: Option<NaiveDate>,
    bias: Option<PeriodBias>,
) -> Option<NaiveDate> {
    SmartDateParser::new(today).min(min).bias(bias).parse(input)
}

fn parse_period(text: &str, bias: PeriodBias) -> Option<NaiveDate> {
    if let Some(caps) = PARTIAL_YEAR.captures(text) {
        let year = expand_year(&caps[1])?;
        return match bias {
            PeriodBias::Start => NaiveDate::from_ymd_opt(year, 1, 1),
            PeriodBias::End => NaiveDate::from_ymd_opt(year, 12, 31),
        };
    }

    let caps = PARTIAL_YEAR_MONTH.captures(text)?;
    let year = expand_year(&caps[1])?;
    let month = number(&caps, 2)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    match bias {
        PeriodBias::Start => Some(first),
        PeriodBias::End => {
            let (next_year, next) = next_month(year, month);
            NaiveDate::from_ymd_opt(next_year, next, 1)?.pred_opt()
        }
    }
}

fn number(caps: &regex::Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

// Two-digit years above 60 land in the 1900s.
fn expand_year(digits: &str) -> Option<i32> {
    let year: i32 = digits.parse().ok()?;
    Some(match digits.len() {
        2 if year > 60 => 1900 + year,
        2 => 2000 + year,
        _ => year,
    })
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
