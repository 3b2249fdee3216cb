use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use super::{Bound, Format, Optional, Requirement, StepKind};
use crate::date::{Clock, DateOrder, PeriodBias, SmartDateParser, SystemClock};
use crate::i18n::Locale;

/// How a date format reads and writes its text.
#[derive(Clone)]
pub struct DateOptions {
    pub clock: Arc<dyn Clock>,
    pub order: DateOrder,
    pub bias: Option<PeriodBias>,
}

impl Default for DateOptions {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            order: DateOrder::default(),
            bias: None,
        }
    }
}

impl fmt::Debug for DateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateOptions")
            .field("order", &self.order)
            .field("bias", &self.bias)
            .finish_non_exhaustive()
    }
}

impl DateOptions {
    pub fn for_locale(locale: &Locale) -> Self {
        Self {
            order: locale.date_order(),
            ..Self::default()
        }
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn order(mut self, order: DateOrder) -> Self {
        self.order = order;
        self
    }

    pub fn bias(mut self, bias: impl Into<Option<PeriodBias>>) -> Self {
        self.bias = bias.into();
        self
    }
}

impl Bound<NaiveDate> {
    /// The clock's current day, read each time the bound is checked.
    pub fn today() -> Self {
        Self::computed(|clock| clock.today())
    }
}

impl Format<NaiveDate, String, Optional> {
    /// Dates entered as text, day first, against the system clock.
    pub fn date() -> Self {
        Self::date_with(DateOptions::default())
    }

    pub fn date_with(options: DateOptions) -> Self {
        let DateOptions { clock, order, bias } = options;
        let pattern = order.display_pattern();
        Format::custom(String::new(), move |date: &NaiveDate| {
            date.format(pattern).to_string()
        })
        .with_clock(clock)
        .then(StepKind::Transform, move |s, cx| {
            s.raw = s.raw.trim().to_string();
            s.is_empty = s.raw.is_empty();
            if s.is_empty {
                s.parsed = None;
                return;
            }
            // The lower bound steers guessing of a bare day or day/month.
            let hint = cx.limits().min.as_ref().map(|bound| cx.resolve(bound));
            let parsed = SmartDateParser::new(cx.clock().today())
                .min(hint)
                .bias(bias)
                .order(order)
                .parse(&s.raw);
            match parsed {
                Some(date) => s.parsed = Some(date),
                None => s.fail(cx.message_or(|| "Enter a valid date.".to_string())),
            }
        })
    }
}

impl<Q: Requirement> Format<NaiveDate, String, Q> {
    pub fn min(&self, min: impl Into<Bound<NaiveDate>>) -> Self {
        let bound = min.into();
        let hint = bound.clone();
        self.then(StepKind::Check, move |s, cx| {
            let min = cx.resolve(&bound);
            if s.valid_value().is_some_and(|v| *v < min) {
                s.fail(cx.message_or(|| format!("Enter a date on or after {}.", cx.render(&min))));
            }
        })
        .with_limits(move |limits| limits.min = Some(hint))
    }

    pub fn max(&self, max: impl Into<Bound<NaiveDate>>) -> Self {
        let bound = max.into();
        let hint = bound.clone();
        self.then(StepKind::Check, move |s, cx| {
            let max = cx.resolve(&bound);
            if s.valid_value().is_some_and(|v| *v > max) {
                s.fail(cx.message_or(|| format!("Enter a date on or before {}.", cx.render(&max))));
            }
        })
        .with_limits(move |limits| limits.max = Some(hint))
    }

    pub fn min_today(&self) -> Self {
        self.min(Bound::today())
    }

    pub fn max_today(&self) -> Self {
        self.max(Bound::today())
    }
}
