use std::fmt;
use std::sync::{Arc, RwLock};

use strum::{Display, EnumString};
use tracing::{debug, trace};

use super::controller::{FormResult, read_lock, write_lock};
use crate::format::{Format, FormatValue, Optional, ParseResult, Requirement};

/// How much of a field's error state the UI may show.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorMode {
    /// Nothing is shown. Fields start here and return here on reset.
    #[default]
    Initial,
    /// Parse and rule errors are shown; emptiness of a required field is not.
    Dirty,
    /// Everything is shown, including the required message for empty fields.
    Submit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldOptions {
    /// Keep the last good value when a commit fails instead of dropping it.
    /// Clearing the field still drops it.
    pub preserve_value_on_error: bool,
    pub initial_error_mode: ErrorMode,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            preserve_value_on_error: false,
            initial_error_mode: ErrorMode::Initial,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSnapshot<V, R> {
    pub raw: R,
    pub value: Option<V>,
    /// The error the UI may display under the current mode.
    pub error: Option<String>,
    /// The error from the last parse, regardless of mode.
    pub parse_error: Option<String>,
    pub error_mode: ErrorMode,
    pub is_required: bool,
    pub is_empty: bool,
}

struct ValueState<V, R, Q> {
    result: ParseResult<V, R>,
    error_mode: ErrorMode,
    format: Format<V, R, Q>,
}

impl<V: FormatValue, R: FormatValue + PartialEq, Q: Requirement> ValueState<V, R, Q> {
    fn displayed_error(&self) -> Option<String> {
        match self.error_mode {
            ErrorMode::Initial => None,
            ErrorMode::Dirty => self.result.error.clone(),
            ErrorMode::Submit => self.result.error.clone().or_else(|| {
                (self.format.is_required() && self.result.is_empty)
                    .then(|| self.format.required_message().to_string())
            }),
        }
    }

    /// Installs `next`. An explicit mode wins; otherwise a change of raw
    /// promotes the field to `Dirty`, except that `Submit` is never relaxed.
    fn adopt(&mut self, next: ParseResult<V, R>, mode: Option<ErrorMode>) {
        let current = self.error_mode;
        let mode = mode.unwrap_or_else(|| {
            if next.raw != self.result.raw && current != ErrorMode::Submit {
                ErrorMode::Dirty
            } else {
                current
            }
        });
        if mode != current {
            trace!(from = %current, to = %mode, "error mode changed");
        }
        self.result = next;
        self.error_mode = mode;
    }
}

/// Live state of one bound field.
///
/// A cheap handle: clones share the same field. All mutation goes through the
/// operations below, each of which runs the current [`Format`].
pub struct ValueController<V, R, Q = Optional> {
    options: FieldOptions,
    state: Arc<RwLock<ValueState<V, R, Q>>>,
}

impl<V, R, Q> Clone for ValueController<V, R, Q> {
    fn clone(&self) -> Self {
        Self {
            options: self.options,
            state: Arc::clone(&self.state),
        }
    }
}

impl<V, R, Q> fmt::Debug for ValueController<V, R, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueController")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<V, R, Q> ValueController<V, R, Q>
where
    V: FormatValue,
    R: FormatValue + PartialEq,
    Q: Requirement,
{
    /// A field holding `initial` (serialised through `format`) or nothing.
    pub fn new(initial: Option<V>, format: Format<V, R, Q>) -> Self {
        Self::with_options(initial, format, FieldOptions::default())
    }

    pub fn with_options(initial: Option<V>, format: Format<V, R, Q>, options: FieldOptions) -> Self {
        let result = match &initial {
            Some(value) => format.serialise(value),
            None => format.parse_empty(),
        };
        Self {
            options,
            state: Arc::new(RwLock::new(ValueState {
                result,
                error_mode: options.initial_error_mode,
                format,
            })),
        }
    }

    pub fn options(&self) -> FieldOptions {
        self.options
    }

    pub fn raw(&self) -> FormResult<R> {
        Ok(read_lock(&self.state, "reading raw value")?.result.raw.clone())
    }

    pub fn value(&self) -> FormResult<Option<V>> {
        Ok(read_lock(&self.state, "reading parsed value")?.result.parsed.clone())
    }

    /// The error to display, after the error-mode gate.
    pub fn error(&self) -> FormResult<Option<String>> {
        Ok(read_lock(&self.state, "reading display error")?.displayed_error())
    }

    pub fn error_mode(&self) -> FormResult<ErrorMode> {
        Ok(read_lock(&self.state, "reading error mode")?.error_mode)
    }

    pub fn is_required(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading required flag")?.format.is_required())
    }

    pub fn format(&self) -> FormResult<Format<V, R, Q>> {
        Ok(read_lock(&self.state, "reading format")?.format.clone())
    }

    pub fn snapshot(&self) -> FormResult<FieldSnapshot<V, R>> {
        let state = read_lock(&self.state, "creating field snapshot")?;
        Ok(FieldSnapshot {
            raw: state.result.raw.clone(),
            value: state.result.parsed.clone(),
            error: state.displayed_error(),
            parse_error: state.result.error.clone(),
            error_mode: state.error_mode,
            is_required: state.format.is_required(),
            is_empty: state.result.is_empty,
        })
    }

    /// Sets the field from a typed value and shows its errors. `None` empties
    /// the field like [`ValueController::clear`] but leaves it `Dirty`.
    pub fn set_value(&self, value: Option<V>) -> FormResult<()> {
        self.set_value_with_mode(value, ErrorMode::Dirty)
    }

    pub fn set_value_with_mode(&self, value: Option<V>, mode: ErrorMode) -> FormResult<()> {
        let mut state = write_lock(&self.state, "setting value")?;
        let next = match &value {
            Some(value) => state.format.serialise(value),
            None => state.format.parse_empty(),
        };
        state.adopt(next, Some(mode));
        Ok(())
    }

    /// Runs edited text through the format and adopts the outcome.
    ///
    /// Returns the canonical raw when it differs from `raw` (for example
    /// "25.5" committed as "25.50"), so the widget can replace its text.
    /// Failed and empty commits return `None` and leave the user's text alone.
    pub fn commit_raw(&self, raw: R) -> FormResult<Option<R>> {
        let mut state = write_lock(&self.state, "committing raw value")?;
        let mut parsed = state.format.parse(raw.clone());

        if parsed.has_error() {
            if self.options.preserve_value_on_error {
                parsed.parsed = state.result.parsed.clone();
            }
            state.adopt(parsed, None);
            debug!(outcome = "error", error_mode = %state.error_mode, "field committed");
            return Ok(None);
        }

        let Some(value) = parsed.parsed else {
            let empty = state.format.parse_empty();
            state.adopt(empty, None);
            debug!(outcome = "empty", error_mode = %state.error_mode, "field committed");
            return Ok(None);
        };

        let fixed = state.format.serialise(&value);
        let canonical = fixed.raw.clone();
        state.adopt(fixed, None);
        let rewritten = canonical != raw;
        debug!(outcome = "value", rewritten, error_mode = %state.error_mode, "field committed");
        Ok(rewritten.then_some(canonical))
    }

    /// Empties the field and hides its errors.
    pub fn clear(&self) -> FormResult<()> {
        self.clear_with_mode(ErrorMode::Initial)
    }

    pub fn clear_with_mode(&self, mode: ErrorMode) -> FormResult<()> {
        let mut state = write_lock(&self.state, "clearing value")?;
        let empty = state.format.parse_empty();
        state.adopt(empty, Some(mode));
        Ok(())
    }

    /// Swaps the format and re-parses the current raw under it. The error
    /// mode is kept, so text the user is working on is judged by the new
    /// rules without changing what may be shown.
    pub fn set_format(&self, format: impl Into<Format<V, R, Q>>) -> FormResult<()> {
        let format = format.into();
        let mut state = write_lock(&self.state, "replacing format")?;
        let next = format.parse(state.result.raw.clone());
        let mode = state.error_mode;
        state.format = format;
        state.adopt(next, Some(mode));
        debug!(required = state.format.is_required(), "field format replaced");
        Ok(())
    }

    pub fn set_error_mode(&self, mode: ErrorMode) -> FormResult<()> {
        let mut state = write_lock(&self.state, "setting error mode")?;
        if state.error_mode != mode {
            trace!(from = %state.error_mode, to = %mode, "error mode changed");
            state.error_mode = mode;
        }
        Ok(())
    }

    /// Attaches an outside error (a server rejection, say) without touching
    /// raw or value. The next value change replaces it.
    pub fn set_error(&self, message: impl Into<String>) -> FormResult<()> {
        let mut state = write_lock(&self.state, "setting external error")?;
        state.result.error = Some(message.into());
        Ok(())
    }
}
