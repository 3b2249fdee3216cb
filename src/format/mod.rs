//! Immutable parse/serialise pipelines.
//!
//! A [`Format`] turns the raw representation a user edits into a typed value
//! and back. It is an ordered chain of steps over a shared [`ParseResult`]
//! draft. Every modifier returns a new format whose chain is the old one plus
//! one more step, so a format can be shared between fields and used as the
//! base of several variants.
//!
//! Steps never panic. Failure is reported through [`ParseResult::error`] and
//! the first step to set it wins: later checks see the error and stand down,
//! while later fixups may still rewrite `raw`.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use im::Vector;

use crate::date::{Clock, SystemClock};

mod date;
mod native;
mod number;
mod string;


pub use date::DateOptions;

pub const DEFAULT_REQUIRED_MESSAGE: &str = "Required.";

/// Values and raw representations a format can carry.
pub trait FormatValue: Clone + Send + Sync + 'static {}

impl<T> FormatValue for T where T: Clone + Send + Sync + 'static {}

/// Outcome of one `parse` or `serialise` call.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseResult<V, R> {
    pub raw: R,
    pub parsed: Option<V>,
    pub error: Option<String>,
    pub is_empty: bool,
}

impl<V, R> ParseResult<V, R> {
    fn new(raw: R) -> Self {
        Self {
            raw,
            parsed: None,
            error: None,
            is_empty: true,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Records `message` unless an earlier step already failed.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(message.into());
        }
    }

    /// The value a check should look at: parsed, non-empty and not failed.
    pub fn valid_value(&self) -> Option<&V> {
        if self.error.is_some() || self.is_empty {
            return None;
        }
        self.parsed.as_ref()
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Required {}
    impl Sealed for super::Optional {}
}

/// Type-level marker for whether a format is required.
pub trait Requirement: sealed::Sealed + Copy + Send + Sync + 'static {
    const REQUIRED: bool;
}

/// The format always demands a value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Required;

/// The format may or may not demand a value; check [`Format::is_required`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Optional;

impl Requirement for Required {
    const REQUIRED: bool = true;
}

impl Requirement for Optional {
    const REQUIRED: bool = false;
}

type BoundFn<V> = Arc<dyn Fn(&dyn Clock) -> V + Send + Sync>;

/// A min/max bound, either fixed or evaluated afresh on every parse.
#[derive(Clone)]
pub enum Bound<V> {
    Fixed(V),
    Computed(BoundFn<V>),
}

impl<V: Clone> Bound<V> {
    pub fn computed(f: impl Fn(&dyn Clock) -> V + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(f))
    }

    pub fn resolve(&self, clock: &dyn Clock) -> V {
        match self {
            Bound::Fixed(value) => value.clone(),
            Bound::Computed(f) => f(clock),
        }
    }
}

impl<V> From<V> for Bound<V> {
    fn from(value: V) -> Self {
        Self::Fixed(value)
    }
}

impl<V: fmt::Debug> fmt::Debug for Bound<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Bound::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Bounds recorded next to the pipeline for UI hints such as input length.
///
/// The pipeline is opaque once composed, so these are kept as side metadata
/// rather than derived from it. The last modifier of each kind wins.
#[derive(Clone, Debug)]
pub struct Limits<V> {
    pub min: Option<Bound<V>>,
    pub max: Option<Bound<V>>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl<V> Default for Limits<V> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            min_length: None,
            max_length: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum StepKind {
    /// Converts or fixes up; always runs.
    Transform,
    /// Validates; skipped while rendering a bound for a message.
    Check,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
    Validate,
    Render,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum MessageTarget {
    LastStep,
    Required,
}

type StepFn<V, R> = Arc<dyn Fn(&mut ParseResult<V, R>, &StepContext<'_, V, R>) + Send + Sync>;

struct Step<V, R> {
    kind: StepKind,
    message: Option<Arc<str>>,
    run: StepFn<V, R>,
}

impl<V, R> Clone for Step<V, R> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            run: self.run.clone(),
        }
    }
}

/// What a step can see of the format it runs in.
pub(crate) struct StepContext<'a, V, R> {
    pipeline: &'a Pipeline<V, R>,
    message: Option<&'a str>,
}

impl<V: FormatValue, R: FormatValue> StepContext<'_, V, R> {
    /// The caller's override for this step's message, or the default.
    pub(crate) fn message_or(&self, default: impl FnOnce() -> String) -> String {
        self.message.map_or_else(default, str::to_string)
    }

    pub(crate) fn limits(&self) -> &Limits<V> {
        &self.pipeline.limits
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.pipeline.clock.as_ref()
    }

    pub(crate) fn resolve(&self, bound: &Bound<V>) -> V {
        bound.resolve(self.clock())
    }

    /// Serialises `value` through the whole format with checks skipped, so a
    /// bound quoted in a message reads the way the field would display it.
    pub(crate) fn render(&self, value: &V) -> R {
        let raw = (self.pipeline.to_raw)(value);
        self.pipeline.run(raw, Mode::Render).raw
    }
}

#[derive(Clone)]
struct Pipeline<V, R> {
    steps: Vector<Step<V, R>>,
    empty: R,
    to_raw: Arc<dyn Fn(&V) -> R + Send + Sync>,
    clock: Arc<dyn Clock>,
    required: bool,
    required_message: Option<Arc<str>>,
    limits: Limits<V>,
    message_target: MessageTarget,
}

impl<V: FormatValue, R: FormatValue> Pipeline<V, R> {
    fn run(&self, raw: R, mode: Mode) -> ParseResult<V, R> {
        let mut state = ParseResult::new(raw);
        for step in self.steps.iter() {
            if mode == Mode::Render && step.kind == StepKind::Check {
                continue;
            }
            let cx = StepContext {
                pipeline: self,
                message: step.message.as_deref(),
            };
            (step.run)(&mut state, &cx);
        }
        state
    }
}

/// An immutable parse/serialise pipeline from raw `R` to value `V`.
///
/// `Q` records at the type level whether the format is [`Required`]. A
/// required format converts into an [`Optional`] one (the runtime flag is
/// kept), which is what lets an optional field switch to a required format
/// later on.
pub struct Format<V, R, Q = Optional> {
    pipeline: Pipeline<V, R>,
    requirement: PhantomData<Q>,
}

impl<V: Clone, R: Clone, Q> Clone for Format<V, R, Q> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            requirement: PhantomData,
        }
    }
}

impl<V, R, Q> fmt::Debug for Format<V, R, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Format")
            .field("required", &self.pipeline.required)
            .field("steps", &self.pipeline.steps.len())
            .finish_non_exhaustive()
    }
}

impl<V: FormatValue, R: FormatValue> Format<V, R, Optional> {
    /// An empty pipeline: `empty` is the raw form of "nothing entered" and
    /// `to_raw` renders a value for `serialise`. The family constructors
    /// ([`Format::string`], [`Format::number`], ...) start from here.
    pub fn custom(empty: R, to_raw: impl Fn(&V) -> R + Send + Sync + 'static) -> Self {
        Self {
            pipeline: Pipeline {
                steps: Vector::new(),
                empty,
                to_raw: Arc::new(to_raw),
                clock: Arc::new(SystemClock),
                required: false,
                required_message: None,
                limits: Limits::default(),
                message_target: MessageTarget::LastStep,
            },
            requirement: PhantomData,
        }
    }
}

impl<V: FormatValue, R: FormatValue, Q: Requirement> Format<V, R, Q> {
    pub fn parse(&self, raw: R) -> ParseResult<V, R> {
        self.pipeline.run(raw, Mode::Validate)
    }

    /// Renders `value` to raw and parses that, so fixups and errors show up
    /// exactly as they would for typed input.
    pub fn serialise(&self, value: &V) -> ParseResult<V, R> {
        self.parse((self.pipeline.to_raw)(value))
    }

    pub fn parse_empty(&self) -> ParseResult<V, R> {
        self.parse(self.pipeline.empty.clone())
    }

    pub fn empty(&self) -> &R {
        &self.pipeline.empty
    }

    pub fn is_required(&self) -> bool {
        self.pipeline.required
    }

    pub fn required_message(&self) -> &str {
        self.pipeline
            .required_message
            .as_deref()
            .unwrap_or(DEFAULT_REQUIRED_MESSAGE)
    }

    pub fn limits(&self) -> &Limits<V> {
        &self.pipeline.limits
    }

    pub fn min_hint(&self) -> Option<V> {
        let bound = self.pipeline.limits.min.as_ref()?;
        Some(bound.resolve(self.pipeline.clock.as_ref()))
    }

    pub fn max_hint(&self) -> Option<V> {
        let bound = self.pipeline.limits.max.as_ref()?;
        Some(bound.resolve(self.pipeline.clock.as_ref()))
    }

    /// Flags the format as required. Parsing is unchanged: an empty required
    /// field only turns into an error when a controller displays it in
    /// submit mode.
    pub fn required(&self) -> Format<V, R, Required> {
        let mut pipeline = self.pipeline.clone();
        pipeline.required = true;
        pipeline.message_target = MessageTarget::Required;
        Format {
            pipeline,
            requirement: PhantomData,
        }
    }

    /// Replaces the message of the most recently added rule, or the required
    /// message when [`Format::required`] was the last modifier.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        let message: Arc<str> = Arc::from(message.into());
        let mut next = self.clone();
        match next.pipeline.message_target {
            MessageTarget::Required => next.pipeline.required_message = Some(message),
            MessageTarget::LastStep => {
                if let Some(mut last) = next.pipeline.steps.pop_back() {
                    last.message = Some(message);
                    next.pipeline.steps.push_back(last);
                }
            }
        }
        next
    }

    /// Appends a validation rule. It is skipped for empty input and once an
    /// earlier rule has failed.
    pub fn check(
        &self,
        predicate: impl Fn(&V) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        self.then(StepKind::Check, move |s, cx| {
            if s.valid_value().is_some_and(|value| !predicate(value)) {
                s.fail(cx.message_or(String::new));
            }
        })
        .with_message(message)
    }

    /// Appends a fixup step that may rewrite any part of the draft.
    pub fn transform(&self, f: impl Fn(&mut ParseResult<V, R>) + Send + Sync + 'static) -> Self {
        self.then(StepKind::Transform, move |s, _| f(s))
    }

    pub(crate) fn then(
        &self,
        kind: StepKind,
        run: impl Fn(&mut ParseResult<V, R>, &StepContext<'_, V, R>) + Send + Sync + 'static,
    ) -> Self {
        let mut next = self.clone();
        next.pipeline.steps.push_back(Step {
            kind,
            message: None,
            run: Arc::new(run),
        });
        next.pipeline.message_target = MessageTarget::LastStep;
        next
    }

    pub(crate) fn with_limits(mut self, f: impl FnOnce(&mut Limits<V>)) -> Self {
        f(&mut self.pipeline.limits);
        self
    }

    pub(crate) fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.pipeline.clock = clock;
        self
    }
}

impl<V, R> From<Format<V, R, Required>> for Format<V, R, Optional> {
    fn from(format: Format<V, R, Required>) -> Self {
        Self {
            pipeline: format.pipeline,
            requirement: PhantomData,
        }
    }
}
