use std::any::{Any, type_name};
use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::dispatch::ReactionQueue;
use super::record::{FormField, FormModel, FormPatch};
use super::value::ErrorMode;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl From<&'static str> for FieldKey {
    fn from(value: &'static str) -> Self {
        Self(value)
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SubmitState {
    #[default]
    Idle,
    /// A submit is waiting for the reaction queue to settle.
    Validating,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    InvalidStateTransition {
        from: SubmitState,
        to: SubmitState,
    },
    AlreadySubmitting,
    UnknownField(FieldKey),
    DuplicateField(FieldKey),
    TypeMismatch {
        key: FieldKey,
        field_type: &'static str,
        requested: &'static str,
    },
    MissingValue(FieldKey),
    NotRequired(FieldKey),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::InvalidStateTransition { from, to } => {
                write!(f, "invalid submit state transition: {from:?} -> {to:?}")
            }
            FormError::AlreadySubmitting => f.write_str("form submit is already in progress"),
            FormError::UnknownField(key) => write!(f, "form has no field `{key}`"),
            FormError::DuplicateField(key) => write!(f, "field `{key}` is registered twice"),
            FormError::TypeMismatch {
                key,
                field_type,
                requested,
            } => write!(
                f,
                "field `{key}` holds {field_type} but {requested} was requested"
            ),
            FormError::MissingValue(key) => write!(f, "required field `{key}` has no value"),
            FormError::NotRequired(key) => {
                write!(f, "field `{key}` is optional and cannot be read as required")
            }
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

type FieldMap = IndexMap<FieldKey, Arc<dyn FormField>>;

struct FormState {
    submit_state: SubmitState,
    submit_count: u32,
}

/// Collects fields for a [`Form`] in declaration order.
#[derive(Default)]
pub struct FormBuilder {
    fields: FieldMap,
    duplicate: Option<FieldKey>,
    reactions: Option<ReactionQueue>,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<FieldKey>, field: impl FormField + 'static) -> Self {
        let key = key.into();
        if self.fields.insert(key, Arc::new(field)).is_some() && self.duplicate.is_none() {
            self.duplicate = Some(key);
        }
        self
    }

    /// Shares the host's queue instead of giving the form its own.
    pub fn reactions(mut self, reactions: ReactionQueue) -> Self {
        self.reactions = Some(reactions);
        self
    }

    pub fn build(self) -> FormResult<Form> {
        if let Some(key) = self.duplicate {
            return Err(FormError::DuplicateField(key));
        }
        Ok(Form {
            fields: Arc::new(self.fields),
            state: Arc::new(RwLock::new(FormState {
                submit_state: SubmitState::Idle,
                submit_count: 0,
            })),
            reactions: self.reactions.unwrap_or_default(),
        })
    }
}

/// A fixed set of named fields submitted together.
///
/// The form owns no field state; it drives the controllers through their own
/// operations. Clones share the same fields and submit state.
#[derive(Clone)]
pub struct Form {
    fields: Arc<FieldMap>,
    state: Arc<RwLock<FormState>>,
    reactions: ReactionQueue,
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("reactions", &self.reactions)
            .finish_non_exhaustive()
    }
}

impl Form {
    pub fn builder() -> FormBuilder {
        FormBuilder::new()
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.fields.keys().copied()
    }

    pub fn contains(&self, key: impl Into<FieldKey>) -> bool {
        self.fields.contains_key(&key.into())
    }

    pub fn field(&self, key: impl Into<FieldKey>) -> FormResult<&dyn FormField> {
        let key = key.into();
        self.fields
            .get(&key)
            .map(|field| field.as_ref())
            .ok_or(FormError::UnknownField(key))
    }

    pub fn reactions(&self) -> &ReactionQueue {
        &self.reactions
    }

    /// Drains the reaction queue. Hosts call this after each dispatched event.
    pub fn settle(&self) -> usize {
        self.reactions.run_until_idle()
    }

    /// Puts every field in submit mode and queues the evaluation behind
    /// whatever reactions are already pending.
    ///
    /// When the queue is drained, the form fails on the first field that
    /// displays an error and calls `on_error`. Otherwise it extracts `M` and
    /// calls `on_submit`. Callbacks run with no form or field lock held.
    pub fn submit<M, S, E>(&self, on_submit: S, on_error: E) -> FormResult<()>
    where
        M: FormModel + 'static,
        S: FnOnce(M, &Form) + Send + 'static,
        E: FnOnce(&Form) + Send + 'static,
    {
        {
            let mut state = write_lock(&self.state, "preparing submit")?;
            if state.submit_state == SubmitState::Validating {
                return Err(FormError::AlreadySubmitting);
            }
            transition_submit_state(&mut state, SubmitState::Validating)?;
            state.submit_count = state.submit_count.saturating_add(1);
        }

        for field in self.fields.values() {
            field.set_error_mode(ErrorMode::Submit)?;
        }
        debug!(fields = self.fields.len(), "submit queued");

        let form = self.clone();
        self.reactions
            .post(move || form.finish_submit(on_submit, on_error));
        Ok(())
    }

    fn finish_submit<M, S, E>(&self, on_submit: S, on_error: E)
    where
        M: FormModel,
        S: FnOnce(M, &Form),
        E: FnOnce(&Form),
    {
        match self.evaluate::<M>() {
            Ok(Some(model)) => {
                self.complete_submit(SubmitState::Succeeded);
                debug!(outcome = "succeeded", "submit evaluated");
                on_submit(model, self);
            }
            Ok(None) => {
                self.complete_submit(SubmitState::Failed);
                debug!(outcome = "failed", "submit evaluated");
                on_error(self);
            }
            Err(error) => {
                warn!(%error, "submit passed validation but the record could not be built");
                self.complete_submit(SubmitState::Failed);
                on_error(self);
            }
        }
    }

    fn evaluate<M: FormModel>(&self) -> FormResult<Option<M>> {
        for (key, field) in self.fields.iter() {
            if field.error()?.is_some() {
                debug!(field = %key, "submit blocked by field error");
                return Ok(None);
            }
        }
        M::from_form(self).map(Some)
    }

    // A reset while the submit was queued has already moved the form to Idle;
    // that state stands.
    fn complete_submit(&self, next: SubmitState) {
        match write_lock(&self.state, "completing submit") {
            Ok(mut state) if state.submit_state == SubmitState::Validating => {
                if let Err(error) = transition_submit_state(&mut state, next) {
                    warn!(%error, "submit state not updated");
                }
            }
            Ok(_) => {}
            Err(error) => warn!(%error, "submit state not updated"),
        }
    }

    /// Reads every field into `M` without validating or changing modes.
    pub fn values<M: FormModel>(&self) -> FormResult<M> {
        M::from_form(self)
    }

    /// Whether no field currently displays an error.
    pub fn is_valid(&self) -> FormResult<bool> {
        for field in self.fields.values() {
            if field.error()?.is_some() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The value of a field bound to a required format.
    ///
    /// Optional fields are rejected even when they hold a value, so a record
    /// field that is not an `Option` is always backed by a required field.
    pub fn required_value<V: Any>(&self, key: impl Into<FieldKey>) -> FormResult<V> {
        let key = key.into();
        let field = self.field(key)?;
        if !field.requires_value() {
            return Err(FormError::NotRequired(key));
        }
        let value = field.value_any()?.ok_or(FormError::MissingValue(key))?;
        downcast_value(key, field, value)
    }

    pub fn optional_value<V: Any>(&self, key: impl Into<FieldKey>) -> FormResult<Option<V>> {
        let key = key.into();
        let field = self.field(key)?;
        field
            .value_any()?
            .map(|value| downcast_value(key, field, value))
            .transpose()
    }

    pub fn submit_state(&self) -> FormResult<SubmitState> {
        Ok(read_lock(&self.state, "reading submit state")?.submit_state)
    }

    pub fn submit_count(&self) -> FormResult<u32> {
        Ok(read_lock(&self.state, "reading submit count")?.submit_count)
    }

    /// Clears every field and hides their errors.
    pub fn clear(&self) -> FormResult<()> {
        for field in self.fields.values() {
            field.clear()?;
        }
        self.return_to_idle("clearing form")?;
        debug!(fields = self.fields.len(), "form cleared");
        Ok(())
    }

    /// Sets each field from `patch`, clears the fields it leaves out, and hides
    /// all errors. Unknown keys and mistyped values are rejected before any
    /// field changes.
    pub fn reset(&self, mut patch: FormPatch) -> FormResult<()> {
        for key in patch.keys() {
            let field = self.field(key)?;
            let Some((value, requested)) = patch.get(key) else {
                continue;
            };
            if !field.accepts(value) {
                return Err(FormError::TypeMismatch {
                    key,
                    field_type: field.value_type(),
                    requested,
                });
            }
        }

        for (key, field) in self.fields.iter() {
            match patch.take(*key) {
                Some((value, requested)) => {
                    if !field.set_value_any(value, ErrorMode::Initial)? {
                        return Err(FormError::TypeMismatch {
                            key: *key,
                            field_type: field.value_type(),
                            requested,
                        });
                    }
                }
                None => field.clear()?,
            }
            field.set_error_mode(ErrorMode::Initial)?;
        }
        self.return_to_idle("resetting form")?;
        debug!(fields = self.fields.len(), "form reset");
        Ok(())
    }

    pub fn reset_to<M: FormModel>(&self, model: M) -> FormResult<()> {
        self.reset(model.into_patch())
    }

    fn return_to_idle(&self, context: &'static str) -> FormResult<()> {
        let mut state = write_lock(&self.state, context)?;
        transition_submit_state(&mut state, SubmitState::Idle)
    }
}

fn downcast_value<V: Any>(
    key: FieldKey,
    field: &dyn FormField,
    value: Box<dyn Any + Send>,
) -> FormResult<V> {
    value
        .downcast::<V>()
        .map(|value| *value)
        .map_err(|_| FormError::TypeMismatch {
            key,
            field_type: field.value_type(),
            requested: type_name::<V>(),
        })
}

fn transition_submit_state(state: &mut FormState, next: SubmitState) -> FormResult<()> {
    let current = state.submit_state;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Validating)
            | (SubmitState::Validating, SubmitState::Succeeded)
            | (SubmitState::Validating, SubmitState::Failed)
            | (SubmitState::Succeeded, SubmitState::Validating)
            | (SubmitState::Failed, SubmitState::Validating)
            | (_, SubmitState::Idle)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    state.submit_state = next;
    Ok(())
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
