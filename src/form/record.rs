use std::any::{Any, type_name};
use std::fmt;

use indexmap::IndexMap;

use super::controller::{FieldKey, Form, FormResult};
use super::value::{ErrorMode, ValueController};
use crate::format::{FormatValue, Requirement};

/// A typed record assembled from a [`Form`].
///
/// Usually derived with `#[derive(FormModel)]`: plain fields are read with
/// [`Form::required_value`], `Option<T>` fields with [`Form::optional_value`].
pub trait FormModel: Sized {
    fn from_form(form: &Form) -> FormResult<Self>;

    /// The record as field values for [`Form::reset`].
    fn into_patch(self) -> FormPatch;
}

/// A value controller with its value type erased, as the form holds it.
pub trait FormField: Send + Sync {
    fn error(&self) -> FormResult<Option<String>>;
    fn error_mode(&self) -> FormResult<ErrorMode>;
    fn set_error_mode(&self, mode: ErrorMode) -> FormResult<()>;
    fn clear(&self) -> FormResult<()>;
    /// Whether the controller is bound to a type-level required format.
    fn requires_value(&self) -> bool;
    fn value_type(&self) -> &'static str;
    fn accepts(&self, value: &(dyn Any + Send)) -> bool;
    fn value_any(&self) -> FormResult<Option<Box<dyn Any + Send>>>;
    /// Returns `false` without touching the field when `value` has the wrong type.
    fn set_value_any(&self, value: Box<dyn Any + Send>, mode: ErrorMode) -> FormResult<bool>;
}

impl<V, R, Q> FormField for ValueController<V, R, Q>
where
    V: FormatValue,
    R: FormatValue + PartialEq,
    Q: Requirement,
{
    fn error(&self) -> FormResult<Option<String>> {
        ValueController::error(self)
    }

    fn error_mode(&self) -> FormResult<ErrorMode> {
        ValueController::error_mode(self)
    }

    fn set_error_mode(&self, mode: ErrorMode) -> FormResult<()> {
        ValueController::set_error_mode(self, mode)
    }

    fn clear(&self) -> FormResult<()> {
        ValueController::clear(self)
    }

    fn requires_value(&self) -> bool {
        Q::REQUIRED
    }

    fn value_type(&self) -> &'static str {
        type_name::<V>()
    }

    fn accepts(&self, value: &(dyn Any + Send)) -> bool {
        value.is::<V>()
    }

    fn value_any(&self) -> FormResult<Option<Box<dyn Any + Send>>> {
        Ok(self
            .value()?
            .map(|value| Box::new(value) as Box<dyn Any + Send>))
    }

    fn set_value_any(&self, value: Box<dyn Any + Send>, mode: ErrorMode) -> FormResult<bool> {
        match value.downcast::<V>() {
            Ok(value) => {
                self.set_value_with_mode(Some(*value), mode)?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }
}

/// Field values keyed by field, for [`Form::reset`]. Fields left out are
/// cleared.
#[derive(Default)]
pub struct FormPatch {
    values: IndexMap<FieldKey, PatchValue>,
}

struct PatchValue {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl fmt::Debug for FormPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

impl FormPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<V: Any + Send>(mut self, key: impl Into<FieldKey>, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert<V: Any + Send>(&mut self, key: impl Into<FieldKey>, value: V) {
        self.values.insert(
            key.into(),
            PatchValue {
                value: Box::new(value),
                type_name: type_name::<V>(),
            },
        );
    }

    /// Inserts `value` when present; `None` leaves the field to be cleared.
    pub fn insert_optional<V: Any + Send>(&mut self, key: impl Into<FieldKey>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn contains(&self, key: impl Into<FieldKey>) -> bool {
        self.values.contains_key(&key.into())
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(super) fn get(&self, key: FieldKey) -> Option<(&(dyn Any + Send), &'static str)> {
        self.values
            .get(&key)
            .map(|entry| (&*entry.value, entry.type_name))
    }

    pub(super) fn take(&mut self, key: FieldKey) -> Option<(Box<dyn Any + Send>, &'static str)> {
        self.values
            .shift_remove(&key)
            .map(|entry| (entry.value, entry.type_name))
    }
}
