mod binding;
mod controller;
mod dispatch;
mod record;
mod value;


pub use binding::{EditBuffer, TextBinding};
pub use controller::{FieldKey, Form, FormBuilder, FormError, FormResult, SubmitState};
pub use dispatch::ReactionQueue;
pub use entryform_derive::FormModel;
pub use record::{FormField, FormModel, FormPatch};
pub use value::{ErrorMode, FieldOptions, FieldSnapshot, ValueController};
