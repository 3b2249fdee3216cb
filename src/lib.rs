//! Bidirectional value formatting and validation for form fields.
//!
//! A [`format::Format`] parses what a user typed into a typed value and
//! renders values back to text. A [`form::ValueController`] holds one field's
//! live state and decides which errors the UI may show. A [`form::Form`]
//! submits a set of fields together and builds a typed record from them.

pub mod date;
pub mod form;
pub mod format;
pub mod i18n;
pub mod prelude;

pub use date::{SmartDateParser, smart_date_parse};
pub use form::{Form, FormError, FormModel, FormResult, ValueController};
pub use format::{Format, ParseResult};

#[cfg(test)]
mod test_public_api;
