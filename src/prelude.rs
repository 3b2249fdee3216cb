pub use crate::date::{
    Clock, DateOrder, FixedClock, GuessDirection, PeriodBias, SmartDateParser, SystemClock,
    smart_date_parse,
};
pub use crate::form::{
    EditBuffer, ErrorMode, FieldKey, FieldOptions, FieldSnapshot, Form, FormBuilder, FormError,
    FormField, FormModel, FormPatch, FormResult, ReactionQueue, SubmitState, TextBinding,
    ValueController,
};
pub use crate::format::{
    Bound, DateOptions, Format, FormatValue, Limits, Optional, ParseResult, Required, Requirement,
};
pub use crate::i18n::Locale;
