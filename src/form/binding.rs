use super::controller::FormResult;
use super::value::ValueController;
use crate::format::{FormatValue, Optional, Requirement};

/// Text a widget is holding while the user works on it.
///
/// The buffer is authoritative while an edit is in progress; otherwise it
/// follows the controller's raw value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EditBuffer {
    text: String,
    editing: bool,
    suppress_error: bool,
}

impl EditBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn suppresses_error(&self) -> bool {
        self.suppress_error
    }
}

/// Connects a text widget to a [`ValueController`].
///
/// Keystrokes only touch the local buffer. The controller sees the text on
/// blur, Enter or a pick, and the buffer takes back any canonical form the
/// commit produces. Errors are hidden while the user is typing.
#[derive(Debug)]
pub struct TextBinding<V, Q = Optional> {
    controller: ValueController<V, String, Q>,
    buffer: EditBuffer,
}

impl<V: FormatValue, Q: Requirement> TextBinding<V, Q> {
    pub fn new(controller: ValueController<V, String, Q>) -> FormResult<Self> {
        let text = controller.raw()?;
        Ok(Self {
            controller,
            buffer: EditBuffer {
                text,
                ..EditBuffer::default()
            },
        })
    }

    pub fn controller(&self) -> &ValueController<V, String, Q> {
        &self.controller
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn text(&self) -> &str {
        &self.buffer.text
    }

    pub fn focus(&mut self) {
        self.buffer.editing = true;
        self.buffer.suppress_error = true;
    }

    pub fn input(&mut self, text: impl Into<String>) {
        self.buffer.text = text.into();
        self.buffer.editing = true;
        self.buffer.suppress_error = true;
    }

    pub fn blur(&mut self) -> FormResult<()> {
        self.commit()?;
        self.buffer.editing = false;
        Ok(())
    }

    /// Commits without leaving the field.
    pub fn enter(&mut self) -> FormResult<()> {
        self.commit()
    }

    pub fn commit(&mut self) -> FormResult<()> {
        self.buffer.suppress_error = false;
        if let Some(canonical) = self.controller.commit_raw(self.buffer.text.clone())? {
            self.buffer.text = canonical;
        }
        Ok(())
    }

    /// A value chosen from a picker rather than typed. It goes through the
    /// same commit path as typed text.
    pub fn pick(&mut self, value: Option<V>) -> FormResult<()> {
        let format = self.controller.format()?;
        self.buffer.text = match &value {
            Some(value) => format.serialise(value).raw,
            None => format.empty().clone(),
        };
        self.commit()
    }

    /// Pulls the controller's raw into the buffer unless an edit is underway.
    /// Call after anything other than this binding changed the controller.
    pub fn sync(&mut self) -> FormResult<()> {
        if !self.buffer.editing {
            self.buffer.text = self.controller.raw()?;
        }
        Ok(())
    }

    pub fn shown_error(&self) -> FormResult<Option<String>> {
        if self.buffer.suppress_error {
            return Ok(None);
        }
        self.controller.error()
    }

    pub fn is_required(&self) -> FormResult<bool> {
        self.controller.is_required()
    }

    /// Input length limit for the widget, if the format sets one.
    pub fn max_length(&self) -> FormResult<Option<usize>> {
        Ok(self.controller.format()?.limits().max_length)
    }
}
