//! Field validation messages for the selected segment's date-time text

use idletally_domain::constants::{
    INVALID_END_TIME_MESSAGE, INVALID_START_TIME_MESSAGE, VALIDATION_MESSAGE_SEPARATOR,
};

/// Editable date-time fields, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Start,
    End,
}

impl DateField {
    /// Fixed message shown when the field's text does not parse
    pub const fn invalid_message(self) -> &'static str {
        match self {
            Self::Start => INVALID_START_TIME_MESSAGE,
            Self::End => INVALID_END_TIME_MESSAGE,
        }
    }
}

/// At most one current message per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationMessages {
    start: Option<&'static str>,
    end: Option<&'static str>,
}

impl ValidationMessages {
    pub const fn new() -> Self {
        Self { start: None, end: None }
    }

    pub fn mark_invalid(&mut self, field: DateField) {
        *self.slot(field) = Some(field.invalid_message());
    }

    pub fn clear(&mut self, field: DateField) {
        *self.slot(field) = None;
    }

    pub const fn message(&self, field: DateField) -> Option<&'static str> {
        match field {
            DateField::Start => self.start,
            DateField::End => self.end,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Present messages joined in field order
    pub fn joined(&self) -> String {
        [self.start, self.end].into_iter().flatten().collect::<Vec<_>>().join(VALIDATION_MESSAGE_SEPARATOR)
    }

    fn slot(&mut self, field: DateField) -> &mut Option<&'static str> {
        match field {
            DateField::Start => &mut self.start,
            DateField::End => &mut self.end,
        }
    }
}
