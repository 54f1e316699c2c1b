use thiserror::Error;

use crate::draft::RequiredField;

/// Local validation failures, raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", field_list(.0))]
    MissingFields(Vec<RequiredField>),

    #[error("phone number is required for a test call")]
    MissingPhoneNumber,
}

fn field_list(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}
