use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    pub const fn required(kind: FieldKind) -> Self {
        Self {
            kind,
            required: true,
        }
    }

    pub const fn optional(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
        }
    }

    pub fn check(&self, value: &str) -> Result<(), FieldError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return if self.required {
                Err(FieldError::Required)
            } else {
                Ok(())
            };
        }
        match self.kind {
            FieldKind::Text => Ok(()),
            FieldKind::Email if !is_email(trimmed) => Err(FieldError::InvalidEmail),
            FieldKind::Number if !is_number(trimmed) => Err(FieldError::NotNumeric),
            FieldKind::Email | FieldKind::Number => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Enter a number")]
    NotNumeric,
}

/// `local@domain.tld`: one `@`, no whitespace anywhere, and a dot inside the
/// domain with at least one character on each side.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(idx, ch)| ch == '.' && idx > 0 && idx + 1 < domain.len())
}

pub fn is_number(value: &str) -> bool {
    value.parse::<f64>().is_ok_and(|number| !number.is_nan())
}

/// A form input that carries its own rule and an error marker.
pub trait FormField {
    fn rule(&self) -> FieldRule;
    fn value(&self) -> &str;
    fn set_error(&mut self, error: Option<FieldError>);
}

/// Checks one field and updates its marker. Returns whether it is valid.
pub fn validate_field<F: FormField + ?Sized>(field: &mut F) -> bool {
    let result = field.rule().check(field.value());
    let valid = result.is_ok();
    field.set_error(result.err());
    valid
}

/// Checks every field, marking all offenders, and returns the conjunction.
pub fn validate_form<F: FormField>(fields: &mut [F]) -> bool {
    fields
        .iter_mut()
        .fold(true, |valid, field| validate_field(field) && valid)
}
