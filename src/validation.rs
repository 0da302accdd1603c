//! Declarative field checks applied to request bodies before they reach a
//! service. Each check appends a human-readable message; a non-empty list
//! becomes a 400 with every failing field listed.

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 60;
pub const EMAIL_MAX: usize = 255;
pub const ADDRESS_MAX: usize = 400;
pub const PASSWORD_MIN: usize = 6;
pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 5;

/// Implemented by every request body that carries field constraints.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<String>>;
}

#[derive(Debug, Default)]
pub struct FieldErrors(Vec<String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.chars().count();
        if len < min || len > max {
            self.0.push(format!(
                "\"{field}\" length must be between {min} and {max} characters"
            ));
        }
        self
    }

    pub fn max_length(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value
            && value.chars().count() > max
        {
            self.0.push(format!(
                "\"{field}\" length must be less than or equal to {max} characters"
            ));
        }
        self
    }

    pub fn min_length(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.0.push(format!(
                "\"{field}\" length must be at least {min} characters"
            ));
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.0.push(format!("\"{field}\" is not allowed to be empty"));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_valid_email(value) {
            self.0.push(format!("\"{field}\" must be a valid email"));
        }
        self
    }

    pub fn range(&mut self, field: &str, value: i32, min: i32, max: i32) -> &mut Self {
        if value < min || value > max {
            self.0.push(format!(
                "\"{field}\" must be between {min} and {max}"
            ));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), Vec<String>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.0))
        }
    }
}

/// Loose structural check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.len() > EMAIL_MAX || value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
