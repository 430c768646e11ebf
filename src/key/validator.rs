//! Value validation hooks.
//!
//! Validators are registered against a key during schema bootstrap and run
//! on every `set` before the converter. A rejection surfaces as a
//! validation error and leaves the entity untouched.

use crate::model::Value;
use crate::{Error, Result};
use super::PropertyKey;

/// A single validation rule attached to a property key.
pub trait PropertyValidator: Send + Sync {
    fn validate(&self, key: &dyn PropertyKey, value: &Value) -> Result<()>;
}

/// Rejects empty or whitespace-only strings.
pub struct NonEmptyStringValidator;

impl PropertyValidator for NonEmptyStringValidator {
    fn validate(&self, key: &dyn PropertyKey, value: &Value) -> Result<()> {
        match value {
            Value::String(s) if s.trim().is_empty() => Err(Error::Validation {
                key: key.json_name().to_owned(),
                message: "must not be empty".to_owned(),
            }),
            _ => Ok(()),
        }
    }
}

/// Rejects integer values outside an inclusive range.
pub struct IntRangeValidator {
    min: i64,
    max: i64,
}

impl IntRangeValidator {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

impl PropertyValidator for IntRangeValidator {
    fn validate(&self, key: &dyn PropertyKey, value: &Value) -> Result<()> {
        let Some(i) = value.as_int() else {
            // Type mismatches are the converter's concern.
            return Ok(());
        };
        if i < self.min || i > self.max {
            return Err(Error::Validation {
                key: key.json_name().to_owned(),
                message: format!("{i} is outside the range {}..={}", self.min, self.max),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Property;

    #[test]
    fn test_non_empty_rejects_blank() {
        let key = Property::string("name");
        let validator = NonEmptyStringValidator;

        assert!(validator.validate(&key, &Value::from("Ada")).is_ok());
        assert!(validator.validate(&key, &Value::from("   ")).is_err());
    }

    #[test]
    fn test_int_range() {
        let key = Property::int("age");
        let validator = IntRangeValidator::new(0, 150);

        assert!(validator.validate(&key, &Value::from(42)).is_ok());
        assert!(validator.validate(&key, &Value::from(-1)).is_err());
        assert!(validator.validate(&key, &Value::from(151)).is_err());
    }
}
