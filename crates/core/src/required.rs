//! Presence checks for required form fields.

use crate::error::{DomainError, DomainResult};

/// Collects the names of required columns that are blank or absent.
///
/// ```
/// use procure_core::Required;
///
/// let err = Required::new()
///     .text("vendorname", "  ")
///     .value("quantity", &Some(3))
///     .finish()
///     .unwrap_err();
/// assert_eq!(err.to_string(), "missing required field(s): vendorname");
/// ```
#[derive(Debug, Default)]
pub struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text must contain at least one non-whitespace character.
    pub fn text(mut self, column: &'static str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.missing.push(column);
        }
        self
    }

    pub fn value<T>(mut self, column: &'static str, value: &Option<T>) -> Self {
        if value.is_none() {
            self.missing.push(column);
        }
        self
    }

    pub fn finish(self) -> DomainResult<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::MissingFields(self.missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_fields_in_declaration_order() {
        let err = Required::new()
            .text("qcchecklist", "")
            .text("qcstatus", "Passed")
            .value::<i32>("inspectiondate", &None)
            .finish()
            .unwrap_err();

        match err {
            DomainError::MissingFields(fields) => {
                assert_eq!(fields, vec!["qcchecklist", "inspectiondate"])
            }
            other => panic!("Expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn all_present_passes() {
        assert!(Required::new().text("a", "x").value("b", &Some(0)).finish().is_ok());
    }
}
