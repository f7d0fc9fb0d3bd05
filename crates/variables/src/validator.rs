use token_model::{TokenSystem, ValidationReport};

/// Referential-integrity check run before a transform.
///
/// The check itself lives outside this crate; any closure over a [`TokenSystem`] works.
pub trait Validator {
    fn validate(&self, system: &TokenSystem) -> ValidationReport;
}

impl<F> Validator for F
where
    F: Fn(&TokenSystem) -> ValidationReport,
{
    fn validate(&self, system: &TokenSystem) -> ValidationReport {
        self(system)
    }
}
