//! Base contract system

use cw_core::error::ValidationErrors;

/// Result of contract validation
pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// A contract validates one kind of input and produces its normalized form
pub trait Contract<Input>: Send + Sync {
    type Output;

    /// Validate and normalize the input, reporting all errors together
    fn validate(&self, input: Input) -> ValidationResult<Self::Output>;
}
