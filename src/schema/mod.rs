//! Schema system - artifact validation and report templates

pub mod template;
pub mod validator;

pub use template::{ReportRenderer, TemplateError};
pub use validator::{ArtifactKind, ValidationError, Validator};
