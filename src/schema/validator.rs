//! Artifact validation against the embedded JSON schemas

use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::Diagnostic;
use rust_embed::Embed;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Kinds of artifacts kept in the data directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Box,
    Rejected,
}

impl ArtifactKind {
    pub fn all() -> &'static [ArtifactKind] {
        &[ArtifactKind::Box, ArtifactKind::Rejected]
    }

    /// File name of the embedded schema
    pub fn schema_file(&self) -> &'static str {
        match self {
            ArtifactKind::Box => "box.schema.json",
            ArtifactKind::Rejected => "rejected.schema.json",
        }
    }
}

/// Validation failure for one artifact
#[derive(Debug, Error, Diagnostic)]
#[error("{filename} does not match the {kind:?} schema: {summary}")]
#[diagnostic(code(qcpack::schema::validation_error))]
pub struct ValidationError {
    pub filename: String,
    pub kind: ArtifactKind,
    pub summary: String,
    pub violations: Vec<String>,
}

/// Schema validator with compiled schemas
pub struct Validator {
    compiled: HashMap<ArtifactKind, JsonValidator>,
}

impl Validator {
    /// Compile every embedded schema. A schema that fails to compile is left
    /// out, which makes validation for that kind a pass-through.
    pub fn new() -> Self {
        let mut compiled = HashMap::new();

        for kind in ArtifactKind::all() {
            let Some(file) = EmbeddedSchemas::get(kind.schema_file()) else {
                continue;
            };
            let Ok(schema_json) = serde_json::from_slice::<JsonValue>(&file.data) else {
                continue;
            };
            if let Ok(compiled_schema) = validator_for(&schema_json) {
                compiled.insert(*kind, compiled_schema);
            }
        }

        Self { compiled }
    }

    /// Validate an already-parsed JSON document
    pub fn validate(
        &self,
        value: &JsonValue,
        filename: &str,
        kind: ArtifactKind,
    ) -> Result<(), ValidationError> {
        let Some(schema) = self.compiled.get(&kind) else {
            return Ok(());
        };

        let violations: Vec<String> = schema.iter_errors(value).map(|e| format_violation(&e)).collect();

        if violations.is_empty() {
            Ok(())
        } else {
            let summary = if violations.len() == 1 {
                violations[0].clone()
            } else {
                format!("{} errors (first: {})", violations.len(), violations[0])
            };
            Err(ValidationError {
                filename: filename.to_string(),
                kind,
                summary,
                violations,
            })
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

fn format_violation(error: &JsonSchemaError) -> String {
    let path = error.instance_path.as_str();
    if path.is_empty() {
        format!("document root: {}", error)
    } else {
        format!("'{}': {}", path, error)
    }
}
