//! Common types and utilities for protoc-gen-proto23
//!
//! This crate contains the error type, the read-only schema tree shared by the
//! parser and the generator, and the YAML rewrite-rule configuration.

mod rewrite_rules;
mod schema;

pub use rewrite_rules::RewriteRules;
pub use schema::{
    CommentBundle, EnumNode, EnumValueNode, FieldNode, Import, ImportKind, MessageNode,
    MethodNode, SchemaFile, ServiceNode,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while translating a schema set
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Label '{label}' cannot be expressed with target syntax '{target}'")]
    DialectMismatch { label: Label, target: Syntax },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Protobuf IDL syntax dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    #[default]
    Proto2,
    Proto3,
    Editions,
}

impl Syntax {
    /// Interpret the `syntax` field of a `FileDescriptorProto`
    ///
    /// protoc leaves the field unset for proto2 files, so the empty string maps
    /// to `Proto2`. Unknown values are reported as parse errors.
    ///
    /// # Examples
    /// ```
    /// use protoc_gen_proto23_common::Syntax;
    ///
    /// assert_eq!(Syntax::from_descriptor("").unwrap(), Syntax::Proto2);
    /// assert_eq!(Syntax::from_descriptor("proto3").unwrap(), Syntax::Proto3);
    /// ```
    pub fn from_descriptor(value: &str) -> Result<Self> {
        match value {
            "" | "proto2" => Ok(Syntax::Proto2),
            "proto3" => Ok(Syntax::Proto3),
            "editions" => Ok(Syntax::Editions),
            other => Err(ConvertError::Parse(format!(
                "Unknown syntax declaration: {}",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Proto2 => "proto2",
            Syntax::Proto3 => "proto3",
            Syntax::Editions => "editions",
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field presence / cardinality modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Also covers proto3 implicit-presence fields, which descriptors encode as optional
    #[default]
    Optional,
    Required,
    Repeated,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Optional => write!(f, "optional"),
            Label::Required => write!(f, "required"),
            Label::Repeated => write!(f, "repeated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_from_descriptor() {
        assert_eq!(Syntax::from_descriptor("").unwrap(), Syntax::Proto2);
        assert_eq!(Syntax::from_descriptor("proto2").unwrap(), Syntax::Proto2);
        assert_eq!(Syntax::from_descriptor("proto3").unwrap(), Syntax::Proto3);
        assert_eq!(
            Syntax::from_descriptor("editions").unwrap(),
            Syntax::Editions
        );
        assert!(matches!(
            Syntax::from_descriptor("proto4"),
            Err(ConvertError::Parse(_))
        ));
    }

    #[test]
    fn test_dialect_mismatch_message() {
        let err = ConvertError::DialectMismatch {
            label: Label::Required,
            target: Syntax::Proto3,
        };
        assert_eq!(
            err.to_string(),
            "Label 'required' cannot be expressed with target syntax 'proto3'"
        );
    }
}
