//! Read-only schema tree
//!
//! Built once per invocation by the parser from the descriptors in the
//! incoming request and only read afterwards.

use crate::{Label, Syntax};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Comments textually attached to a schema node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentBundle {
    /// Standalone comment blocks separated from the node by a blank line
    #[serde(default)]
    pub detached: Vec<String>,
    /// Comment directly above the node
    #[serde(default)]
    pub leading: String,
    /// Comment on the same line, after the node
    #[serde(default)]
    pub trailing: String,
}

impl CommentBundle {
    pub fn is_empty(&self) -> bool {
        self.detached.is_empty() && self.leading.is_empty() && self.trailing.is_empty()
    }
}

/// How a dependency is imported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    #[default]
    Plain,
    Public,
    Weak,
}

/// A single `import` statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub path: String,
    #[serde(default)]
    pub kind: ImportKind,
}

/// One `.proto` file of the request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// File path as seen by protoc (e.g. "a/b/foo.proto")
    pub name: String,
    /// Syntax dialect the file was written in
    pub syntax: Syntax,
    /// Package name, empty when the file declares none
    pub package: String,
    pub imports: Vec<Import>,
    /// `option cc_generic_services = true;` is set
    pub cc_generic_services: bool,
    pub enums: Vec<EnumNode>,
    pub messages: Vec<MessageNode>,
    pub services: Vec<ServiceNode>,
    pub syntax_comments: CommentBundle,
    pub package_comments: CommentBundle,
    /// Requested for generation, as opposed to only being imported
    pub generate: bool,
}

/// Message definition with its nested definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageNode {
    pub name: String,
    pub messages: Vec<MessageNode>,
    pub enums: Vec<EnumNode>,
    pub fields: Vec<FieldNode>,
    pub comments: CommentBundle,
}

/// Message field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    pub number: i32,
    pub label: Label,
    /// Raw `FieldDescriptorProto.type` number (1 = double ... 18 = sint64)
    pub wire_type: i32,
    /// Fully-qualified type name for message, enum and group fields
    #[serde(default)]
    pub type_name: String,
    pub comments: CommentBundle,
}

/// Enum definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumNode {
    pub name: String,
    pub values: Vec<EnumValueNode>,
    pub comments: CommentBundle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumValueNode {
    pub name: String,
    pub number: i32,
    pub comments: CommentBundle,
}

/// Service definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceNode {
    pub name: String,
    pub methods: Vec<MethodNode>,
    pub comments: CommentBundle,
}

/// RPC method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodNode {
    pub name: String,
    /// Fully-qualified request message name
    pub input_type: String,
    /// Fully-qualified response message name
    pub output_type: String,
    #[serde(default)]
    pub client_streaming: bool,
    #[serde(default)]
    pub server_streaming: bool,
    /// Custom method options (extension full name -> value), sorted by name
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    pub comments: CommentBundle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_bundle_is_empty() {
        assert!(CommentBundle::default().is_empty());

        let bundle = CommentBundle {
            trailing: "note".to_string(),
            ..Default::default()
        };
        assert!(!bundle.is_empty());
    }

    #[test]
    fn test_schema_file_json_shape() {
        let file = SchemaFile {
            name: "foo.proto".to_string(),
            syntax: Syntax::Proto3,
            imports: vec![Import {
                path: "other.proto".to_string(),
                kind: ImportKind::Public,
            }],
            ..Default::default()
        };

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["syntax"], "proto3");
        assert_eq!(json["imports"][0]["kind"], "public");

        let back: SchemaFile = serde_json::from_value(json).unwrap();
        assert_eq!(back, file);
    }
}
