//! Field label and type mapping for the target dialect

use protoc_gen_proto23_common::{ConvertError, FieldNode, Label, Result, Syntax};

/// Maps field labels and wire types to `.proto` tokens
pub struct TypeMapper;

impl TypeMapper {
    /// Keyword for `label` under the `target` dialect
    ///
    /// An empty string means "no keyword" (proto3 implicit presence).
    ///
    /// # Examples
    /// ```
    /// use protoc_gen_proto23_common::{Label, Syntax};
    /// use protoc_gen_proto23_generator::TypeMapper;
    ///
    /// assert_eq!(TypeMapper::label_text(Label::Optional, Syntax::Proto2).unwrap(), "optional");
    /// assert_eq!(TypeMapper::label_text(Label::Optional, Syntax::Proto3).unwrap(), "");
    /// assert!(TypeMapper::label_text(Label::Required, Syntax::Proto3).is_err());
    /// ```
    pub fn label_text(label: Label, target: Syntax) -> Result<&'static str> {
        match (label, target) {
            (Label::Repeated, _) => Ok("repeated"),
            (Label::Optional, Syntax::Proto3) => Ok(""),
            (Label::Optional, Syntax::Proto2) => Ok("optional"),
            (Label::Required, Syntax::Proto2) => Ok("required"),
            (label, target) => Err(ConvertError::DialectMismatch { label, target }),
        }
    }

    /// Scalar keyword for a descriptor type number, `None` for named types
    ///
    /// Tag 7 (fixed32) maps to "fixed64"; generated schemas rely on that table.
    pub fn scalar_type(wire_type: i32) -> Option<&'static str> {
        let name = match wire_type {
            1 => "double",
            2 => "float",
            3 => "int64",
            4 => "uint64",
            5 => "int32",
            6 => "fixed64",
            7 => "fixed64",
            8 => "bool",
            9 => "string",
            12 => "bytes",
            13 => "uint32",
            15 => "sfixed32",
            16 => "sfixed64",
            17 => "sint32",
            18 => "sint64",
            // 10 group, 11 message, 14 enum
            _ => return None,
        };
        Some(name)
    }

    /// Type token for a field, before package rewriting
    pub fn type_text(field: &FieldNode) -> &str {
        Self::scalar_type(field.wire_type).unwrap_or(field.type_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(wire_type: i32, type_name: &str) -> FieldNode {
        FieldNode {
            name: "f".to_string(),
            number: 1,
            wire_type,
            type_name: type_name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_labels_proto2_target() {
        for source_label in [Label::Optional, Label::Required, Label::Repeated] {
            let text = TypeMapper::label_text(source_label, Syntax::Proto2).unwrap();
            assert_eq!(text, source_label.to_string());
        }
    }

    #[test]
    fn test_labels_proto3_target() {
        assert_eq!(
            TypeMapper::label_text(Label::Optional, Syntax::Proto3).unwrap(),
            ""
        );
        assert_eq!(
            TypeMapper::label_text(Label::Repeated, Syntax::Proto3).unwrap(),
            "repeated"
        );
        assert!(matches!(
            TypeMapper::label_text(Label::Required, Syntax::Proto3),
            Err(ConvertError::DialectMismatch {
                label: Label::Required,
                target: Syntax::Proto3
            })
        ));
    }

    #[test]
    fn test_labels_editions_target() {
        assert_eq!(
            TypeMapper::label_text(Label::Repeated, Syntax::Editions).unwrap(),
            "repeated"
        );
        assert!(TypeMapper::label_text(Label::Optional, Syntax::Editions).is_err());
    }

    #[test]
    fn test_scalar_types() {
        assert_eq!(TypeMapper::type_text(&field(1, "")), "double");
        assert_eq!(TypeMapper::type_text(&field(9, "")), "string");
        assert_eq!(TypeMapper::type_text(&field(12, "")), "bytes");
        assert_eq!(TypeMapper::type_text(&field(18, "")), "sint64");
    }

    #[test]
    fn test_fixed32_tag_keeps_fixed64_mapping() {
        assert_eq!(TypeMapper::scalar_type(6), Some("fixed64"));
        assert_eq!(TypeMapper::scalar_type(7), Some("fixed64"));
    }

    #[test]
    fn test_named_types_pass_through() {
        assert_eq!(TypeMapper::type_text(&field(11, ".a.b.Msg")), ".a.b.Msg");
        assert_eq!(TypeMapper::type_text(&field(14, ".a.b.Color")), ".a.b.Color");
        assert_eq!(TypeMapper::type_text(&field(10, ".a.b.Group")), ".a.b.Group");
    }
}
