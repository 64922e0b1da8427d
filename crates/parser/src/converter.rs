//! Converts protobuf descriptors to the schema tree

use crate::comments::CommentIndex;
use protoc_gen_proto23_common::{
    EnumNode, EnumValueNode, FieldNode, Import, ImportKind, Label, MessageNode, MethodNode,
    Result, SchemaFile, ServiceNode, Syntax,
};
use prost_reflect::{DescriptorPool, Kind, MethodDescriptor, Value};
use prost_types::field_descriptor_proto::Label as ProtoLabel;
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    MethodDescriptorProto, ServiceDescriptorProto,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

// FileDescriptorProto field numbers
const FILE_PACKAGE: i32 = 2;
const FILE_MESSAGE_TYPE: i32 = 4;
const FILE_ENUM_TYPE: i32 = 5;
const FILE_SERVICE: i32 = 6;
const FILE_SYNTAX: i32 = 12;

// DescriptorProto field numbers
const MESSAGE_FIELD: i32 = 2;
const MESSAGE_NESTED_TYPE: i32 = 3;
const MESSAGE_ENUM_TYPE: i32 = 4;

// EnumDescriptorProto / ServiceDescriptorProto field numbers
const ENUM_VALUE: i32 = 2;
const SERVICE_METHOD: i32 = 2;

/// Convert one file descriptor into a `SchemaFile`
pub(crate) fn convert_file(
    file: &FileDescriptorProto,
    pool: &DescriptorPool,
    generate: bool,
) -> Result<SchemaFile> {
    let comments = CommentIndex::from_source_info(file.source_code_info.as_ref());
    let syntax = Syntax::from_descriptor(file.syntax())?;

    debug!(file = file.name(), %syntax, generate, "converting file descriptor");

    let imports = file
        .dependency
        .iter()
        .enumerate()
        .map(|(index, path)| Import {
            path: path.clone(),
            kind: import_kind(file, index),
        })
        .collect();

    let enums = file
        .enum_type
        .iter()
        .enumerate()
        .map(|(i, e)| convert_enum(e, &child_path(&[], FILE_ENUM_TYPE, i), &comments))
        .collect();

    let messages = file
        .message_type
        .iter()
        .enumerate()
        .map(|(i, m)| convert_message(m, &child_path(&[], FILE_MESSAGE_TYPE, i), &comments))
        .collect();

    let services = file
        .service
        .iter()
        .enumerate()
        .map(|(i, s)| {
            convert_service(
                file.package(),
                s,
                &child_path(&[], FILE_SERVICE, i),
                &comments,
                pool,
            )
        })
        .collect();

    Ok(SchemaFile {
        name: file.name().to_string(),
        syntax,
        package: file.package().to_string(),
        imports,
        cc_generic_services: file
            .options
            .as_ref()
            .map(|o| o.cc_generic_services())
            .unwrap_or(false),
        enums,
        messages,
        services,
        syntax_comments: comments.get(&[FILE_SYNTAX]),
        package_comments: comments.get(&[FILE_PACKAGE]),
        generate,
    })
}

/// Path of the `index`-th element of repeated field `field` under `parent`
fn child_path(parent: &[i32], field: i32, index: usize) -> Vec<i32> {
    let mut path = Vec::with_capacity(parent.len() + 2);
    path.extend_from_slice(parent);
    path.push(field);
    path.push(index as i32);
    path
}

fn import_kind(file: &FileDescriptorProto, index: usize) -> ImportKind {
    let index = index as i32;
    if file.public_dependency.contains(&index) {
        ImportKind::Public
    } else if file.weak_dependency.contains(&index) {
        ImportKind::Weak
    } else {
        ImportKind::Plain
    }
}

fn convert_message(
    message: &DescriptorProto,
    path: &[i32],
    comments: &CommentIndex,
) -> MessageNode {
    MessageNode {
        name: message.name().to_string(),
        messages: message
            .nested_type
            .iter()
            .enumerate()
            .map(|(i, m)| convert_message(m, &child_path(path, MESSAGE_NESTED_TYPE, i), comments))
            .collect(),
        enums: message
            .enum_type
            .iter()
            .enumerate()
            .map(|(i, e)| convert_enum(e, &child_path(path, MESSAGE_ENUM_TYPE, i), comments))
            .collect(),
        fields: message
            .field
            .iter()
            .enumerate()
            .map(|(i, f)| convert_field(f, &child_path(path, MESSAGE_FIELD, i), comments))
            .collect(),
        comments: comments.get(path),
    }
}

fn convert_field(field: &FieldDescriptorProto, path: &[i32], comments: &CommentIndex) -> FieldNode {
    let label = match field.label() {
        ProtoLabel::Optional => Label::Optional,
        ProtoLabel::Required => Label::Required,
        ProtoLabel::Repeated => Label::Repeated,
    };

    FieldNode {
        name: field.name().to_string(),
        number: field.number(),
        label,
        wire_type: field.r#type.unwrap_or_default(),
        type_name: field.type_name().to_string(),
        comments: comments.get(path),
    }
}

fn convert_enum(
    enumeration: &EnumDescriptorProto,
    path: &[i32],
    comments: &CommentIndex,
) -> EnumNode {
    EnumNode {
        name: enumeration.name().to_string(),
        values: enumeration
            .value
            .iter()
            .enumerate()
            .map(|(i, v)| EnumValueNode {
                name: v.name().to_string(),
                number: v.number(),
                comments: comments.get(&child_path(path, ENUM_VALUE, i)),
            })
            .collect(),
        comments: comments.get(path),
    }
}

fn convert_service(
    package: &str,
    service: &ServiceDescriptorProto,
    path: &[i32],
    comments: &CommentIndex,
    pool: &DescriptorPool,
) -> ServiceNode {
    let full_name = if package.is_empty() {
        service.name().to_string()
    } else {
        format!("{}.{}", package, service.name())
    };
    let reflected = pool.get_service_by_name(&full_name);

    let methods = service
        .method
        .iter()
        .enumerate()
        .map(|(i, method)| {
            let options = reflected
                .as_ref()
                .and_then(|s| s.methods().find(|m| m.name() == method.name()))
                .map(|m| method_options(&m))
                .unwrap_or_default();
            convert_method(method, options, &child_path(path, SERVICE_METHOD, i), comments)
        })
        .collect();

    ServiceNode {
        name: service.name().to_string(),
        methods,
        comments: comments.get(path),
    }
}

fn convert_method(
    method: &MethodDescriptorProto,
    options: BTreeMap<String, String>,
    path: &[i32],
    comments: &CommentIndex,
) -> MethodNode {
    MethodNode {
        name: method.name().to_string(),
        input_type: method.input_type().to_string(),
        output_type: method.output_type().to_string(),
        client_streaming: method.client_streaming(),
        server_streaming: method.server_streaming(),
        options,
        comments: comments.get(path),
    }
}

/// Collect custom (extension) options set on a method
///
/// prost-types drops extension fields while decoding, so these come from the
/// reflection pool, which decodes options against the extensions it knows.
fn method_options(method: &MethodDescriptor) -> BTreeMap<String, String> {
    let mut options = BTreeMap::new();
    let raw = method.options();

    for (extension, value) in raw.extensions() {
        match option_value_text(&extension.kind(), value) {
            Some(text) => {
                options.insert(extension.full_name().to_string(), text);
            }
            None => warn!(
                method = method.full_name(),
                option = extension.full_name(),
                "dropping method option with a non-scalar value"
            ),
        }
    }

    options
}

/// Textual form of a scalar option value; `None` for messages, lists and maps
fn option_value_text(kind: &Kind, value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::I32(n) => Some(n.to_string()),
        Value::I64(n) => Some(n.to_string()),
        Value::U32(n) => Some(n.to_string()),
        Value::U64(n) => Some(n.to_string()),
        Value::F32(n) => Some(n.to_string()),
        Value::F64(n) => Some(n.to_string()),
        Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        Value::EnumNumber(number) => {
            let name = match kind {
                Kind::Enum(descriptor) => descriptor
                    .get_value(*number)
                    .map(|v| v.name().to_string()),
                _ => None,
            };
            Some(name.unwrap_or_else(|| number.to_string()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{EnumValueDescriptorProto, FileOptions};

    #[test]
    fn test_child_path() {
        assert_eq!(child_path(&[], FILE_MESSAGE_TYPE, 2), vec![4, 2]);
        assert_eq!(child_path(&[4, 2], MESSAGE_FIELD, 0), vec![4, 2, 2, 0]);
    }

    #[test]
    fn test_import_kind() {
        let file = FileDescriptorProto {
            dependency: vec!["a.proto".into(), "b.proto".into(), "c.proto".into()],
            public_dependency: vec![1],
            weak_dependency: vec![2],
            ..Default::default()
        };

        assert_eq!(import_kind(&file, 0), ImportKind::Plain);
        assert_eq!(import_kind(&file, 1), ImportKind::Public);
        assert_eq!(import_kind(&file, 2), ImportKind::Weak);
    }

    #[test]
    fn test_convert_field_labels() {
        let comments = CommentIndex::default();
        let field = FieldDescriptorProto {
            name: Some("tags".to_string()),
            number: Some(4),
            label: Some(ProtoLabel::Repeated as i32),
            r#type: Some(9),
            ..Default::default()
        };

        let node = convert_field(&field, &[4, 0, 2, 0], &comments);
        assert_eq!(node.label, Label::Repeated);
        assert_eq!(node.wire_type, 9);
        assert_eq!(node.number, 4);
        assert!(node.type_name.is_empty());

        let unlabeled = FieldDescriptorProto {
            name: Some("id".to_string()),
            number: Some(1),
            ..Default::default()
        };
        assert_eq!(convert_field(&unlabeled, &[], &comments).label, Label::Optional);
    }

    #[test]
    fn test_convert_enum_values() {
        let enumeration = EnumDescriptorProto {
            name: Some("Color".to_string()),
            value: vec![
                EnumValueDescriptorProto {
                    name: Some("RED".to_string()),
                    number: Some(0),
                    ..Default::default()
                },
                EnumValueDescriptorProto {
                    name: Some("BLUE".to_string()),
                    number: Some(7),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let node = convert_enum(&enumeration, &[5, 0], &CommentIndex::default());
        let values: Vec<(&str, i32)> = node
            .values
            .iter()
            .map(|v| (v.name.as_str(), v.number))
            .collect();
        assert_eq!(values, vec![("RED", 0), ("BLUE", 7)]);
    }

    #[test]
    fn test_option_value_text_scalars() {
        assert_eq!(
            option_value_text(&Kind::String, &Value::String("/v1/items".to_string())),
            Some("/v1/items".to_string())
        );
        assert_eq!(
            option_value_text(&Kind::Bool, &Value::Bool(true)),
            Some("true".to_string())
        );
        assert_eq!(
            option_value_text(&Kind::Int32, &Value::I32(-3)),
            Some("-3".to_string())
        );
        assert_eq!(
            option_value_text(&Kind::Int32, &Value::EnumNumber(2)),
            Some("2".to_string())
        );
        assert_eq!(
            option_value_text(&Kind::String, &Value::List(vec![])),
            None
        );
    }

    #[test]
    fn test_convert_file_without_services() {
        let file = FileDescriptorProto {
            name: Some("plain.proto".to_string()),
            package: Some("demo".to_string()),
            syntax: Some("proto3".to_string()),
            options: Some(FileOptions {
                cc_generic_services: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        let schema = convert_file(&file, &DescriptorPool::new(), true).unwrap();
        assert_eq!(schema.name, "plain.proto");
        assert_eq!(schema.syntax, Syntax::Proto3);
        assert_eq!(schema.package, "demo");
        assert!(schema.cc_generic_services);
        assert!(schema.generate);
    }
}
