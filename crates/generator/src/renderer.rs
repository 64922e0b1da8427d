//! Recursive rendering of schema nodes as `.proto` text
//!
//! Every render function returns a self-contained block ending in a newline.
//! Children are rendered first, wrapped with their own comments and then
//! indented, so comments line up with the definitions they belong to.

use crate::comments::{attach, indent};
use crate::rewriter::Rewriter;
use crate::templates::escape_proto_string;
use crate::type_mapper::TypeMapper;
use protoc_gen_proto23_common::{
    CommentBundle, EnumNode, FieldNode, MessageNode, MethodNode, Result, RewriteRules,
    ServiceNode,
};
use tracing::error;

const NESTED_INDENT: usize = 4;

/// Renders messages, enums, services and methods for the configured target
pub struct DescriptorRenderer<'a> {
    rules: &'a RewriteRules,
    rewriter: Rewriter<'a>,
}

impl<'a> DescriptorRenderer<'a> {
    pub fn new(rules: &'a RewriteRules) -> Self {
        Self {
            rules,
            rewriter: Rewriter::new(rules),
        }
    }

    pub fn rewriter(&self) -> &Rewriter<'a> {
        &self.rewriter
    }

    /// Render a message with its nested messages, nested enums and fields
    ///
    /// Output groups children as messages, then enums, then fields, keeping
    /// declaration order inside each group.
    pub fn render_message(&self, message: &MessageNode) -> Result<String> {
        let mut out = format!("message {} {{\n", message.name);

        for nested in &message.messages {
            out.push_str(&nested_block(&self.render_message(nested)?, &nested.comments));
        }
        for nested in &message.enums {
            out.push_str(&nested_block(&self.render_enum(nested), &nested.comments));
        }
        for field in &message.fields {
            out.push_str(&nested_block(&self.render_field(field)?, &field.comments));
        }

        out.push_str("}\n");
        Ok(out)
    }

    /// Render a single field line, unindented
    ///
    /// Fails with `DialectMismatch` when the label has no spelling in the
    /// target syntax.
    pub fn render_field(&self, field: &FieldNode) -> Result<String> {
        let label = TypeMapper::label_text(field.label, self.rules.target_syntax)
            .inspect_err(|e| error!(field = %field.name, number = field.number, "{}", e))?;
        let type_name = self.rewriter.rewrite_package(TypeMapper::type_text(field));

        let line = if label.is_empty() {
            format!("{} {} = {};\n", type_name, field.name, field.number)
        } else {
            format!("{} {} {} = {};\n", label, type_name, field.name, field.number)
        };
        Ok(line)
    }

    pub fn render_enum(&self, enumeration: &EnumNode) -> String {
        let mut out = format!("enum {} {{\n", enumeration.name);

        for value in &enumeration.values {
            let line = format!("{} = {};\n", value.name, value.number);
            out.push_str(&nested_block(&line, &value.comments));
        }

        out.push_str("}\n");
        out
    }

    pub fn render_service(&self, service: &ServiceNode) -> String {
        let mut out = format!("service {} {{\n", service.name);

        for method in &service.methods {
            out.push_str(&nested_block(&self.render_method(method), &method.comments));
        }

        out.push_str("}\n");
        out
    }

    /// Render an rpc with its custom options
    ///
    /// The method's own comments are attached by the enclosing service.
    pub fn render_method(&self, method: &MethodNode) -> String {
        let mut out = format!(
            "rpc {}({}{}) returns ({}{}) {{\n",
            method.name,
            stream_keyword(method.client_streaming),
            self.rewriter.rewrite_package(&method.input_type),
            stream_keyword(method.server_streaming),
            self.rewriter.rewrite_package(&method.output_type),
        );

        for (name, value) in &method.options {
            out.push_str(&format!("    option ({}) = \"{}\";\n", name, escape_proto_string(value)));
        }

        out.push_str("}\n");
        out
    }
}

fn nested_block(rendered: &str, comments: &CommentBundle) -> String {
    indent(&attach(rendered, comments), NESTED_INDENT)
}

fn stream_keyword(streaming: bool) -> &'static str {
    if streaming {
        "stream "
    } else {
        ""
    }
}
