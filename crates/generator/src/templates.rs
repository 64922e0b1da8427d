//! Template loading and management

use protoc_gen_proto23_common::{ConvertError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Name of the per-file layout template
pub const FILE_TEMPLATE: &str = "file.proto";

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    // Fragments are already valid .proto text
    tera.autoescape_on(vec![]);

    tera.register_filter("proto_string", proto_string_filter);

    tera.add_raw_template(FILE_TEMPLATE, include_str!("../templates/file.proto.tera"))
        .map_err(|e| {
            ConvertError::Generation(format!("Failed to load file.proto template: {}", e))
        })?;

    Ok(tera)
}

/// Filter to escape a value for a double-quoted `.proto` string literal
fn proto_string_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("proto_string filter expects a string"))?;

    Ok(Value::String(escape_proto_string(s)))
}

/// Escape text for use inside a double-quoted `.proto` string literal
///
/// Control characters without a short escape are written as `\xNN`.
pub(crate) fn escape_proto_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }

    out
}
