//! Comment reattachment and block indentation

use protoc_gen_proto23_common::CommentBundle;

/// Wrap a rendered fragment with its detached, leading and trailing comments
///
/// Detached blocks come first, each followed by a blank line. The leading
/// comment sits directly above the fragment. One trailing newline is stripped
/// from the fragment so the trailing comment lands on its last line; the
/// result always ends with a newline.
pub fn attach(rendered: &str, comments: &CommentBundle) -> String {
    let mut out = String::with_capacity(rendered.len());

    for block in &comments.detached {
        out.push_str("/*\n");
        out.push_str(&indent(&escape(block), 2));
        out.push_str("\n  */\n\n");
    }

    if !comments.leading.is_empty() {
        out.push_str("\n\n/*\n");
        out.push_str(&indent(&escape(&comments.leading), 2));
        out.push_str("\n  */\n");
    }

    out.push_str(rendered.strip_suffix('\n').unwrap_or(rendered));

    if comments.trailing.is_empty() {
        out.push('\n');
    } else {
        out.push_str("/* ");
        out.push_str(&escape(&comments.trailing));
        out.push_str(" */\n");
    }

    out
}

/// Prefix every non-empty line with `width` spaces
///
/// Empty lines stay empty, so no trailing whitespace is introduced.
///
/// # Examples
/// ```
/// use protoc_gen_proto23_generator::indent;
///
/// assert_eq!(indent("a {\n\n}\n", 4), "    a {\n\n    }\n");
/// ```
pub fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);

    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keep comment text from closing the surrounding block comment
fn escape(text: &str) -> String {
    text.replace("*/", "* /")
}
