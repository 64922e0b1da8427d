//! Per-file translation

use crate::comments::attach;
use crate::renderer::DescriptorRenderer;
use crate::templates::{self, FILE_TEMPLATE};
use protoc_gen_proto23_common::{
    ConvertError, Import, Result, RewriteRules, SchemaFile, Syntax,
};
use tera::{Context, Tera};
use tracing::debug;

/// Import dropped when `DeleteValidate` is set
pub const VALIDATE_IMPORT: &str = "validate/validate.proto";

/// A generated `.proto` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Output path, after import-path rewriting
    pub name: String,
    pub content: String,
}

/// Renders whole schema files in the target dialect
pub struct FileTranslator<'a> {
    rules: &'a RewriteRules,
    renderer: DescriptorRenderer<'a>,
    tera: Tera,
}

impl<'a> FileTranslator<'a> {
    pub fn new(rules: &'a RewriteRules) -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self {
            rules,
            renderer: DescriptorRenderer::new(rules),
            tera,
        })
    }

    /// Translate one file
    ///
    /// Returns `Ok(None)` for files already written in proto2; only files in
    /// another dialect are translated.
    pub fn translate(&self, file: &SchemaFile) -> Result<Option<RenderedFile>> {
        if file.syntax == Syntax::Proto2 {
            debug!(file = %file.name, "skipping proto2 file");
            return Ok(None);
        }

        let rewriter = self.renderer.rewriter();

        let syntax = attach(
            &format!("syntax = \"{}\";\n", self.rules.target_syntax),
            &file.syntax_comments,
        );

        let package = if file.package.is_empty() {
            String::new()
        } else {
            attach(
                &format!("package {};\n", rewriter.rewrite_package(&file.package)),
                &file.package_comments,
            )
        };

        let imports: Vec<Import> = file
            .imports
            .iter()
            .filter(|import| !(self.rules.delete_validate && import.path == VALIDATE_IMPORT))
            .map(|import| Import {
                path: rewriter.rewrite_import_path(&import.path),
                kind: import.kind,
            })
            .collect();

        let mut definitions = Vec::new();
        for enumeration in &file.enums {
            definitions.push(attach(
                &self.renderer.render_enum(enumeration),
                &enumeration.comments,
            ));
        }
        for message in &file.messages {
            definitions.push(attach(
                &self.renderer.render_message(message)?,
                &message.comments,
            ));
        }
        for service in &file.services {
            definitions.push(attach(
                &self.renderer.render_service(service),
                &service.comments,
            ));
        }

        let mut context = Context::new();
        context.insert("syntax", &syntax);
        context.insert("package", &package);
        context.insert("imports", &imports);
        context.insert("cc_generic_services", &file.cc_generic_services);
        context.insert("definitions", &definitions);

        let content = self
            .tera
            .render(FILE_TEMPLATE, &context)
            .map_err(|e| ConvertError::Generation(format!("Template error: {:?}", e)))?;

        let name = rewriter.rewrite_import_path(&file.name);
        debug!(file = %file.name, output = %name, "translated file");

        Ok(Some(RenderedFile { name, content }))
    }
}
