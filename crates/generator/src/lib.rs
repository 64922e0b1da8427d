//! `.proto` source generation for protoc-gen-proto23
//!
//! This crate re-renders the schema tree produced by the parser as textual
//! `.proto` files in the configured target dialect, applying the package and
//! import rewrite rules on the way:
//! - `rewriter`: first-match prefix substitution
//! - `type_mapper`: label / scalar type tokens per dialect
//! - `comments`: comment reattachment and indentation
//! - `renderer`: messages, enums, services, methods
//! - `file`: whole-file layout (tera template)

mod comments;
mod file;
mod renderer;
mod rewriter;
mod templates;
mod type_mapper;

pub use comments::{attach, indent};
pub use file::{FileTranslator, RenderedFile, VALIDATE_IMPORT};
pub use renderer::DescriptorRenderer;
pub use rewriter::Rewriter;
pub use type_mapper::TypeMapper;

use prost_types::compiler::{code_generator_response, CodeGeneratorResponse};
use protoc_gen_proto23_common::{Result, RewriteRules, SchemaFile};
use tracing::{debug, info};

/// Files produced by one translation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOutput {
    pub files: Vec<RenderedFile>,
    /// `CodeGeneratorResponse.supported_features` bitmask
    pub supported_features: u64,
}

impl TranslationOutput {
    /// Build the protoc plugin response
    pub fn into_response(self) -> CodeGeneratorResponse {
        CodeGeneratorResponse {
            supported_features: Some(self.supported_features),
            file: self
                .files
                .into_iter()
                .map(|f| code_generator_response::File {
                    name: Some(f.name),
                    content: Some(f.content),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }
}

/// Translation driver
///
/// Translates every file flagged for generation, in request order. Any
/// error aborts the whole run so no partial file set is ever produced.
pub struct ProtoTranslator<'a> {
    translator: FileTranslator<'a>,
}

impl<'a> ProtoTranslator<'a> {
    /// Create a new translator over an immutable rule set
    pub fn new(rules: &'a RewriteRules) -> Result<Self> {
        Ok(Self {
            translator: FileTranslator::new(rules)?,
        })
    }

    pub fn run(&self, files: &[SchemaFile]) -> Result<TranslationOutput> {
        let mut rendered = Vec::new();

        for file in files.iter().filter(|f| f.generate) {
            match self.translator.translate(file)? {
                Some(output) => rendered.push(output),
                None => debug!(file = %file.name, "no output for file"),
            }
        }

        info!(
            requested = files.iter().filter(|f| f.generate).count(),
            generated = rendered.len(),
            "translation finished"
        );

        Ok(TranslationOutput {
            files: rendered,
            supported_features: code_generator_response::Feature::Proto3Optional as u64,
        })
    }
}

/// Translate a parsed file set (convenience function)
pub fn translate_files(files: &[SchemaFile], rules: &RewriteRules) -> Result<TranslationOutput> {
    ProtoTranslator::new(rules)?.run(files)
}
