//! Plugin request decoding

use protoc_gen_proto23_common::{ConvertError, Result, SchemaFile};
use prost::Message;
use prost_reflect::DescriptorPool;
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// `CodeGeneratorRequest` with `proto_file` kept as raw bytes
///
/// Decoding through prost-types loses extension fields on options, so the
/// reflection pool is built from these bytes instead.
#[derive(Clone, PartialEq, ::prost::Message)]
struct RawCodeGeneratorRequest {
    #[prost(bytes, repeated, tag = "15")]
    pub proto_file: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct RawFileDescriptorSet {
    #[prost(bytes, repeated, tag = "1")]
    pub file: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

/// Decoded plugin request
///
/// Holds every file reachable from the request (in the order protoc sent
/// them), the names of the files requested for generation, and a reflection
/// pool over the same files.
pub struct PluginRequest {
    files: Vec<FileDescriptorProto>,
    files_to_generate: Vec<String>,
    parameter: Option<String>,
    pool: DescriptorPool,
}

impl PluginRequest {
    /// Decode a `CodeGeneratorRequest` as written by protoc to a plugin's stdin
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let request = CodeGeneratorRequest::decode(bytes).map_err(|e| {
            ConvertError::Parse(format!("Failed to decode CodeGeneratorRequest: {}", e))
        })?;

        let raw = RawCodeGeneratorRequest::decode(bytes).map_err(|e| {
            ConvertError::Parse(format!("Failed to decode CodeGeneratorRequest: {}", e))
        })?;
        let set = RawFileDescriptorSet {
            file: raw.proto_file,
        }
        .encode_to_vec();
        let pool = build_pool(&set)?;

        debug!(
            files = request.proto_file.len(),
            to_generate = request.file_to_generate.len(),
            "decoded plugin request"
        );

        Ok(Self {
            files: request.proto_file,
            files_to_generate: request.file_to_generate,
            parameter: request.parameter,
            pool,
        })
    }

    /// Load a `FileDescriptorSet` from a binary file
    ///
    /// # Example
    /// ```rust,ignore
    /// // protoc --include_imports --include_source_info -o schema.pb foo.proto
    /// let request = PluginRequest::from_descriptor_set_file("schema.pb", &[])?;
    /// ```
    pub fn from_descriptor_set_file<P: AsRef<Path>>(path: P, files: &[String]) -> Result<Self> {
        let bytes = fs::read(path.as_ref()).map_err(|e| {
            ConvertError::Parse(format!(
                "Failed to read FileDescriptorSet file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_descriptor_set(&bytes, files)
    }

    /// Build a request from an encoded `FileDescriptorSet`
    ///
    /// `files` selects the files to generate; an empty slice selects every
    /// file in the set.
    pub fn from_descriptor_set(bytes: &[u8], files: &[String]) -> Result<Self> {
        let set = FileDescriptorSet::decode(bytes).map_err(|e| {
            ConvertError::Parse(format!("Failed to decode FileDescriptorSet: {}", e))
        })?;
        let pool = build_pool(bytes)?;

        let files_to_generate = if files.is_empty() {
            set.file.iter().map(|f| f.name().to_string()).collect()
        } else {
            let known: HashSet<&str> = set.file.iter().map(|f| f.name()).collect();
            if let Some(missing) = files.iter().find(|f| !known.contains(f.as_str())) {
                return Err(ConvertError::Parse(format!(
                    "File {} is not part of the descriptor set",
                    missing
                )));
            }
            files.to_vec()
        };

        Ok(Self {
            files: set.file,
            files_to_generate,
            parameter: None,
            pool,
        })
    }

    /// Plugin parameter (`--proto23_out=<parameter>:<dir>`)
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// Names of the files requested for generation
    pub fn files_to_generate(&self) -> &[String] {
        &self.files_to_generate
    }

    /// Get reference to the underlying descriptor pool
    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Convert every file of the request into the schema tree
    ///
    /// Files keep the request order; `generate` is set on the ones protoc
    /// asked to generate.
    pub fn parse(&self) -> Result<Vec<SchemaFile>> {
        let targets: HashSet<&str> = self.files_to_generate.iter().map(String::as_str).collect();

        self.files
            .iter()
            .map(|file| {
                super::converter::convert_file(file, &self.pool, targets.contains(file.name()))
            })
            .collect()
    }
}

fn build_pool(file_descriptor_set: &[u8]) -> Result<DescriptorPool> {
    DescriptorPool::decode(file_descriptor_set)
        .map_err(|e| ConvertError::Parse(format!("Failed to create DescriptorPool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_request() {
        let request = CodeGeneratorRequest::default();
        let bytes = request.encode_to_vec();

        let decoded = PluginRequest::decode(&bytes).unwrap();
        assert!(decoded.parameter().is_none());
        assert!(decoded.files_to_generate().is_empty());
        assert!(decoded.parse().unwrap().is_empty());
    }

    #[test]
    fn test_decode_garbage() {
        let result = PluginRequest::decode(&[0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(ConvertError::Parse(_))));
    }

    #[test]
    fn test_unknown_file_selection() {
        let set = FileDescriptorSet { file: vec![] };
        let bytes = set.encode_to_vec();

        let result = PluginRequest::from_descriptor_set(&bytes, &["nope.proto".to_string()]);
        assert!(matches!(result, Err(ConvertError::Parse(_))));
    }
}
