//! Descriptor parsing for protoc-gen-proto23
//!
//! Turns a protoc `CodeGeneratorRequest` (or an offline `FileDescriptorSet`)
//! into the read-only schema tree from `protoc_gen_proto23_common`.
//!
//! ## Sources
//! - **Plugin mode**: the request protoc writes to the plugin's stdin
//! - **Offline mode**: a set written by `protoc --include_imports --include_source_info -o`
//!
//! ## Example
//! ```rust,ignore
//! use protoc_gen_proto23_parser::PluginRequest;
//!
//! let request = PluginRequest::decode(&stdin_bytes)?;
//! let files = request.parse()?;
//! ```

mod comments;
mod converter;
mod request;

pub use request::PluginRequest;
