//! Rewrite-rule configuration loaded from YAML
//!
//! The plugin parameter names a YAML file of the form:
//!
//! ```yaml
//! PackageReplace:
//!   a.b: x.y
//! ImportReplace:
//!   a/b/: x/y/
//! DeleteValidate: true
//! TargetSyntax: proto2
//! ```
//!
//! Mapping order is significant: rules are tried in the order they appear in
//! the document and the first matching prefix wins.

use crate::{ConvertError, Result, Syntax};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Package and import rewriting rules plus the target dialect
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RewriteRules {
    /// Package prefix -> replacement, in declaration order
    #[serde(
        rename = "PackageReplace",
        default,
        deserialize_with = "null_as_default"
    )]
    pub package_replace: IndexMap<String, String>,

    /// Import path prefix -> replacement, in declaration order
    #[serde(
        rename = "ImportReplace",
        default,
        deserialize_with = "null_as_default"
    )]
    pub import_replace: IndexMap<String, String>,

    /// Drop `import "validate/validate.proto";` lines
    #[serde(
        rename = "DeleteValidate",
        default,
        deserialize_with = "null_as_default"
    )]
    pub delete_validate: bool,

    /// Dialect of the generated files
    #[serde(rename = "TargetSyntax", default, deserialize_with = "null_as_default")]
    pub target_syntax: Syntax,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RewriteRules {
    /// Load rules from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!(
                "Failed to read rewrite rules {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml_str(&content).map_err(|e| match e {
            ConvertError::Config(msg) => {
                ConvertError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Parse and validate rules from YAML text
    ///
    /// # Examples
    /// ```
    /// use protoc_gen_proto23_common::{RewriteRules, Syntax};
    ///
    /// let rules = RewriteRules::from_yaml_str("TargetSyntax: proto3").unwrap();
    /// assert_eq!(rules.target_syntax, Syntax::Proto3);
    /// assert!(rules.package_replace.is_empty());
    /// ```
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document means "no rewriting, proto2 output"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let rules: Self = serde_yaml::from_str(content).map_err(|e| {
            ConvertError::Config(format!("Failed to parse rewrite rules YAML: {}", e))
        })?;
        rules.validate()?;

        Ok(rules)
    }

    /// Check that the rules describe a translation this tool can perform
    pub fn validate(&self) -> Result<()> {
        match self.target_syntax {
            Syntax::Proto2 | Syntax::Proto3 => Ok(()),
            other => Err(ConvertError::Config(format!(
                "TargetSyntax must be \"proto2\" or \"proto3\", got \"{}\"",
                other
            ))),
        }
    }
}
