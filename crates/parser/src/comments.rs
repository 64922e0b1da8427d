//! Comment lookup from `SourceCodeInfo`
//!
//! protoc records comments per source location, keyed by the path of field
//! numbers and indices leading from the `FileDescriptorProto` to the element
//! (e.g. `[4, 0, 2, 1]` is the second field of the first message).

use protoc_gen_proto23_common::CommentBundle;
use prost_types::SourceCodeInfo;
use std::collections::HashMap;

/// Comments of one file, addressed by descriptor path
#[derive(Debug, Default)]
pub(crate) struct CommentIndex {
    by_path: HashMap<Vec<i32>, CommentBundle>,
}

impl CommentIndex {
    pub(crate) fn from_source_info(info: Option<&SourceCodeInfo>) -> Self {
        let mut by_path = HashMap::new();

        let Some(info) = info else {
            return Self { by_path };
        };

        for location in &info.location {
            let bundle = CommentBundle {
                detached: location
                    .leading_detached_comments
                    .iter()
                    .map(|c| normalize_comment(c))
                    .filter(|c| !c.is_empty())
                    .collect(),
                leading: normalize_comment(location.leading_comments()),
                trailing: normalize_comment(location.trailing_comments()),
            };

            if bundle.is_empty() {
                continue;
            }

            // The declaration span comes first; later spans with the same path are sub-ranges
            by_path.entry(location.path.clone()).or_insert(bundle);
        }

        Self { by_path }
    }

    /// Comments for `path`, empty when the element has none
    pub(crate) fn get(&self, path: &[i32]) -> CommentBundle {
        self.by_path.get(path).cloned().unwrap_or_default()
    }
}

/// Strip the space protoc keeps after `//` on every line and trim the block
fn normalize_comment(raw: &str) -> String {
    raw.replace("\n ", "\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::source_code_info::Location;

    fn location(path: Vec<i32>, leading: &str, trailing: &str, detached: &[&str]) -> Location {
        Location {
            path,
            span: vec![0, 0, 0],
            leading_comments: (!leading.is_empty()).then(|| leading.to_string()),
            trailing_comments: (!trailing.is_empty()).then(|| trailing.to_string()),
            leading_detached_comments: detached.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_normalize_comment() {
        assert_eq!(normalize_comment(" Hello\n world\n"), "Hello\nworld");
        assert_eq!(normalize_comment("   \n"), "");
        assert_eq!(normalize_comment(""), "");
    }

    #[test]
    fn test_lookup_by_path() {
        let info = SourceCodeInfo {
            location: vec![
                location(vec![4, 0], " A message\n", "", &[" license\n"]),
                location(vec![4, 0, 2, 1], "", " inline\n", &[]),
            ],
        };

        let index = CommentIndex::from_source_info(Some(&info));

        let message = index.get(&[4, 0]);
        assert_eq!(message.leading, "A message");
        assert_eq!(message.detached, vec!["license".to_string()]);
        assert!(message.trailing.is_empty());

        assert_eq!(index.get(&[4, 0, 2, 1]).trailing, "inline");
        assert!(index.get(&[5, 0]).is_empty());
    }

    #[test]
    fn test_first_location_wins() {
        let info = SourceCodeInfo {
            location: vec![
                location(vec![6, 0], " declaration\n", "", &[]),
                location(vec![6, 0], " sub-span\n", "", &[]),
            ],
        };

        let index = CommentIndex::from_source_info(Some(&info));
        assert_eq!(index.get(&[6, 0]).leading, "declaration");
    }

    #[test]
    fn test_missing_source_info() {
        let index = CommentIndex::from_source_info(None);
        assert!(index.get(&[12]).is_empty());
    }
}
