//! Prefix-based package and import path rewriting

use indexmap::IndexMap;
use protoc_gen_proto23_common::RewriteRules;
use tracing::trace;

/// Applies the configured `PackageReplace` / `ImportReplace` rules
///
/// Rules are tried in declaration order and the first matching prefix wins,
/// even when a later rule would match a longer prefix.
#[derive(Debug, Clone, Copy)]
pub struct Rewriter<'a> {
    rules: &'a RewriteRules,
}

impl<'a> Rewriter<'a> {
    pub fn new(rules: &'a RewriteRules) -> Self {
        Self { rules }
    }

    /// Rewrite a package name or a package-qualified type name
    ///
    /// A leading `.` (fully-qualified marker) is kept and ignored for matching.
    ///
    /// # Examples
    /// ```
    /// use protoc_gen_proto23_common::RewriteRules;
    /// use protoc_gen_proto23_generator::Rewriter;
    ///
    /// let mut rules = RewriteRules::default();
    /// rules.package_replace.insert("foo".to_string(), "baz".to_string());
    ///
    /// let rewriter = Rewriter::new(&rules);
    /// assert_eq!(rewriter.rewrite_package(".foo.bar"), ".baz.bar");
    /// assert_eq!(rewriter.rewrite_package("other.bar"), "other.bar");
    /// ```
    pub fn rewrite_package(&self, name: &str) -> String {
        let (marker, bare) = match name.strip_prefix('.') {
            Some(rest) => (".", rest),
            None => ("", name),
        };

        match replace_prefix(&self.rules.package_replace, bare) {
            Some(rewritten) => {
                trace!(from = name, to = %rewritten, "rewrote package");
                format!("{}{}", marker, rewritten)
            }
            None => name.to_string(),
        }
    }

    /// Rewrite an import path (or output file path)
    pub fn rewrite_import_path(&self, path: &str) -> String {
        match replace_prefix(&self.rules.import_replace, path) {
            Some(rewritten) => {
                trace!(from = path, to = %rewritten, "rewrote import path");
                rewritten
            }
            None => path.to_string(),
        }
    }
}

/// Replace the first rule prefix that `value` starts with
fn replace_prefix(rules: &IndexMap<String, String>, value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    rules.iter().find_map(|(prefix, replacement)| {
        value
            .strip_prefix(prefix.as_str())
            .map(|rest| format!("{}{}", replacement, rest))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(package: &[(&str, &str)], import: &[(&str, &str)]) -> RewriteRules {
        RewriteRules {
            package_replace: package
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            import_replace: import
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input() {
        let rules = rules(&[("", "x")], &[("", "y/")]);
        let rewriter = Rewriter::new(&rules);

        assert_eq!(rewriter.rewrite_package(""), "");
        assert_eq!(rewriter.rewrite_import_path(""), "");
    }

    #[test]
    fn test_no_match_is_identity() {
        let rules = rules(&[("com.acme", "org.acme")], &[("acme/", "vendor/acme/")]);
        let rewriter = Rewriter::new(&rules);

        assert_eq!(rewriter.rewrite_package("net.example.v1"), "net.example.v1");
        assert_eq!(rewriter.rewrite_package(".net.example.Msg"), ".net.example.Msg");
        assert_eq!(rewriter.rewrite_import_path("other/x.proto"), "other/x.proto");
    }

    #[test]
    fn test_first_match_wins() {
        let ordered = rules(&[("a.b", "X"), ("a", "Y")], &[]);
        assert_eq!(Rewriter::new(&ordered).rewrite_package("a.b.c"), "X.c");

        let reversed = rules(&[("a", "Y"), ("a.b", "X")], &[]);
        assert_eq!(Rewriter::new(&reversed).rewrite_package("a.b.c"), "Y.b.c");
    }

    #[test]
    fn test_leading_dot_preserved() {
        let rules = rules(&[("foo", "baz")], &[]);
        let rewriter = Rewriter::new(&rules);

        assert_eq!(rewriter.rewrite_package(".foo.bar"), ".baz.bar");
        assert_eq!(rewriter.rewrite_package("foo.bar"), "baz.bar");
    }

    #[test]
    fn test_only_prefix_is_replaced() {
        let rules = rules(&[("a", "z")], &[("a/", "b/")]);
        let rewriter = Rewriter::new(&rules);

        assert_eq!(rewriter.rewrite_package("a.a.a"), "z.a.a");
        assert_eq!(rewriter.rewrite_import_path("a/a/x.proto"), "b/a/x.proto");
    }

    #[test]
    fn test_package_and_import_rules_are_separate() {
        let rules = rules(&[("a.b", "x.y")], &[]);
        let rewriter = Rewriter::new(&rules);

        assert_eq!(rewriter.rewrite_import_path("a.b/foo.proto"), "a.b/foo.proto");
    }
}
