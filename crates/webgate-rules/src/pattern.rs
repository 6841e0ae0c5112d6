//! # URL Patterns
//!
//! Servlet-style URL pattern matching for web resource rules.
//!
//! A [`UrlPattern`] is a single path pattern classified into one of four
//! kinds (exact, path-prefix, extension, default). A [`UrlPatternSpec`]
//! combines a primary pattern with an ordered list of exclusion patterns,
//! parsed from a colon-delimited spec string:
//!
//! ```text
//! URLPatternList ::= URLPattern (':' URLPattern)*
//! URLPatternSpec ::= '' | URLPattern | URLPattern ':' URLPatternList
//! ```
//!
//! Colons embedded in a pattern are carried in the spec string as the
//! escape sequence `%3A` and unescaped on parse.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};

/// Escape sequence for a literal colon inside a pattern token.
const ESCAPED_COLON: &str = "%3A";

/// The default pattern, which matches every path.
const DEFAULT_PATTERN: &str = "/";

/// Replace literal colons with their escaped form for spec-string rendering.
pub(crate) fn escape_colons(s: &str) -> String {
    s.replace(':', ESCAPED_COLON)
}

fn unescape_colons(s: &str) -> String {
    s.replace(ESCAPED_COLON, ":")
}

/// The four servlet pattern kinds, derived deterministically from the raw
/// pattern text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UrlPatternKind {
    /// Matches exactly one path, by string equality.
    Exact,
    /// Ends with `/*` and matches a path subtree.
    PathPrefix,
    /// Starts with `*.` and matches paths by file extension.
    Extension,
    /// The pattern `/`, which matches everything.
    Default,
}

/// A single URL pattern with its derived kind.
///
/// Classification is a pure function of the raw text, computed once at
/// construction:
/// - `"/"` is the default pattern;
/// - a pattern ending in `"/*"` is a path-prefix pattern;
/// - a pattern starting with `"*."` and containing no `/` is an extension
///   pattern;
/// - anything else (including the empty string) is an exact pattern.
///
/// # Example
///
/// ```
/// use webgate_rules::{UrlPattern, UrlPatternKind};
///
/// assert_eq!(UrlPattern::new("/images/*").kind(), UrlPatternKind::PathPrefix);
/// assert_eq!(UrlPattern::new("*.jsp").kind(), UrlPatternKind::Extension);
/// assert_eq!(UrlPattern::new("/").kind(), UrlPatternKind::Default);
/// assert_eq!(UrlPattern::new("/index.html").kind(), UrlPatternKind::Exact);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub struct UrlPattern {
    raw: String,
    kind: UrlPatternKind,
}

impl UrlPattern {
    /// Create a pattern from raw text, classifying it in the process.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let kind = if raw == DEFAULT_PATTERN {
            UrlPatternKind::Default
        } else if raw.ends_with("/*") {
            UrlPatternKind::PathPrefix
        } else if raw.starts_with("*.") && !raw.contains('/') {
            UrlPatternKind::Extension
        } else {
            UrlPatternKind::Exact
        };
        Self { raw, kind }
    }

    /// The default pattern `/`.
    pub fn default_pattern() -> Self {
        Self::new(DEFAULT_PATTERN)
    }

    /// Get the raw pattern text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Get the derived pattern kind.
    pub fn kind(&self) -> UrlPatternKind {
        self.kind
    }

    /// Check whether this pattern matches the candidate path.
    ///
    /// Matching follows the servlet rules and is case-sensitive throughout:
    /// - an exact pattern matches by string equality;
    /// - the path-prefix pattern `/*` matches every candidate;
    /// - any other path-prefix pattern matches its stem (the pattern minus
    ///   the trailing `/*`) and every candidate extending the stem at a
    ///   `/` boundary;
    /// - an extension pattern `*.ext` matches candidates ending in `.ext`;
    /// - the default pattern matches every candidate.
    ///
    /// The same predicate doubles as the pattern-to-pattern "matched by"
    /// relation when the candidate is another pattern's raw text.
    ///
    /// # Example
    ///
    /// ```
    /// use webgate_rules::UrlPattern;
    ///
    /// let prefix = UrlPattern::new("/foo/*");
    /// assert!(prefix.matches("/foo"));
    /// assert!(prefix.matches("/foo/bar"));
    /// assert!(!prefix.matches("/foobar"));
    /// ```
    pub fn matches(&self, candidate: &str) -> bool {
        match self.kind {
            UrlPatternKind::Exact => candidate == self.raw,
            UrlPatternKind::Default => true,
            UrlPatternKind::PathPrefix => {
                if self.raw == "/*" {
                    return true;
                }
                let stem = &self.raw[..self.raw.len() - 2];
                match candidate.strip_prefix(stem) {
                    Some(rest) => rest.is_empty() || rest.starts_with('/'),
                    None => false,
                }
            }
            // "*.ext" matches any candidate carrying the ".ext" suffix.
            UrlPatternKind::Extension => candidate.ends_with(&self.raw[1..]),
        }
    }
}

impl From<String> for UrlPattern {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<UrlPattern> for String {
    fn from(pattern: UrlPattern) -> Self {
        pattern.raw
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A primary URL pattern plus an ordered list of exclusion patterns.
///
/// The spec describes the set of paths matched by the primary pattern minus
/// the paths matched by any exclusion. Exclusions are validated against the
/// primary at construction; see [`UrlPatternSpec::parse`].
///
/// Equality is defined as mutual implication over the covered path sets,
/// not structural equality: two specs whose exclusion lists are phrased or
/// ordered differently compare equal when they cover the same paths.
///
/// # Example
///
/// ```
/// use webgate_rules::UrlPatternSpec;
///
/// let admin = UrlPatternSpec::parse("/admin/*:/admin/login").unwrap();
/// let login = UrlPatternSpec::parse("/admin/login").unwrap();
/// let console = UrlPatternSpec::parse("/admin/console").unwrap();
///
/// assert!(!admin.implies(&login)); // excluded
/// assert!(admin.implies(&console));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UrlPatternSpec {
    primary: UrlPattern,
    exclusions: Vec<UrlPattern>,
}

impl UrlPatternSpec {
    /// Parse a colon-delimited pattern spec string.
    ///
    /// The first token is the primary pattern; remaining tokens are
    /// exclusions. An empty spec string is translated to the default
    /// pattern `/`. Each token is unescaped (`%3A` becomes `:`) before
    /// classification.
    ///
    /// Validation rules, all yielding `RuleError::MalformedPatternSpec`:
    /// - no exclusion may repeat the primary or another exclusion;
    /// - no exclusion may match the primary pattern's own text: such a
    ///   spec would exclude every path it covers and could not even imply
    ///   itself;
    /// - an exact primary admits no exclusions at all;
    /// - under a path-prefix primary, each exclusion must be an exact
    ///   pattern matched by the primary, or a path-prefix pattern matched
    ///   by (but different from) the primary;
    /// - under an extension primary, each exclusion must be an exact
    ///   pattern matched by the primary, or any path-prefix pattern;
    /// - under the default primary, any pattern except `/` itself may be
    ///   excluded.
    pub fn parse(spec: &str) -> RuleResult<Self> {
        if spec.is_empty() {
            return Ok(Self {
                primary: UrlPattern::default_pattern(),
                exclusions: Vec::new(),
            });
        }

        let mut tokens = spec.split(':').map(unescape_colons);
        // split always yields at least one token
        let primary = UrlPattern::new(tokens.next().unwrap_or_default());

        let mut exclusions: Vec<UrlPattern> = Vec::new();
        for token in tokens {
            let exclusion = UrlPattern::new(token);
            if exclusions.iter().any(|e| e.as_str() == exclusion.as_str()) {
                return Err(RuleError::MalformedPatternSpec(format!(
                    "duplicate exclusion pattern {:?}",
                    exclusion.as_str()
                )));
            }
            validate_exclusion(&primary, &exclusion)?;
            exclusions.push(exclusion);
        }

        Ok(Self {
            primary,
            exclusions,
        })
    }

    /// Get the primary pattern.
    pub fn primary(&self) -> &UrlPattern {
        &self.primary
    }

    /// Get the exclusion patterns in declaration order.
    pub fn exclusions(&self) -> &[UrlPattern] {
        &self.exclusions
    }

    /// Check whether every path covered by `other` is also covered by this
    /// spec.
    ///
    /// This holds when:
    /// 1. the primary pattern matches `other`'s primary pattern,
    /// 2. no exclusion of this spec matches `other`'s primary pattern, and
    /// 3. if the two primaries are string-equal, every exclusion of this
    ///    spec is matched by some exclusion of `other`.
    ///
    /// When `other`'s primary is strictly narrower than this spec's
    /// primary (case 3 does not apply), `other`'s exclusions are
    /// irrelevant: they only shrink an already-covered set.
    pub fn implies(&self, other: &UrlPatternSpec) -> bool {
        if !self.primary.matches(other.primary.as_str()) {
            return false;
        }

        if self
            .exclusions
            .iter()
            .any(|e| e.matches(other.primary.as_str()))
        {
            return false;
        }

        if self.primary.as_str() == other.primary.as_str() {
            return self.exclusions.iter().all(|mine| {
                other
                    .exclusions
                    .iter()
                    .any(|theirs| theirs.matches(mine.as_str()))
            });
        }

        true
    }

    /// Render the spec string with exclusions in declaration order,
    /// re-escaping embedded colons.
    ///
    /// Parsing the result reproduces this spec exactly.
    pub fn to_spec_string(&self) -> String {
        let mut out = escape_colons(self.primary.as_str());
        for exclusion in &self.exclusions {
            out.push(':');
            out.push_str(&escape_colons(exclusion.as_str()));
        }
        out
    }

    /// Render the spec in a form shared by every spec it compares equal to.
    ///
    /// Feeds the rule hash, so equal rules must produce identical output
    /// however their spec strings were phrased:
    /// - a spec whose primary is `/` or `/*` renders as `/`: both primaries
    ///   match every path, and implication skips exclusion coverage whenever
    ///   the primaries differ as strings, so all such specs fall into one
    ///   equality class;
    /// - an exclusion matched by another exclusion is dropped, since adding
    ///   it removes no path the broader exclusion had not already removed;
    /// - the surviving exclusions are sorted, erasing declaration order.
    pub(crate) fn normalized_spec_string(&self) -> String {
        if self.primary.kind() == UrlPatternKind::Default || self.primary.as_str() == "/*" {
            return DEFAULT_PATTERN.to_string();
        }

        let mut kept: Vec<&str> = self
            .exclusions
            .iter()
            .filter(|e| {
                !self
                    .exclusions
                    .iter()
                    .any(|f| f.as_str() != e.as_str() && f.matches(e.as_str()))
            })
            .map(|e| e.as_str())
            .collect();
        kept.sort_unstable();

        let mut out = escape_colons(self.primary.as_str());
        for exclusion in kept {
            out.push(':');
            out.push_str(&escape_colons(exclusion));
        }
        out
    }
}

/// Equality is mutual implication: both specs cover the same path set.
impl PartialEq for UrlPatternSpec {
    fn eq(&self, other: &Self) -> bool {
        self.implies(other) && other.implies(self)
    }
}

impl Eq for UrlPatternSpec {}

impl TryFrom<String> for UrlPatternSpec {
    type Error = RuleError;

    fn try_from(spec: String) -> RuleResult<Self> {
        Self::parse(&spec)
    }
}

impl From<UrlPatternSpec> for String {
    fn from(spec: UrlPatternSpec) -> Self {
        spec.to_spec_string()
    }
}

impl fmt::Display for UrlPatternSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_spec_string())
    }
}

/// Validate one exclusion against the primary pattern.
fn validate_exclusion(primary: &UrlPattern, exclusion: &UrlPattern) -> RuleResult<()> {
    if exclusion.as_str() == primary.as_str() {
        return Err(RuleError::MalformedPatternSpec(format!(
            "exclusion {:?} repeats the primary pattern",
            exclusion.as_str()
        )));
    }

    // An exclusion matching the primary's own text excludes every path the
    // spec covers; such a spec cannot imply anything, itself included.
    if exclusion.matches(primary.as_str()) {
        return Err(RuleError::MalformedPatternSpec(format!(
            "exclusion {:?} matches the primary pattern {:?}",
            exclusion.as_str(),
            primary.as_str()
        )));
    }

    let accepted = match primary.kind() {
        UrlPatternKind::Exact => {
            return Err(RuleError::MalformedPatternSpec(format!(
                "exact primary pattern {:?} admits no exclusions",
                primary.as_str()
            )));
        }
        UrlPatternKind::PathPrefix => match exclusion.kind() {
            UrlPatternKind::Exact | UrlPatternKind::PathPrefix => {
                primary.matches(exclusion.as_str())
            }
            _ => false,
        },
        UrlPatternKind::Extension => match exclusion.kind() {
            UrlPatternKind::Exact => primary.matches(exclusion.as_str()),
            UrlPatternKind::PathPrefix => true,
            _ => false,
        },
        // The default primary accepts any exclusion; "/" itself was
        // rejected above as a repeat of the primary.
        UrlPatternKind::Default => true,
    };

    if accepted {
        Ok(())
    } else {
        Err(RuleError::MalformedPatternSpec(format!(
            "exclusion {:?} is not matched by the primary pattern {:?}",
            exclusion.as_str(),
            primary.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_classification() {
        assert_eq!(UrlPattern::new("/").kind(), UrlPatternKind::Default);
        assert_eq!(UrlPattern::new("/*").kind(), UrlPatternKind::PathPrefix);
        assert_eq!(
            UrlPattern::new("/catalog/*").kind(),
            UrlPatternKind::PathPrefix
        );
        assert_eq!(UrlPattern::new("*.jsp").kind(), UrlPatternKind::Extension);
        assert_eq!(UrlPattern::new("/index.html").kind(), UrlPatternKind::Exact);
        // The empty string is an exact pattern.
        assert_eq!(UrlPattern::new("").kind(), UrlPatternKind::Exact);
        // A "*." pattern containing a slash is not an extension pattern.
        assert_eq!(UrlPattern::new("*.a/b").kind(), UrlPatternKind::Exact);
    }

    #[test]
    fn test_exact_matching() {
        let pattern = UrlPattern::new("/index.html");
        assert!(pattern.matches("/index.html"));
        assert!(!pattern.matches("/index.htm"));
        assert!(!pattern.matches("/Index.html"));
    }

    #[test]
    fn test_universal_prefix_matching() {
        let pattern = UrlPattern::new("/*");
        assert!(pattern.matches("/a/b"));
        assert!(pattern.matches(""));
        assert!(pattern.matches("/"));
        assert!(pattern.matches("no-leading-slash"));
    }

    #[test]
    fn test_path_prefix_matching() {
        let pattern = UrlPattern::new("/foo/*");
        assert!(pattern.matches("/foo"));
        assert!(pattern.matches("/foo/bar"));
        assert!(pattern.matches("/foo/bar/baz"));
        assert!(!pattern.matches("/foobar"));
        assert!(!pattern.matches("/fo"));
    }

    #[test]
    fn test_extension_matching() {
        let pattern = UrlPattern::new("*.jsp");
        assert!(pattern.matches("/a/b.jsp"));
        assert!(pattern.matches("*.jsp"));
        assert!(!pattern.matches("/a/b.jspx"));
        assert!(!pattern.matches("/a/jsp"));
        assert!(!pattern.matches("/a/b.JSP"));
    }

    #[test]
    fn test_default_matching() {
        let pattern = UrlPattern::new("/");
        assert!(pattern.matches("/anything"));
        assert!(pattern.matches(""));
        assert!(pattern.matches("*.jsp"));
    }

    #[test]
    fn test_spec_empty_string_is_default() {
        let spec = UrlPatternSpec::parse("").unwrap();
        assert_eq!(spec.primary().as_str(), "/");
        assert_eq!(spec.primary().kind(), UrlPatternKind::Default);
        assert!(spec.exclusions().is_empty());
    }

    #[test]
    fn test_spec_parsing_with_exclusions() {
        let spec = UrlPatternSpec::parse("/catalog/*:/catalog/offers:/catalog/admin/*").unwrap();
        assert_eq!(spec.primary().as_str(), "/catalog/*");
        assert_eq!(spec.exclusions().len(), 2);
        assert_eq!(spec.exclusions()[0].as_str(), "/catalog/offers");
        assert_eq!(spec.exclusions()[1].as_str(), "/catalog/admin/*");
    }

    #[test]
    fn test_spec_colon_escaping_round_trip() {
        // "%3A" in the spec string is a literal colon in the pattern text.
        let spec = UrlPatternSpec::parse("/a%3Ab/*:/a%3Ab/c").unwrap();
        assert_eq!(spec.primary().as_str(), "/a:b/*");
        assert_eq!(spec.exclusions()[0].as_str(), "/a:b/c");
        assert_eq!(spec.to_spec_string(), "/a%3Ab/*:/a%3Ab/c");
    }

    #[test]
    fn test_spec_rejects_exact_primary_with_exclusions() {
        let err = UrlPatternSpec::parse("/admin:/admin/login").unwrap_err();
        assert!(matches!(err, RuleError::MalformedPatternSpec(_)));
    }

    #[test]
    fn test_spec_rejects_unmatched_exclusion() {
        let err = UrlPatternSpec::parse("/x/*:/y").unwrap_err();
        assert!(matches!(err, RuleError::MalformedPatternSpec(_)));
    }

    #[test]
    fn test_spec_rejects_exclusion_equal_to_primary() {
        let err = UrlPatternSpec::parse("/x/*:/x/*").unwrap_err();
        assert!(matches!(err, RuleError::MalformedPatternSpec(_)));
    }

    #[test]
    fn test_spec_rejects_duplicate_exclusions() {
        let err = UrlPatternSpec::parse("/x/*:/x/a:/x/a").unwrap_err();
        assert!(matches!(err, RuleError::MalformedPatternSpec(_)));
    }

    #[test]
    fn test_spec_rejects_extension_exclusion_under_path_prefix() {
        let err = UrlPatternSpec::parse("/x/*:*.jsp").unwrap_err();
        assert!(matches!(err, RuleError::MalformedPatternSpec(_)));
    }

    #[test]
    fn test_spec_extension_primary_exclusions() {
        // An exact pattern matched by the extension primary is accepted,
        // and so is any path-prefix pattern.
        let spec = UrlPatternSpec::parse("*.jsp:/private/index.jsp:/private/*").unwrap();
        assert_eq!(spec.exclusions().len(), 2);

        // An exact pattern without the extension suffix is not matched.
        assert!(UrlPatternSpec::parse("*.jsp:/private/index.html").is_err());
        // Another extension pattern is never a valid exclusion.
        assert!(UrlPatternSpec::parse("*.jsp:*.jspx").is_err());
    }

    #[test]
    fn test_spec_default_primary_exclusions() {
        let spec = UrlPatternSpec::parse("/:/secret:*.bak:/tmp/*").unwrap();
        assert_eq!(spec.exclusions().len(), 3);

        // The default pattern cannot exclude itself.
        assert!(UrlPatternSpec::parse("/:/").is_err());
    }

    #[test]
    fn test_spec_rejects_exclusion_covering_primary() {
        // "/*" matches every path, the primaries "/" and "*.jsp" included;
        // either spec would exclude everything it covers.
        assert!(matches!(
            UrlPatternSpec::parse("/:/*").unwrap_err(),
            RuleError::MalformedPatternSpec(_)
        ));
        assert!(matches!(
            UrlPatternSpec::parse("*.jsp:/*").unwrap_err(),
            RuleError::MalformedPatternSpec(_)
        ));

        // Ordinary carve-outs are unaffected.
        assert!(UrlPatternSpec::parse("/catalog/*:/catalog/admin/*").is_ok());
        assert!(UrlPatternSpec::parse("/:/tmp/*").is_ok());
    }

    #[test]
    fn test_spec_implies_itself() {
        for spec in ["", "/", "/*", "/index.html", "/a/*:/a/b", "*.jsp:/private/*", "/:/secret"] {
            let parsed = UrlPatternSpec::parse(spec).unwrap();
            assert!(parsed.implies(&parsed), "spec {spec:?} must imply itself");
        }
    }

    #[test]
    fn test_spec_implies_narrower_primary() {
        let broad = UrlPatternSpec::parse("/catalog/*").unwrap();
        let narrow = UrlPatternSpec::parse("/catalog/shoes").unwrap();
        assert!(broad.implies(&narrow));
        assert!(!narrow.implies(&broad));
    }

    #[test]
    fn test_spec_implies_blocked_by_exclusion() {
        let spec = UrlPatternSpec::parse("/catalog/*:/catalog/admin/*").unwrap();
        let admin = UrlPatternSpec::parse("/catalog/admin/users").unwrap();
        let shoes = UrlPatternSpec::parse("/catalog/shoes").unwrap();
        assert!(!spec.implies(&admin));
        assert!(spec.implies(&shoes));
    }

    #[test]
    fn test_spec_implies_same_primary_exclusion_coverage() {
        let fewer = UrlPatternSpec::parse("/catalog/*:/catalog/admin/*").unwrap();
        let more = UrlPatternSpec::parse("/catalog/*:/catalog/admin/*:/catalog/offers").unwrap();

        // The spec excluding more covers fewer paths, so it is implied.
        assert!(fewer.implies(&more));
        // The reverse fails: "/catalog/offers" is not excluded by `fewer`,
        // so `more` would have to cover it and does not.
        assert!(!more.implies(&fewer));
    }

    #[test]
    fn test_spec_implies_narrower_primary_ignores_exclusions() {
        let broad = UrlPatternSpec::parse("/catalog/*").unwrap();
        let narrow = UrlPatternSpec::parse("/catalog/sub/*:/catalog/sub/secret").unwrap();
        assert!(broad.implies(&narrow));
    }

    #[test]
    fn test_spec_equality_is_mutual_implication() {
        let a = UrlPatternSpec::parse("/catalog/*:/catalog/offers:/catalog/admin/*").unwrap();
        let b = UrlPatternSpec::parse("/catalog/*:/catalog/admin/*:/catalog/offers").unwrap();
        assert_eq!(a, b);
        // Round-trip rendering still preserves declaration order.
        assert_ne!(a.to_spec_string(), b.to_spec_string());
        assert_eq!(a.normalized_spec_string(), b.normalized_spec_string());
    }

    #[test]
    fn test_normalized_spec_identifies_equivalent_forms() {
        // "/" and "/*" cover the same paths and compare equal.
        let default = UrlPatternSpec::parse("/").unwrap();
        let universal = UrlPatternSpec::parse("/*").unwrap();
        assert_eq!(default, universal);
        assert_eq!(
            default.normalized_spec_string(),
            universal.normalized_spec_string()
        );

        // An exclusion already swallowed by a broader one changes nothing.
        let broad = UrlPatternSpec::parse("*.jsp:/private/*").unwrap();
        let padded = UrlPatternSpec::parse("*.jsp:/private/*:/private/index.jsp").unwrap();
        assert_eq!(broad, padded);
        assert_eq!(
            broad.normalized_spec_string(),
            padded.normalized_spec_string()
        );
    }

    #[test]
    fn test_spec_round_trip() {
        let spec = UrlPatternSpec::parse("/catalog/*:/catalog/offers:/catalog/admin/*").unwrap();
        let reparsed = UrlPatternSpec::parse(&spec.to_spec_string()).unwrap();
        assert_eq!(spec.to_spec_string(), reparsed.to_spec_string());
    }
}
