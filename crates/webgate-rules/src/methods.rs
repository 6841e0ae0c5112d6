//! # HTTP Method Specs
//!
//! The HTTP method facet of a web resource rule.
//!
//! An actions substring is either empty (all methods), a comma-separated
//! inclusion list, or a `!`-prefixed exception list:
//!
//! ```text
//! HTTPMethod     ::= 'GET'|'POST'|'PUT'|'DELETE'|'HEAD'|'OPTIONS'|'TRACE'|ExtensionToken
//! HTTPMethodList ::= HTTPMethod (',' HTTPMethod)*
//! HTTPMethodSpec ::= '' | '!' HTTPMethodList | HTTPMethodList
//! ```
//!
//! Parsing deduplicates tokens and collapses an inclusion list naming all
//! seven predefined methods to the "all methods" form. Rendering is
//! canonical: predefined methods first in their fixed order, then
//! extension tokens in ascending code-point order.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};

/// The seven predefined HTTP methods.
///
/// Declaration order is the canonical rendering order, and `Ord` follows
/// it: GET, POST, PUT, DELETE, HEAD, OPTIONS, TRACE.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    /// Get the wire representation of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Parse a predefined method from its exact textual form.
    ///
    /// Method tokens are case-sensitive: `"get"` is not a predefined
    /// method (it is a legal extension token).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "HEAD" => Some(HttpMethod::Head),
            "OPTIONS" => Some(HttpMethod::Options),
            "TRACE" => Some(HttpMethod::Trace),
            _ => None,
        }
    }

    /// Get all predefined methods, in canonical order.
    pub fn all() -> [Self; 7] {
        [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Head,
            HttpMethod::Options,
            HttpMethod::Trace,
        ]
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RFC 2616 token character check: any CHAR except CTLs and separators.
fn is_token_char(c: char) -> bool {
    c.is_ascii()
        && !c.is_ascii_control()
        && !matches!(
            c,
            '(' | ')'
                | '<'
                | '>'
                | '@'
                | ','
                | ';'
                | ':'
                | '\\'
                | '"'
                | '/'
                | '['
                | ']'
                | '?'
                | '='
                | '{'
                | '}'
                | ' '
        )
}

/// A single method token: one of the predefined methods, or a free-form
/// extension token.
///
/// The derived total order places every predefined method before every
/// extension token, predefined methods in canonical order and extension
/// tokens in ascending code-point order — so a `BTreeSet<MethodToken>`
/// iterates in exactly the canonical rendering order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum MethodToken {
    /// One of the seven predefined methods.
    Predefined(HttpMethod),
    /// A case-sensitive extension token per RFC 2616.
    Extension(String),
}

impl MethodToken {
    /// Parse a method token, classifying predefined methods by exact
    /// (case-sensitive) comparison and validating extension tokens
    /// against the RFC 2616 token syntax.
    pub fn parse(s: &str) -> RuleResult<Self> {
        if let Some(method) = HttpMethod::parse(s) {
            return Ok(MethodToken::Predefined(method));
        }
        if s.is_empty() || !s.chars().all(is_token_char) {
            return Err(RuleError::InvalidMethodToken(s.to_string()));
        }
        Ok(MethodToken::Extension(s.to_string()))
    }

    /// Get the textual form of the token.
    pub fn as_str(&self) -> &str {
        match self {
            MethodToken::Predefined(method) => method.as_str(),
            MethodToken::Extension(token) => token,
        }
    }
}

impl TryFrom<String> for MethodToken {
    type Error = RuleError;

    fn try_from(s: String) -> RuleResult<Self> {
        Self::parse(&s)
    }
}

impl From<MethodToken> for String {
    fn from(token: MethodToken) -> Self {
        token.as_str().to_string()
    }
}

impl fmt::Display for MethodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The HTTP method facet of a rule: all methods, an inclusion set, or an
/// exception set.
///
/// Invariants, established at construction:
/// - an `Include` or `Exclude` set is never empty;
/// - an `Include` set never equals the full predefined method set (that
///   form normalizes to `All`).
///
/// # Example
///
/// ```
/// use webgate_rules::MethodSpec;
///
/// let spec = MethodSpec::parse("POST,GET,POST").unwrap();
/// assert_eq!(spec.actions().as_deref(), Some("GET,POST"));
///
/// let except = MethodSpec::parse("!PUT,POST").unwrap();
/// assert_eq!(except.actions().as_deref(), Some("!POST,PUT"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MethodSpec {
    /// Every HTTP method, predefined or extension.
    All,
    /// Exactly the listed methods.
    Include(BTreeSet<MethodToken>),
    /// Every method except the listed ones.
    Exclude(BTreeSet<MethodToken>),
}

impl MethodSpec {
    /// Parse the method portion of an actions string (the part before any
    /// `:TRANSPORT` suffix).
    ///
    /// An empty string is the shorthand for all methods. A leading `!`
    /// turns the list into an exception list. Duplicate tokens are
    /// eliminated; an exception list naming zero methods is
    /// `RuleError::EmptyMethodSet`.
    pub fn parse(spec: &str) -> RuleResult<Self> {
        if spec.is_empty() {
            return Ok(MethodSpec::All);
        }

        let (list, excluding) = match spec.strip_prefix('!') {
            Some(rest) => (rest, true),
            None => (spec, false),
        };

        if list.is_empty() {
            // "!" with nothing after it names zero methods.
            return Err(RuleError::EmptyMethodSet);
        }

        let mut tokens = BTreeSet::new();
        for item in list.split(',') {
            tokens.insert(MethodToken::parse(item)?);
        }

        if excluding {
            Ok(MethodSpec::Exclude(tokens))
        } else {
            Ok(Self::include(tokens))
        }
    }

    /// Build an inclusion spec from a pre-parsed token set, normalizing
    /// the full predefined set to `All`.
    ///
    /// An empty set is not representable as an inclusion list; callers
    /// must reject it before reaching this point.
    fn include(tokens: BTreeSet<MethodToken>) -> Self {
        let full_predefined = tokens.len() == HttpMethod::all().len()
            && tokens
                .iter()
                .all(|t| matches!(t, MethodToken::Predefined(_)));
        if full_predefined {
            MethodSpec::All
        } else {
            MethodSpec::Include(tokens)
        }
    }

    /// Build a spec from a slice of method token strings, as supplied on
    /// the structured construction path. An empty slice means all methods.
    pub fn from_methods(methods: &[&str]) -> RuleResult<Self> {
        if methods.is_empty() {
            return Ok(MethodSpec::All);
        }
        let mut tokens = BTreeSet::new();
        for method in methods {
            tokens.insert(MethodToken::parse(method)?);
        }
        Ok(Self::include(tokens))
    }

    /// Render the canonical actions form of this spec.
    ///
    /// `All` renders as the absent value; an inclusion list renders as the
    /// comma-joined tokens in canonical order; an exception list is the
    /// same with a leading `!`.
    pub fn actions(&self) -> Option<String> {
        match self {
            MethodSpec::All => None,
            MethodSpec::Include(tokens) => Some(join_tokens(tokens)),
            MethodSpec::Exclude(tokens) => Some(format!("!{}", join_tokens(tokens))),
        }
    }

    /// Check whether the methods covered by `other` are a subset of the
    /// methods covered by this spec.
    ///
    /// The universal method set is open-ended (extension tokens), so the
    /// subset test is conservative:
    /// - `All` implies everything;
    /// - an inclusion set implies only a smaller-or-equal inclusion set —
    ///   never an exception list or `All`, whose effective sets are
    ///   open-ended;
    /// - an exception set implies an inclusion set disjoint from it, or an
    ///   exception set excluding at least as much; it never implies `All`.
    pub fn implies(&self, other: &MethodSpec) -> bool {
        match (self, other) {
            (MethodSpec::All, _) => true,
            (MethodSpec::Include(mine), MethodSpec::Include(theirs)) => theirs.is_subset(mine),
            (MethodSpec::Include(_), _) => false,
            (MethodSpec::Exclude(mine), MethodSpec::Include(theirs)) => theirs.is_disjoint(mine),
            (MethodSpec::Exclude(mine), MethodSpec::Exclude(theirs)) => theirs.is_superset(mine),
            (MethodSpec::Exclude(_), MethodSpec::All) => false,
        }
    }
}

fn join_tokens(tokens: &BTreeSet<MethodToken>) -> String {
    let mut out = String::new();
    for token in tokens {
        if !out.is_empty() {
            out.push(',');
        }
        out.push_str(token.as_str());
    }
    out
}
