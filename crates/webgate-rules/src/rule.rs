//! # Web Resource Rules
//!
//! The composed authorization rule: one URL pattern spec, one HTTP method
//! spec, and one required transport level, bundled behind `implies`,
//! equality, canonical actions rendering, and a cached hash.
//!
//! A rule is fully parsed at construction; `implies`, equality, `actions`,
//! and `hash_value` are pure functions over the parsed facets and never
//! re-parse or fail.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RuleError, RuleResult};
use crate::methods::MethodSpec;
use crate::pattern::{escape_colons, UrlPatternSpec};
use crate::transport::TransportLevel;

/// An authorization rule for a web resource.
///
/// The rule's name is a URL pattern spec and its actions string is a
/// method spec with an optional transport suffix:
///
/// ```text
/// actions ::= '' | HTTPMethodSpec | HTTPMethodSpec ':' TransportType
/// ```
///
/// `implies` is asymmetric subsumption: rule A implies rule B when every
/// request matched by B is also matched by A. Equality is facet-wise
/// equivalence, which coincides with mutual implication.
///
/// # Example
///
/// ```
/// use webgate_rules::WebResourceRule;
///
/// let granted = WebResourceRule::new("/images/*", None).unwrap();
/// let request = WebResourceRule::new("/images/logo.png", Some("GET:CONFIDENTIAL")).unwrap();
/// assert!(granted.implies(&request));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RuleRepr", into = "RuleRepr")]
pub struct WebResourceRule {
    name: String,
    pattern_spec: UrlPatternSpec,
    method_spec: MethodSpec,
    transport: TransportLevel,
    hash_cell: OnceLock<u64>,
}

impl WebResourceRule {
    /// Create a rule from a name (URL pattern spec) and an optional
    /// actions string.
    ///
    /// A `None` or empty actions value means all methods over any
    /// transport. The transport suffix, when present, follows the first
    /// `:` in the actions string; method tokens cannot contain a colon,
    /// so the split is unambiguous.
    ///
    /// # Example
    ///
    /// ```
    /// use webgate_rules::WebResourceRule;
    ///
    /// let rule = WebResourceRule::new("/catalog/*", Some("GET,HEAD:CONFIDENTIAL")).unwrap();
    /// assert_eq!(rule.actions().as_deref(), Some("GET,HEAD:CONFIDENTIAL"));
    /// ```
    pub fn new(name: &str, actions: Option<&str>) -> RuleResult<Self> {
        let pattern_spec = UrlPatternSpec::parse(name).map_err(|e| {
            debug!(name, error = %e, "rejected web resource rule name");
            e
        })?;
        let (method_spec, transport) = parse_actions(actions).map_err(|e| {
            debug!(actions = actions.unwrap_or(""), error = %e, "rejected web resource rule actions");
            e
        })?;

        Ok(Self::assemble(
            name.to_string(),
            pattern_spec,
            method_spec,
            transport,
        ))
    }

    /// Create a rule from structured parts: a pattern spec string, an
    /// array of method tokens, and an optional transport token.
    ///
    /// An empty method slice means all methods; a `None` transport means
    /// `NONE`. The pattern spec is validated exactly as on the
    /// name-plus-actions path.
    pub fn with_parts(
        pattern_spec: &str,
        methods: &[&str],
        transport: Option<&str>,
    ) -> RuleResult<Self> {
        let parsed = UrlPatternSpec::parse(pattern_spec).map_err(|e| {
            debug!(pattern_spec, error = %e, "rejected web resource rule pattern spec");
            e
        })?;
        let method_spec = MethodSpec::from_methods(methods)?;
        let transport = match transport {
            Some(token) => TransportLevel::parse(token)?,
            None => TransportLevel::None,
        };

        Ok(Self::assemble(
            pattern_spec.to_string(),
            parsed,
            method_spec,
            transport,
        ))
    }

    /// Create the rule representing one live request.
    ///
    /// The caller supplies the context-relative resource path, the request
    /// method verbatim, and whether the connection is transport-secured.
    /// Colons embedded in the path are escaped before the name is parsed,
    /// so a literal `:` in a path is never mistaken for an exclusion
    /// delimiter. The method becomes a single-element inclusion set and a
    /// secured connection maps to `CONFIDENTIAL`.
    pub fn from_request(path: &str, method: &str, secure: bool) -> RuleResult<Self> {
        let name = escape_colons(path);
        let pattern_spec = UrlPatternSpec::parse(&name)?;
        let method_spec = MethodSpec::from_methods(&[method])?;
        let transport = if secure {
            TransportLevel::Confidential
        } else {
            TransportLevel::None
        };

        Ok(Self::assemble(name, pattern_spec, method_spec, transport))
    }

    fn assemble(
        name: String,
        pattern_spec: UrlPatternSpec,
        method_spec: MethodSpec,
        transport: TransportLevel,
    ) -> Self {
        Self {
            name,
            pattern_spec,
            method_spec,
            transport,
            hash_cell: OnceLock::new(),
        }
    }

    /// The rule's name as supplied at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parsed URL pattern spec.
    pub fn pattern_spec(&self) -> &UrlPatternSpec {
        &self.pattern_spec
    }

    /// The parsed HTTP method spec.
    pub fn method_spec(&self) -> &MethodSpec {
        &self.method_spec
    }

    /// The required transport level.
    pub fn transport(&self) -> TransportLevel {
        self.transport
    }

    /// Check whether this rule subsumes `other`.
    ///
    /// All three facets must agree: the transport level must be the `NONE`
    /// wildcard or equal `other`'s, `other`'s methods must be a subset of
    /// this rule's methods, and this rule's pattern spec must cover
    /// `other`'s.
    pub fn implies(&self, other: &WebResourceRule) -> bool {
        if self.transport != TransportLevel::None && self.transport != other.transport {
            return false;
        }

        if !self.method_spec.implies(&other.method_spec) {
            return false;
        }

        self.pattern_spec.implies(&other.pattern_spec)
    }

    /// Render the canonical actions string.
    ///
    /// All methods at transport `NONE` render as the absent value; a
    /// constrained method spec renders alone at transport `NONE`; any
    /// other transport is appended as `:TRANSPORT`, degenerating to a bare
    /// `:TRANSPORT` when the methods are unconstrained.
    pub fn actions(&self) -> Option<String> {
        let methods = self.method_spec.actions();

        if self.transport == TransportLevel::None {
            return methods;
        }

        match methods {
            Some(methods) => Some(format!("{}:{}", methods, self.transport.as_str())),
            None => Some(format!(":{}", self.transport.as_str())),
        }
    }

    /// The rule's hash, computed once on first access and stable for the
    /// rule's lifetime.
    ///
    /// The hash input combines the normalized pattern spec text, the
    /// method spec's own hash, and the transport ordinal — the same
    /// normalized facets equality uses — so equal rules hash equally even
    /// when their original exclusion lists were ordered differently.
    pub fn hash_value(&self) -> u64 {
        *self.hash_cell.get_or_init(|| {
            let mut hasher = DefaultHasher::new();
            self.method_spec.hash(&mut hasher);
            let method_hash = hasher.finish();

            let input = format!(
                "{} {}:{}",
                self.pattern_spec.normalized_spec_string(),
                method_hash,
                self.transport.ordinal()
            );

            let mut hasher = DefaultHasher::new();
            input.hash(&mut hasher);
            hasher.finish()
        })
    }
}

fn parse_actions(actions: Option<&str>) -> RuleResult<(MethodSpec, TransportLevel)> {
    let actions = actions.unwrap_or("");
    match actions.split_once(':') {
        None => Ok((MethodSpec::parse(actions)?, TransportLevel::None)),
        Some((methods, transport)) => Ok((
            MethodSpec::parse(methods)?,
            TransportLevel::parse(transport)?,
        )),
    }
}

/// Facet-wise equivalence: equal transport, equal method sets, and
/// mutually-implying pattern specs.
impl PartialEq for WebResourceRule {
    fn eq(&self, other: &Self) -> bool {
        self.transport == other.transport
            && self.method_spec == other.method_spec
            && self.pattern_spec == other.pattern_spec
    }
}

impl Eq for WebResourceRule {}

impl Hash for WebResourceRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl fmt::Display for WebResourceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.actions() {
            Some(actions) => write!(f, "{} {}", self.name, actions),
            None => f.write_str(&self.name),
        }
    }
}

/// The serialized form of a rule: its name and canonicalized actions, the
/// same pair the constructor accepts. Deserialization re-runs full
/// construction-time validation.
#[derive(Serialize, Deserialize)]
struct RuleRepr {
    name: String,
    actions: Option<String>,
}

impl TryFrom<RuleRepr> for WebResourceRule {
    type Error = RuleError;

    fn try_from(repr: RuleRepr) -> RuleResult<Self> {
        WebResourceRule::new(&repr.name, repr.actions.as_deref())
    }
}

impl From<WebResourceRule> for RuleRepr {
    fn from(rule: WebResourceRule) -> Self {
        let actions = rule.actions();
        RuleRepr {
            name: rule.name,
            actions,
        }
    }
}
