//! # Webgate Rules
//!
//! Servlet-style web resource rule matching for the Webgate authorization
//! layer.
//!
//! ## Overview
//!
//! The webgate-rules crate handles:
//! - **URL Patterns**: exact, path-prefix, extension, and default patterns
//!   with servlet matching semantics
//! - **URL Pattern Specs**: a primary pattern minus an exclusion list,
//!   parsed from a colon-delimited spec string
//! - **Method Specs**: inclusion lists, exception lists, or the universal
//!   HTTP method set, with deterministic canonical rendering
//! - **Transport Levels**: NONE / INTEGRAL / CONFIDENTIAL connection
//!   guarantees
//! - **Web Resource Rules**: the composed rule with `implies`, equality by
//!   mutual implication, canonical actions, and a cached hash
//!
//! ## Architecture
//!
//! ```text
//! WebResourceRule = UrlPatternSpec + MethodSpec + TransportLevel
//!
//! Examples:
//!   name "/catalog/*:/catalog/admin/*"    - catalog minus its admin subtree
//!   actions "GET,POST"                    - only those two methods
//!   actions "!TRACE"                      - every method except TRACE
//!   actions "GET:CONFIDENTIAL"            - GET over a confidential channel
//! ```
//!
//! A rule is parsed once at construction; every later operation is a pure
//! function over the parsed facets. Construction fails loudly on malformed
//! specs — a rule that cannot be validated must never participate in an
//! authorization decision.
//!
//! ## Usage
//!
//! ```rust
//! use webgate_rules::WebResourceRule;
//!
//! // A granted rule, typically from a deployment descriptor.
//! let granted = WebResourceRule::new("/reports/*", Some("GET:CONFIDENTIAL")).unwrap();
//!
//! // The rule representing one live request.
//! let request = WebResourceRule::from_request("/reports/q3", "GET", true).unwrap();
//!
//! assert!(granted.implies(&request));
//! ```
//!
//! ## Implication
//!
//! `implies` is asymmetric subsumption over request sets: the transport
//! level must be the NONE wildcard or match, the argument's methods must
//! be a subset of the rule's methods, and the rule's pattern spec must
//! cover the argument's. Equality is mutual implication, so two rules
//! whose exclusion lists are ordered differently still compare (and hash)
//! equal.

pub mod error;
pub mod methods;
pub mod pattern;
pub mod rule;
pub mod transport;

// Re-export main types for convenience
pub use error::{RuleError, RuleResult};
pub use methods::{HttpMethod, MethodSpec, MethodToken};
pub use pattern::{UrlPattern, UrlPatternKind, UrlPatternSpec};
pub use rule::WebResourceRule;
pub use transport::TransportLevel;
