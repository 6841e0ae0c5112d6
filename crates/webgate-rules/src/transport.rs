//! # Transport Levels
//!
//! The minimum connection security a rule requires. A rule carrying
//! `TransportLevel::None` acts as a wildcard on the implying side: it is
//! satisfied by any connection, secured or not.

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};

/// Minimum required transport security for a web resource rule.
///
/// Levels are ordered: `None` < `Integral` < `Confidential`. The ordinal
/// participates in the rule hash and must stay stable.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportLevel {
    /// Any connection type is acceptable.
    #[default]
    None,
    /// The connection must guarantee content integrity.
    Integral,
    /// The connection must guarantee confidentiality.
    Confidential,
}

impl TransportLevel {
    /// Get the string representation of the transport level.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportLevel::None => "NONE",
            TransportLevel::Integral => "INTEGRAL",
            TransportLevel::Confidential => "CONFIDENTIAL",
        }
    }

    /// Parse a transport level from its exact textual form.
    ///
    /// Only the three literals `NONE`, `INTEGRAL`, and `CONFIDENTIAL` are
    /// accepted; anything else is `RuleError::UnknownTransport`.
    ///
    /// # Example
    ///
    /// ```
    /// use webgate_rules::TransportLevel;
    ///
    /// assert_eq!(TransportLevel::parse("INTEGRAL").unwrap(), TransportLevel::Integral);
    /// assert!(TransportLevel::parse("integral").is_err());
    /// ```
    pub fn parse(s: &str) -> RuleResult<Self> {
        match s {
            "NONE" => Ok(TransportLevel::None),
            "INTEGRAL" => Ok(TransportLevel::Integral),
            "CONFIDENTIAL" => Ok(TransportLevel::Confidential),
            _ => Err(RuleError::UnknownTransport(s.to_string())),
        }
    }

    /// Stable ordinal used in the rule hash (NONE=0, INTEGRAL=1, CONFIDENTIAL=2).
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }
}
