use std::{fmt, str::FromStr};

use derive_more::derive::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing a policy from its string name fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} policy: {value}. Expected one of: {expected}")]
pub struct ParsePolicyError {
    kind: &'static str,
    value: String,
    expected: String,
}

/// Parse `s` as one of `variants`, by their display names.
fn parse_policy<P: Copy + fmt::Display>(
    kind: &'static str,
    variants: &[P],
    s: &str,
) -> Result<P, ParsePolicyError> {
    variants.iter().copied().find(|policy| policy.to_string() == s).ok_or_else(|| {
        let expected = variants.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        ParsePolicyError { kind, value: s.to_owned(), expected }
    })
}

/// Who may mark a message as included.
///
/// Two inclusion paths exist in the protocol design with different access rules. Both reach
/// the same state transition, so they are exposed as one entry point whose behavior is
/// selected here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InclusionPolicy {
    /// Only the operator may mark messages as included. Marking an already-included message
    /// fails with [`EngineError::AlreadyIncluded`](crate::EngineError::AlreadyIncluded).
    #[default]
    #[display("operator-only")]
    OperatorOnly,
    /// Anyone may mark messages as included. Marking an already-included message inside its
    /// window is a no-op.
    #[display("open")]
    Open,
}

impl InclusionPolicy {
    /// All inclusion policies.
    pub const VARIANTS: [Self; 2] = [Self::OperatorOnly, Self::Open];
}

impl FromStr for InclusionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_policy("inclusion", &Self::VARIANTS, s)
    }
}

/// How the batch gate treats pending messages whose deadline has passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GatePolicy {
    /// Only pending messages still inside their window block new batches. A message that
    /// expires without inclusion stops blocking.
    ///
    /// NOTE: this lets a censoring sequencer wait out a deadline and then proceed freely.
    /// It is the default because it is the behavior of the deployed protocol.
    #[default]
    #[display("expired-unblocks")]
    ExpiredUnblocks,
    /// Every pending message blocks new batches, whether or not its deadline has passed.
    #[display("expired-blocks")]
    ExpiredBlocks,
}

impl GatePolicy {
    /// All gate policies.
    pub const VARIANTS: [Self; 2] = [Self::ExpiredUnblocks, Self::ExpiredBlocks];
}

impl FromStr for GatePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_policy("gate", &Self::VARIANTS, s)
    }
}

/// What the blacklist is enforced on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlacklistPolicy {
    /// The blacklist is administered but not enforced anywhere.
    #[default]
    #[display("inert")]
    Inert,
    /// Submissions from blacklisted callers are rejected.
    #[display("reject-submissions")]
    RejectSubmissions,
}

impl BlacklistPolicy {
    /// All blacklist policies.
    pub const VARIANTS: [Self; 2] = [Self::Inert, Self::RejectSubmissions];
}

impl FromStr for BlacklistPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_policy("blacklist", &Self::VARIANTS, s)
    }
}
