//! v1 cross-boundary contracts for the covenant kernel, admin API, and CLI.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Lifecycle state of a contract. The single source of truth for where a
/// contract stands; transitions happen only through the lifecycle manager.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Uninitialized,
    Initiating,
    Active,
    Finalized,
    Breached,
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initiating => "initiating",
            Self::Active => "active",
            Self::Finalized => "finalized",
            Self::Breached => "breached",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal states have no outgoing edges.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized | Self::Breached | Self::Cancelled)
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque arena key for a contract record. Generated by the lifecycle
/// manager; carries no meaning beyond identity.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct ContractHandle(pub u64);

impl fmt::Display for ContractHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contract_{:06}", self.0)
    }
}

/// Ordered criterion identifier sets associated with one contract.
/// Identifiers are opaque keys into the criteria registry; the binding
/// holds no behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CriteriaBinding {
    pub breaching: Vec<String>,
    pub finalizing: Vec<String>,
}

impl CriteriaBinding {
    pub fn new(
        breaching: impl IntoIterator<Item = impl Into<String>>,
        finalizing: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            breaching: breaching.into_iter().map(Into::into).collect(),
            finalizing: finalizing.into_iter().map(Into::into).collect(),
        }
    }
}

/// One contract instance. Mutated exclusively through the lifecycle
/// manager; `owning_contractor` is bound exactly once, when the record
/// leaves `Uninitialized`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractRecord {
    pub status: ContractStatus,
    pub owning_contractor: Option<String>,
    pub sub_contractors: Vec<String>,
    pub criteria: CriteriaBinding,
}

impl ContractRecord {
    pub fn uninitialized(criteria: CriteriaBinding) -> Self {
        Self {
            status: ContractStatus::Uninitialized,
            owning_contractor: None,
            sub_contractors: Vec::new(),
            criteria,
        }
    }
}

/// Immutable record of one status transition, emitted synchronously on
/// every successful edge traversal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusChange {
    pub handle: ContractHandle,
    pub previous: ContractStatus,
    pub new: ContractStatus,
}

/// Listing/wire view of one contract, with criterion identifiers already
/// resolved to display descriptions. Identifiers with no registry entry
/// are skipped at assembly time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractSnapshot {
    pub schema_version: String,
    pub handle: ContractHandle,
    pub status: ContractStatus,
    pub owner_label: Option<String>,
    pub sub_contractor_labels: Vec<String>,
    pub breaching_descriptions: Vec<String>,
    pub finalizing_descriptions: Vec<String>,
}

/// Comparison operator for a fact predicate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PredicateOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Predicate over one world fact, the form the bundled criteria engine
/// evaluates. Fact keys are opaque strings; missing facts read as 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactPredicate {
    pub fact_key: String,
    pub operator: PredicateOp,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ContractNotFound,
    PresetNotFound,
    UnknownIdentity,
    MindRequired,
    InvalidCommand,
    InternalError,
}

/// Error envelope returned by the admin API and echoed by operator
/// tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{} ({details})", self.message),
            None => f.write_str(&self.message),
        }
    }
}
