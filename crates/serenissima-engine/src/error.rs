//! Error types for the lifecycle engine.
//!
//! Business failures (insufficient funds or stock, wrong actor) are
//! distinct variants rather than a logged boolean, and every error answers
//! [`EngineError::is_retryable`] so the invoking orchestrator can choose a
//! retry policy.

use rust_decimal::Decimal;

use serenissima_store::StoreError;
use serenissima_types::{ResourceType, StatusError, Username};

/// Errors that can occur while creating or processing lifecycle records.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A Record Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An activity status transition was rejected.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// A precondition failed before any write happened.
    #[error("validation failed: {reason}")]
    Validation {
        /// Description of the failed precondition.
        reason: String,
    },

    /// A debit would overdraw a citizen's purse.
    #[error("insufficient funds: {citizen} has {available} ducats, needs {needed}")]
    InsufficientFunds {
        /// The citizen being debited.
        citizen: Username,
        /// The amount required.
        needed: Decimal,
        /// The amount available.
        available: Decimal,
    },

    /// A resource relocation would take more units than the stack holds.
    #[error(
        "insufficient stock: {owner} holds {available} {resource:?} at {building}, needs {needed}"
    )]
    InsufficientStock {
        /// The owning citizen.
        owner: Username,
        /// The resource type.
        resource: ResourceType,
        /// The holder building id.
        building: String,
        /// Units required.
        needed: u32,
        /// Units available.
        available: u32,
    },

    /// A contract operation was attempted by someone other than the seller.
    #[error("contract {contract_id}: actor {actor} is not the seller")]
    NotSeller {
        /// The contract's business id.
        contract_id: String,
        /// The citizen who attempted the operation.
        actor: Username,
    },

    /// An operation targeted a record already in a terminal status.
    #[error("{entity} {id} is already terminal ({status})")]
    AlreadyTerminal {
        /// What kind of record ("contract", "stratagem").
        entity: &'static str,
        /// The record's business id.
        id: String,
        /// The terminal status it is in.
        status: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`].
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Whether retrying the same operation could plausibly succeed.
    ///
    /// Only transient store failures are retryable; every business failure
    /// will reproduce on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            Self::Status(_)
            | Self::Validation { .. }
            | Self::InsufficientFunds { .. }
            | Self::InsufficientStock { .. }
            | Self::NotSeller { .. }
            | Self::AlreadyTerminal { .. } => false,
        }
    }
}
