//! Contract lifecycle operations.
//!
//! Contracts are simple offers with a seller, an optional buyer, and a
//! status. The only mutation the tooling needs today is cancellation,
//! which is seller-only and rejects already-terminal contracts so a
//! double cancel surfaces as an explicit error rather than a silent
//! second write.

use serenissima_store::{Filter, Record, RecordStore};
use serenissima_types::{Contract, ContractStatus, Table, Username};

use crate::error::EngineError;

/// Load a contract by business id, or a typed not-found error.
pub async fn load_contract(
    store: &RecordStore,
    contract_id: &str,
) -> Result<Record<Contract>, EngineError> {
    Ok(store
        .require(
            Table::Contracts,
            &Filter::eq("contract_id", contract_id),
            contract_id,
        )
        .await?)
}

/// Cancel an active contract on behalf of `actor`.
///
/// Only the seller may cancel. Cancelling a completed or already
/// cancelled contract is an [`EngineError::AlreadyTerminal`] error.
pub async fn cancel_contract(
    store: &RecordStore,
    contract_id: &str,
    actor: &Username,
) -> Result<(), EngineError> {
    let record = load_contract(store, contract_id).await?;

    if record.fields.seller != *actor {
        return Err(EngineError::NotSeller {
            contract_id: contract_id.to_owned(),
            actor: actor.clone(),
        });
    }
    if record.fields.status.is_terminal() {
        return Err(EngineError::AlreadyTerminal {
            entity: "contract",
            id: contract_id.to_owned(),
            status: format!("{:?}", record.fields.status).to_lowercase(),
        });
    }

    store
        .update_fields(
            Table::Contracts,
            &record.id,
            serde_json::json!({ "status": ContractStatus::Cancelled }),
        )
        .await?;
    tracing::info!(contract_id, seller = %actor, "contract cancelled");
    Ok(())
}
