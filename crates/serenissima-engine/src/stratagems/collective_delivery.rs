//! The collective delivery stratagem.
//!
//! An executor declares a target building, a resource, a target amount,
//! and a per-unit reward funded from their own purse. Citizens join (one
//! participant row each, idempotent on the (stratagem, username) key) and
//! deliver; each delivery relocates stock, pays the reward, and recomputes
//! the collected total as the sum over participant rows.
//!
//! Every operation against a stratagem that is no longer `active` is a
//! success no-op, never an error: the window for useful work simply
//! closed, and failing forever would only wedge retry loops.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use serenissima_store::{Filter, Record, RecordStore};
use serenissima_types::{
    BuildingId, ResourceType, Stratagem, StratagemParticipant, StratagemStatus, StratagemType,
    Table, Username,
};

use crate::effects;
use crate::error::EngineError;

/// Parameters for declaring a collective delivery.
#[derive(Debug, Clone)]
pub struct CreateCollectiveDelivery {
    /// The citizen declaring and funding the plan.
    pub executor: Username,
    /// The building deliveries converge on.
    pub target_building: BuildingId,
    /// The resource being collected.
    pub resource: ResourceType,
    /// Units needed for completion.
    pub target_amount: u32,
    /// Ducats paid per delivered unit.
    pub reward_per_unit: Decimal,
    /// Hours until the plan lapses.
    pub duration_hours: i64,
}

/// What a join attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new participant row was created.
    Joined,
    /// The citizen already had a row; nothing changed.
    AlreadyJoined,
    /// The stratagem is no longer active; nothing changed.
    NotActive,
}

/// What a delivery attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Stock moved and the reward was paid.
    Delivered {
        /// Ducats credited to the deliverer.
        reward: Decimal,
    },
    /// The stratagem is no longer active; nothing changed.
    NotActive,
}

/// Load a stratagem by business id, or a typed not-found error.
pub async fn load_stratagem(
    store: &RecordStore,
    stratagem_id: &str,
) -> Result<Record<Stratagem>, EngineError> {
    Ok(store
        .require(
            Table::Stratagems,
            &Filter::eq("stratagem_id", stratagem_id),
            stratagem_id,
        )
        .await?)
}

/// Declare a new collective delivery in `active` status.
///
/// The executor must exist and the target building must exist; both are
/// checked before the single insert.
pub async fn create(
    store: &RecordStore,
    params: CreateCollectiveDelivery,
    now: DateTime<Utc>,
) -> Result<Record<Stratagem>, EngineError> {
    if params.target_amount == 0 {
        return Err(EngineError::validation("target amount must be positive"));
    }
    if params.reward_per_unit < Decimal::ZERO {
        return Err(EngineError::validation("reward per unit must not be negative"));
    }
    effects::require_citizen(store, &params.executor).await?;
    let _: Record<serenissima_types::Building> = store
        .require(
            Table::Buildings,
            &Filter::eq("building_id", params.target_building.as_str()),
            params.target_building.as_str(),
        )
        .await?;

    let stratagem = Stratagem {
        stratagem_id: Stratagem::mint_id(StratagemType::OrganizeCollectiveDelivery),
        stratagem_type: StratagemType::OrganizeCollectiveDelivery,
        executor: params.executor,
        target_building: params.target_building,
        resource: params.resource,
        target_amount: params.target_amount,
        reward_per_unit: params.reward_per_unit,
        expires_at: now + Duration::hours(params.duration_hours.max(1)),
        status: StratagemStatus::Active,
        collected_amount: 0,
    };
    let record = store.create(Table::Stratagems, &stratagem).await?;
    tracing::info!(
        stratagem_id = %record.fields.stratagem_id,
        executor = %record.fields.executor,
        resource = record.fields.resource.as_str(),
        target_amount = record.fields.target_amount,
        "Declared collective delivery"
    );
    Ok(record)
}

/// Add a citizen to a stratagem's participant list.
///
/// Idempotent: a second join by the same citizen is a no-op on the
/// participant list. The citizen's trust with the executor at join time
/// is recorded for provenance.
pub async fn join(
    store: &RecordStore,
    stratagem_id: &str,
    citizen: &Username,
    now: DateTime<Utc>,
) -> Result<JoinOutcome, EngineError> {
    let stratagem = load_stratagem(store, stratagem_id).await?;
    if stratagem.fields.status != StratagemStatus::Active {
        return Ok(JoinOutcome::NotActive);
    }

    if find_participant(store, stratagem_id, citizen).await?.is_some() {
        return Ok(JoinOutcome::AlreadyJoined);
    }

    let trust_at_join = current_trust(store, citizen, &stratagem.fields.executor).await?;
    let participant = StratagemParticipant {
        stratagem_id: stratagem_id.to_owned(),
        username: citizen.clone(),
        joined_at: now,
        trust_at_join,
        amount_delivered: 0,
        reward_earned: Decimal::ZERO,
    };
    store
        .create(Table::StratagemParticipants, &participant)
        .await?;
    tracing::info!(stratagem_id, citizen = %citizen, "Citizen joined stratagem");
    Ok(JoinOutcome::Joined)
}

/// Complete one delivery under a stratagem.
///
/// Relocates the deliverer's stock from `from_building` to the target
/// building, pays `amount x reward_per_unit` from the executor's purse,
/// updates the participant row, and recomputes the collected total. When
/// the total reaches the target the stratagem completes.
pub async fn deliver(
    store: &RecordStore,
    stratagem_id: &str,
    citizen: &Username,
    amount: u32,
    from_building: &BuildingId,
    now: DateTime<Utc>,
) -> Result<DeliveryOutcome, EngineError> {
    if amount == 0 {
        return Err(EngineError::validation("delivery amount must be positive"));
    }
    let stratagem = load_stratagem(store, stratagem_id).await?;
    if stratagem.fields.status != StratagemStatus::Active {
        return Ok(DeliveryOutcome::NotActive);
    }

    // Late joiners deliver without a prior join activity; give them a row.
    join(store, stratagem_id, citizen, now).await?;
    let participant = find_participant(store, stratagem_id, citizen)
        .await?
        .ok_or_else(|| EngineError::validation("participant row vanished mid-delivery"))?;

    // The executor's purse is checked before any stock moves: a short
    // purse must not strand relocated goods at the target.
    let reward = Decimal::from(amount).saturating_mul(stratagem.fields.reward_per_unit);
    let executor = effects::require_citizen(store, &stratagem.fields.executor).await?;
    if executor.fields.ducats < reward {
        return Err(EngineError::InsufficientFunds {
            citizen: stratagem.fields.executor.clone(),
            needed: reward,
            available: executor.fields.ducats,
        });
    }

    effects::relocate_stack(
        store,
        citizen,
        stratagem.fields.resource,
        amount,
        from_building,
        &stratagem.fields.target_building,
    )
    .await?;

    effects::transfer_ducats(
        store,
        &stratagem.fields.executor,
        citizen,
        reward,
        "collective_delivery_reward",
        now,
    )
    .await?;

    let delivered = participant.fields.amount_delivered.saturating_add(amount);
    let earned = participant.fields.reward_earned.saturating_add(reward);
    store
        .update_fields(
            Table::StratagemParticipants,
            &participant.id,
            serde_json::json!({ "amount_delivered": delivered, "reward_earned": earned }),
        )
        .await?;

    let collected = collected_amount(store, stratagem_id).await?;
    let mut patch = serde_json::json!({ "collected_amount": collected });
    if collected >= stratagem.fields.target_amount {
        patch["status"] = serde_json::json!(StratagemStatus::Completed);
    }
    store
        .update_fields(Table::Stratagems, &stratagem.id, patch)
        .await?;

    tracing::info!(
        stratagem_id,
        citizen = %citizen,
        amount,
        collected,
        %reward,
        "Delivery completed"
    );
    Ok(DeliveryOutcome::Delivered { reward })
}

/// Evaluate conclusion: expiry first, then target completion.
///
/// Returns the stratagem's (possibly new) status. Calling this on an
/// already-terminal stratagem returns the stored status unchanged.
pub async fn conclude(
    store: &RecordStore,
    stratagem_id: &str,
    now: DateTime<Utc>,
) -> Result<StratagemStatus, EngineError> {
    let stratagem = load_stratagem(store, stratagem_id).await?;
    if stratagem.fields.status != StratagemStatus::Active {
        return Ok(stratagem.fields.status);
    }

    let next = if now > stratagem.fields.expires_at {
        Some(StratagemStatus::Expired)
    } else if stratagem.fields.collected_amount >= stratagem.fields.target_amount {
        Some(StratagemStatus::Completed)
    } else {
        None
    };

    if let Some(status) = next {
        store
            .update_fields(
                Table::Stratagems,
                &stratagem.id,
                serde_json::json!({ "status": status }),
            )
            .await?;
        tracing::info!(stratagem_id, status = ?status, "Stratagem concluded");
        return Ok(status);
    }
    Ok(StratagemStatus::Active)
}

/// Cancel an active stratagem. Only the executor may cancel.
pub async fn cancel(
    store: &RecordStore,
    stratagem_id: &str,
    actor: &Username,
) -> Result<(), EngineError> {
    let stratagem = load_stratagem(store, stratagem_id).await?;
    if stratagem.fields.executor != *actor {
        return Err(EngineError::validation(format!(
            "only the executor {} may cancel stratagem {stratagem_id}",
            stratagem.fields.executor
        )));
    }
    if stratagem.fields.status != StratagemStatus::Active {
        return Err(EngineError::AlreadyTerminal {
            entity: "stratagem",
            id: stratagem_id.to_owned(),
            status: format!("{:?}", stratagem.fields.status),
        });
    }
    store
        .update_fields(
            Table::Stratagems,
            &stratagem.id,
            serde_json::json!({ "status": StratagemStatus::Cancelled }),
        )
        .await?;
    Ok(())
}

/// Find one participant row by (stratagem, username).
async fn find_participant(
    store: &RecordStore,
    stratagem_id: &str,
    citizen: &Username,
) -> Result<Option<Record<StratagemParticipant>>, EngineError> {
    Ok(store
        .find_first(
            Table::StratagemParticipants,
            &Filter::and([
                Filter::eq("stratagem_id", stratagem_id),
                Filter::eq("username", citizen.as_str()),
            ]),
        )
        .await?)
}

/// Sum delivered amounts across all participant rows.
async fn collected_amount(
    store: &RecordStore,
    stratagem_id: &str,
) -> Result<u32, EngineError> {
    let participants: Vec<Record<StratagemParticipant>> = store
        .list(
            Table::StratagemParticipants,
            &Filter::eq("stratagem_id", stratagem_id),
        )
        .await?;
    Ok(participants
        .iter()
        .fold(0_u32, |acc, p| acc.saturating_add(p.fields.amount_delivered)))
}

/// The citizen's stored trust with the executor, zero if no row exists.
async fn current_trust(
    store: &RecordStore,
    citizen: &Username,
    executor: &Username,
) -> Result<Decimal, EngineError> {
    let (first, second) = if citizen.as_str() <= executor.as_str() {
        (citizen, executor)
    } else {
        (executor, citizen)
    };
    let relationship: Option<Record<serenissima_types::Relationship>> = store
        .find_first(
            Table::Relationships,
            &Filter::and([
                Filter::eq("citizen_a", first.as_str()),
                Filter::eq("citizen_b", second.as_str()),
            ]),
        )
        .await?;
    Ok(relationship.map_or(Decimal::ZERO, |r| r.fields.trust))
}
