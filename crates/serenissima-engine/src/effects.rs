//! Audited mutations of citizen, resource, and relationship rows.
//!
//! Every effect here is the "apply" half of some processor: ducats move
//! between purses, stacks move between buildings, trust scores shift.
//! Each monetary or trust effect writes a [`Notification`] row carrying
//! the reason string, so the store retains an audit trail of why balances
//! changed.
//!
//! Trust deltas clamp the stored score to `[-100, 100]`; raw historical
//! values outside that band are left as found and classified as-is.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use serenissima_store::{Filter, Record, RecordStore};
use serenissima_types::{
    BuildingId, Citizen, Notification, Relationship, ResourceStack, ResourceType, Table, Username,
};

use crate::error::EngineError;

/// Upper clamp for trust scores adjusted by processors (+100).
fn trust_max() -> Decimal {
    Decimal::ONE_HUNDRED
}

/// Lower clamp for trust scores adjusted by processors (-100).
fn trust_min() -> Decimal {
    -Decimal::ONE_HUNDRED
}

/// Load the citizen row for a username, or a typed not-found error.
pub async fn require_citizen(
    store: &RecordStore,
    username: &Username,
) -> Result<Record<Citizen>, EngineError> {
    Ok(store
        .require(
            Table::Citizens,
            &Filter::eq("username", username.as_str()),
            username.as_str(),
        )
        .await?)
}

/// Move ducats between two citizens' purses, with an audit reason.
///
/// Rejects overdrafts: the debited citizen must hold at least `amount`.
/// Writes both balances and one notification per side.
///
/// # Errors
///
/// [`EngineError::InsufficientFunds`] on overdraft;
/// [`EngineError::Validation`] on a negative amount.
pub async fn transfer_ducats(
    store: &RecordStore,
    from: &Username,
    to: &Username,
    amount: Decimal,
    reason: &str,
    at: DateTime<Utc>,
) -> Result<(), EngineError> {
    if amount < Decimal::ZERO {
        return Err(EngineError::validation("transfer amount must not be negative"));
    }
    if amount == Decimal::ZERO {
        return Ok(());
    }

    let payer = require_citizen(store, from).await?;
    let payee = require_citizen(store, to).await?;

    let remaining = payer
        .fields
        .ducats
        .checked_sub(amount)
        .filter(|r| *r >= Decimal::ZERO)
        .ok_or_else(|| EngineError::InsufficientFunds {
            citizen: from.clone(),
            needed: amount,
            available: payer.fields.ducats,
        })?;
    let credited = payee.fields.ducats.saturating_add(amount);

    store
        .update_fields(
            Table::Citizens,
            &payer.id,
            serde_json::json!({ "ducats": remaining }),
        )
        .await?;
    store
        .update_fields(
            Table::Citizens,
            &payee.id,
            serde_json::json!({ "ducats": credited }),
        )
        .await?;

    audit(store, from, reason, format!("Paid {amount} ducats to {to}"), at).await?;
    audit(store, to, reason, format!("Received {amount} ducats from {from}"), at).await?;

    tracing::info!(%from, %to, %amount, reason, "Transferred ducats");
    Ok(())
}

/// Credit ducats into one citizen's purse from outside any purse (state
/// fees, bootstrap grants), with an audit reason.
pub async fn credit_ducats(
    store: &RecordStore,
    citizen: &Username,
    amount: Decimal,
    reason: &str,
    at: DateTime<Utc>,
) -> Result<(), EngineError> {
    if amount < Decimal::ZERO {
        return Err(EngineError::validation("credit amount must not be negative"));
    }
    let record = require_citizen(store, citizen).await?;
    let credited = record.fields.ducats.saturating_add(amount);
    store
        .update_fields(
            Table::Citizens,
            &record.id,
            serde_json::json!({ "ducats": credited }),
        )
        .await?;
    audit(store, citizen, reason, format!("Received {amount} ducats"), at).await?;
    Ok(())
}

/// Find the stack of `resource` owned by `owner` held at `building`.
async fn find_stack(
    store: &RecordStore,
    owner: &Username,
    resource: ResourceType,
    building: &BuildingId,
) -> Result<Option<Record<ResourceStack>>, EngineError> {
    Ok(store
        .find_first(
            Table::Resources,
            &Filter::and([
                Filter::eq("owner", owner.as_str()),
                Filter::eq("resource", resource.as_str()),
                Filter::eq("holder_building", building.as_str()),
            ]),
        )
        .await?)
}

/// Move units of a resource between holder buildings, same owner.
///
/// The source stack keeps its row at the reduced count; the destination
/// stack is created if the owner has none there yet.
///
/// # Errors
///
/// [`EngineError::InsufficientStock`] if the source holds fewer than
/// `amount` units; the store is untouched in that case.
pub async fn relocate_stack(
    store: &RecordStore,
    owner: &Username,
    resource: ResourceType,
    amount: u32,
    from_building: &BuildingId,
    to_building: &BuildingId,
) -> Result<(), EngineError> {
    if amount == 0 {
        return Ok(());
    }

    let source = find_stack(store, owner, resource, from_building)
        .await?
        .ok_or_else(|| EngineError::InsufficientStock {
            owner: owner.clone(),
            resource,
            building: from_building.as_str().to_owned(),
            needed: amount,
            available: 0,
        })?;

    let remaining = source.fields.count.checked_sub(amount).ok_or_else(|| {
        EngineError::InsufficientStock {
            owner: owner.clone(),
            resource,
            building: from_building.as_str().to_owned(),
            needed: amount,
            available: source.fields.count,
        }
    })?;

    store
        .update_fields(
            Table::Resources,
            &source.id,
            serde_json::json!({ "count": remaining }),
        )
        .await?;

    match find_stack(store, owner, resource, to_building).await? {
        Some(destination) => {
            let count = destination.fields.count.saturating_add(amount);
            store
                .update_fields(
                    Table::Resources,
                    &destination.id,
                    serde_json::json!({ "count": count }),
                )
                .await?;
        }
        None => {
            let stack = ResourceStack {
                resource_stack_id: ResourceStack::mint_id(resource),
                resource,
                owner: owner.clone(),
                holder_building: to_building.clone(),
                count: amount,
            };
            store.create(Table::Resources, &stack).await?;
        }
    }

    tracing::info!(
        %owner,
        resource = resource.as_str(),
        amount,
        from = from_building.as_str(),
        to = to_building.as_str(),
        "Relocated resource stack"
    );
    Ok(())
}

/// Add (or create) units of a resource for an owner at a building,
/// from outside any existing stack (fishing catches, harvests).
pub async fn grant_stack(
    store: &RecordStore,
    owner: &Username,
    resource: ResourceType,
    amount: u32,
    building: &BuildingId,
) -> Result<(), EngineError> {
    if amount == 0 {
        return Ok(());
    }
    match find_stack(store, owner, resource, building).await? {
        Some(existing) => {
            let count = existing.fields.count.saturating_add(amount);
            store
                .update_fields(
                    Table::Resources,
                    &existing.id,
                    serde_json::json!({ "count": count }),
                )
                .await?;
        }
        None => {
            let stack = ResourceStack {
                resource_stack_id: ResourceStack::mint_id(resource),
                resource,
                owner: owner.clone(),
                holder_building: building.clone(),
                count: amount,
            };
            store.create(Table::Resources, &stack).await?;
        }
    }
    Ok(())
}

/// Order a citizen pair canonically (lexicographic by username).
fn ordered_pair<'a>(a: &'a Username, b: &'a Username) -> (&'a Username, &'a Username) {
    if a.as_str() <= b.as_str() { (a, b) } else { (b, a) }
}

/// Shift the trust score between two citizens, clamped to `[-100, 100]`.
///
/// Creates the relationship row on first contact; strength grows by one
/// per adjustment as an interaction count.
pub async fn adjust_trust(
    store: &RecordStore,
    a: &Username,
    b: &Username,
    delta: Decimal,
    reason: &str,
    at: DateTime<Utc>,
) -> Result<(), EngineError> {
    let (first, second) = ordered_pair(a, b);
    let existing: Option<Record<Relationship>> = store
        .find_first(
            Table::Relationships,
            &Filter::and([
                Filter::eq("citizen_a", first.as_str()),
                Filter::eq("citizen_b", second.as_str()),
            ]),
        )
        .await?;

    match existing {
        Some(record) => {
            let trust = record
                .fields
                .trust
                .saturating_add(delta)
                .clamp(trust_min(), trust_max());
            let strength = record.fields.strength.saturating_add(Decimal::ONE);
            store
                .update_fields(
                    Table::Relationships,
                    &record.id,
                    serde_json::json!({ "trust": trust, "strength": strength }),
                )
                .await?;
        }
        None => {
            let relationship = Relationship {
                citizen_a: first.clone(),
                citizen_b: second.clone(),
                trust: delta.clamp(trust_min(), trust_max()),
                strength: Decimal::ONE,
                title: None,
                description: None,
            };
            store.create(Table::Relationships, &relationship).await?;
        }
    }

    audit(
        store,
        a,
        reason,
        format!("Trust with {b} adjusted by {delta}"),
        at,
    )
    .await?;
    Ok(())
}

/// Write one audit notification row.
async fn audit(
    store: &RecordStore,
    citizen: &Username,
    reason: &str,
    content: String,
    at: DateTime<Utc>,
) -> Result<(), EngineError> {
    let note = Notification {
        notification_id: Notification::mint_id(),
        citizen: citizen.clone(),
        reason: reason.to_owned(),
        content,
        at,
    };
    store.create(Table::Notifications, &note).await?;
    Ok(())
}
