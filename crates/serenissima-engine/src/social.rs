//! Canonical relationship classification.
//!
//! Two earlier tools classified relationships with different threshold
//! tables and even disagreed on the default title's pluralization. This
//! module is now the single source of truth: one ordered decision table
//! over (strength, trust), first matching rule wins, one default.
//!
//! Classification is a pure function -- same scores, same title -- so the
//! narrative pass can re-run it at any time without drift.

use rust_decimal::Decimal;

use serenissima_store::{Record, RecordStore};
use serenissima_types::{Relationship, Table};

use crate::error::EngineError;

/// The default title when no rule matches.
const DEFAULT_TITLE: &str = "Distant Acquaintances";

/// Threshold above which a bond counts as deep.
fn strength_deep() -> Decimal {
    Decimal::from(300)
}

/// Threshold above which a bond counts as established.
fn strength_established() -> Decimal {
    Decimal::from(100)
}

/// Threshold above which a bond counts as forming.
fn strength_forming() -> Decimal {
    Decimal::from(30)
}

/// Trust above this is warm.
fn trust_warm() -> Decimal {
    Decimal::from(30)
}

/// Trust below this is hostile.
fn trust_hostile() -> Decimal {
    Decimal::from(-30)
}

/// Trust below this is open enmity.
fn trust_enmity() -> Decimal {
    Decimal::from(-100)
}

/// Map (strength, trust) onto a relationship title.
///
/// The rules are evaluated top to bottom; the first match wins.
pub fn determine_relationship_title(strength: Decimal, trust: Decimal) -> &'static str {
    if strength > strength_deep() && trust > trust_warm() {
        "Trusted Allies"
    } else if strength > strength_deep() && trust < trust_hostile() {
        "Bitter Rivals"
    } else if strength > strength_deep() {
        "Constant Companions"
    } else if strength > strength_established() && trust > trust_warm() {
        "Close Associates"
    } else if strength > strength_established() && trust < trust_hostile() {
        "Wary Partners"
    } else if strength > strength_established() {
        "Business Partners"
    } else if trust < trust_enmity() {
        "Definite Adversaries"
    } else if trust < trust_hostile() {
        "Adversaries"
    } else if strength > strength_forming() {
        "Occasional Contacts"
    } else {
        DEFAULT_TITLE
    }
}

/// Build the prose description for a relationship.
///
/// Deterministic string templating over the same threshold bands as the
/// title, with a closing clause when the pair share unresolved problems.
pub fn describe_relationship(
    strength: Decimal,
    trust: Decimal,
    shared_problems: &[String],
) -> String {
    let bond = if strength > strength_deep() {
        "Their paths cross daily, and each knows the rhythm of the other's affairs"
    } else if strength > strength_established() {
        "Their dealings are frequent enough that each keeps the other in mind"
    } else if strength > strength_forming() {
        "They know each other by name and by reputation"
    } else {
        "They have crossed paths only rarely"
    };

    let temper = if trust > trust_warm() {
        "and there is genuine confidence between them."
    } else if trust < trust_enmity() {
        "and neither would hesitate to move against the other."
    } else if trust < trust_hostile() {
        "but each watches the other with suspicion."
    } else {
        "though neither has yet had reason to rely on the other."
    };

    let mut description = format!("{bond}, {temper}");
    if !shared_problems.is_empty() {
        description.push_str(&format!(
            " {} unresolved matter{} weigh on them both.",
            shared_problems.len(),
            if shared_problems.len() == 1 { "" } else { "s" }
        ));
    }
    description
}

/// Refresh one relationship row's cached title and description.
pub async fn refresh_relationship(
    store: &RecordStore,
    record: &Record<Relationship>,
    shared_problems: &[String],
) -> Result<&'static str, EngineError> {
    let title = determine_relationship_title(record.fields.strength, record.fields.trust);
    let description =
        describe_relationship(record.fields.strength, record.fields.trust, shared_problems);
    store
        .update_fields(
            Table::Relationships,
            &record.id,
            serde_json::json!({ "title": title, "description": description }),
        )
        .await?;
    Ok(title)
}
