//! Activity processors.
//!
//! The entry condition is an explicit state-machine guard: only live
//! activities (`created`/`in_progress`) whose window has closed get their
//! effects applied. Re-invoking a processor on a terminal activity is a
//! success no-op, so a retrying orchestrator can never double-apply a
//! monetary or resource effect.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

use serenissima_store::{Filter, Record, RecordStore};
use serenissima_types::{
    Activity, ActivityDetails, ActivityStatus, ActivityType, Table, Username,
};

use crate::effects;
use crate::error::EngineError;
use crate::stratagems::collective_delivery::{self, DeliveryOutcome};

/// Trust gained with the executor per completed delivery.
fn delivery_trust_delta() -> Decimal {
    Decimal::ONE
}

/// What a processor invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Effects were applied and the activity advanced to `processed`.
    Applied,
    /// The activity was already terminal; nothing was touched.
    AlreadyTerminal,
    /// The window has not closed yet; nothing was touched.
    NotDue,
}

/// Tally of one processing pass over due activities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Activities whose effects were applied this pass.
    pub applied: usize,
    /// Activities skipped because they were already terminal.
    pub already_terminal: usize,
    /// Activities whose processing failed; they remain due, and the error
    /// was logged with its retryability.
    pub failed: usize,
}

/// Processes activity records against one store, with an injectable clock.
#[derive(Debug, Clone)]
pub struct Processor<'a> {
    store: &'a RecordStore,
    now: DateTime<Utc>,
}

impl<'a> Processor<'a> {
    /// A processor judging windows against the wall clock.
    pub fn new(store: &'a RecordStore) -> Self {
        Self {
            store,
            now: Utc::now(),
        }
    }

    /// A processor with a fixed clock, for schedulers and tests.
    pub const fn at(store: &'a RecordStore, now: DateTime<Utc>) -> Self {
        Self { store, now }
    }

    /// Process one activity record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if an effect fails. Business failures
    /// (insufficient stock or funds) additionally move the activity to
    /// `failed` so the pass does not pick it up forever; transient store
    /// failures leave the record untouched for retry.
    pub async fn process(
        &self,
        record: &Record<Activity>,
    ) -> Result<ProcessOutcome, EngineError> {
        let activity = &record.fields;
        if activity.status.is_terminal() {
            tracing::debug!(
                activity_id = %activity.activity_id,
                status = ?activity.status,
                "Activity already terminal; nothing to do"
            );
            return Ok(ProcessOutcome::AlreadyTerminal);
        }
        if activity.end > self.now {
            return Ok(ProcessOutcome::NotDue);
        }

        match self.apply_effects(activity).await {
            Ok(()) => {
                self.advance(record, ActivityStatus::Processed).await?;
                tracing::info!(
                    activity_id = %activity.activity_id,
                    activity_type = activity.activity_type.as_str(),
                    citizen = %activity.citizen,
                    "Processed activity"
                );
                Ok(ProcessOutcome::Applied)
            }
            Err(e) if e.is_retryable() => Err(e),
            Err(e) => {
                // A business failure will reproduce on every retry; park
                // the activity in `failed` and surface the error.
                self.advance(record, ActivityStatus::Failed).await?;
                Err(e)
            }
        }
    }

    /// Process every due activity: live status, window closed.
    ///
    /// Individual failures are logged and counted; the pass continues, so
    /// one bad record cannot starve the rest of the queue.
    pub async fn process_due(&self) -> Result<ProcessReport, EngineError> {
        // Stored timestamps serialize with a `Z` suffix; the comparison
        // value must use the identical format or the lexicographic `lte`
        // misorders against a `+00:00` rendering.
        let due = Filter::and([
            Filter::or([
                Filter::eq("status", "created"),
                Filter::eq("status", "in_progress"),
            ]),
            Filter::lte(
                "end",
                self.now.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ),
        ]);
        let records: Vec<Record<Activity>> =
            self.store.list(Table::Activities, &due).await?;

        let mut report = ProcessReport::default();
        for record in &records {
            match self.process(record).await {
                Ok(ProcessOutcome::Applied) => {
                    report.applied = report.applied.saturating_add(1);
                }
                Ok(ProcessOutcome::AlreadyTerminal) => {
                    report.already_terminal = report.already_terminal.saturating_add(1);
                }
                Ok(ProcessOutcome::NotDue) => {}
                Err(e) => {
                    report.failed = report.failed.saturating_add(1);
                    tracing::warn!(
                        activity_id = %record.fields.activity_id,
                        citizen = %record.fields.citizen,
                        retryable = e.is_retryable(),
                        error = %e,
                        "Activity processing failed"
                    );
                }
            }
        }
        tracing::info!(
            applied = report.applied,
            already_terminal = report.already_terminal,
            failed = report.failed,
            "Processing pass complete"
        );
        Ok(report)
    }

    /// Apply the type-specific effects of one live, due activity.
    async fn apply_effects(&self, activity: &Activity) -> Result<(), EngineError> {
        match (&activity.activity_type, &activity.details) {
            (ActivityType::GotoLocation, ActivityDetails::Goto { .. }) => {
                self.arrive(&activity.citizen, activity.to_building.as_ref())
                    .await
            }
            (ActivityType::Fishing, ActivityDetails::Fishing { expected_catch }) => {
                self.land_catch(activity, *expected_catch).await
            }
            (ActivityType::ManagePublicDock, ActivityDetails::DockManagement { inspection_fee }) => {
                effects::credit_ducats(
                    self.store,
                    &activity.citizen,
                    *inspection_fee,
                    "dock_management_fee",
                    self.now,
                )
                .await
            }
            (
                ActivityType::JoinCollectiveDelivery,
                ActivityDetails::CollectiveDelivery { stratagem_id, .. },
            ) => {
                // A join against a no-longer-active stratagem is trivially
                // successful; failing it forever helps nobody.
                collective_delivery::join(self.store, stratagem_id, &activity.citizen, self.now)
                    .await
                    .map(|_| ())
            }
            (
                ActivityType::DeliverToBuilding,
                ActivityDetails::CollectiveDelivery {
                    stratagem_id,
                    amount,
                    ..
                },
            ) => self.complete_delivery(activity, stratagem_id, *amount).await,
            (activity_type, details) => Err(EngineError::validation(format!(
                "activity {} has mismatched details for type {}: {details:?}",
                activity.activity_id,
                activity_type.as_str()
            ))),
        }
    }

    /// Goto effect: move the citizen to the destination's position.
    async fn arrive(
        &self,
        citizen: &Username,
        to_building: Option<&serenissima_types::BuildingId>,
    ) -> Result<(), EngineError> {
        let Some(building_id) = to_building else {
            return Err(EngineError::validation("goto activity has no destination"));
        };
        let building: Record<serenissima_types::Building> = self
            .store
            .require(
                Table::Buildings,
                &Filter::eq("building_id", building_id.as_str()),
                building_id.as_str(),
            )
            .await?;
        let citizen_record = effects::require_citizen(self.store, citizen).await?;
        self.store
            .update_fields(
                Table::Citizens,
                &citizen_record.id,
                serde_json::json!({ "position": building.fields.position }),
            )
            .await?;
        Ok(())
    }

    /// Fishing effect: land the catch and clear hunger.
    async fn land_catch(&self, activity: &Activity, catch: u32) -> Result<(), EngineError> {
        if let Some(building) = &activity.from_building {
            effects::grant_stack(
                self.store,
                &activity.citizen,
                serenissima_types::ResourceType::Fish,
                catch,
                building,
            )
            .await?;
        }
        let citizen_record = effects::require_citizen(self.store, &activity.citizen).await?;
        self.store
            .update_fields(
                Table::Citizens,
                &citizen_record.id,
                serde_json::json!({ "hungry": false }),
            )
            .await?;
        Ok(())
    }

    /// Delivery effect: relocate stock, pay the reward, shift trust.
    async fn complete_delivery(
        &self,
        activity: &Activity,
        stratagem_id: &str,
        amount: u32,
    ) -> Result<(), EngineError> {
        let Some(from_building) = &activity.from_building else {
            return Err(EngineError::validation(
                "delivery activity has no source building",
            ));
        };
        let outcome = collective_delivery::deliver(
            self.store,
            stratagem_id,
            &activity.citizen,
            amount,
            from_building,
            self.now,
        )
        .await?;
        if let DeliveryOutcome::Delivered { reward } = outcome {
            let stratagem = collective_delivery::load_stratagem(self.store, stratagem_id).await?;
            effects::adjust_trust(
                self.store,
                &activity.citizen,
                &stratagem.fields.executor,
                delivery_trust_delta(),
                "collective_delivery",
                self.now,
            )
            .await?;
            tracing::debug!(
                stratagem_id,
                citizen = %activity.citizen,
                %reward,
                "Delivery rewarded"
            );
        }
        Ok(())
    }

    /// Advance the stored record's status through the state machine.
    async fn advance(
        &self,
        record: &Record<Activity>,
        next: ActivityStatus,
    ) -> Result<(), EngineError> {
        let mut updated = record.fields.clone();
        updated.advance(next)?;
        self.store
            .replace(Table::Activities, &record.id, &updated)
            .await?;
        Ok(())
    }
}
