//! Activity creators.
//!
//! Each creator resolves the citizen (and target building where the type
//! needs one), computes the window via [`timing::compute_window`], and
//! performs exactly one insert. Missing references reject before any
//! write, so no partial state is possible.
//!
//! [`timing::compute_window`]: crate::timing::compute_window

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use serenissima_store::{Filter, Record, RecordStore};
use serenissima_types::{
    Activity, ActivityDetails, ActivityStatus, ActivityType, Building, BuildingId, Position,
    StratagemStatus, Table, Username,
};

use crate::effects::require_citizen;
use crate::error::EngineError;
use crate::stratagems::collective_delivery::load_stratagem;
use crate::timing::{compute_window, WindowRequest};

/// Creates activity records against one store, with an injectable clock.
#[derive(Debug, Clone)]
pub struct Creator<'a> {
    store: &'a RecordStore,
    now: DateTime<Utc>,
}

impl<'a> Creator<'a> {
    /// A creator stamping windows from the wall clock.
    pub fn new(store: &'a RecordStore) -> Self {
        Self {
            store,
            now: Utc::now(),
        }
    }

    /// A creator with a fixed clock, for schedulers and tests.
    pub const fn at(store: &'a RecordStore, now: DateTime<Utc>) -> Self {
        Self { store, now }
    }

    /// Travel to a building.
    ///
    /// `path` is waypoint data from the routing service, stored for the
    /// movement display; the route's own window (inside `window`) takes
    /// precedence over defaults.
    pub async fn goto_location(
        &self,
        citizen: &Username,
        to_building: &BuildingId,
        window: WindowRequest,
        path: Vec<Position>,
    ) -> Result<Record<Activity>, EngineError> {
        let citizen_record = require_citizen(self.store, citizen).await?;
        let building = self.require_building(to_building).await?;

        let (start, end) = compute_window(
            self.now,
            window,
            ActivityType::GotoLocation,
            citizen_record.fields.social_class,
        );
        let activity = Activity {
            activity_id: Activity::mint_id(ActivityType::GotoLocation),
            activity_type: ActivityType::GotoLocation,
            citizen: citizen.clone(),
            from_building: None,
            to_building: Some(to_building.clone()),
            start,
            end,
            status: ActivityStatus::Created,
            title: format!("Walking to {}", building.fields.name),
            description: format!(
                "{citizen} is making their way to {}.",
                building.fields.name
            ),
            details: ActivityDetails::Goto { path },
        };
        self.insert(activity).await
    }

    /// Fish from a jetty near `from_building`, if one is given.
    pub async fn fishing(
        &self,
        citizen: &Username,
        from_building: Option<BuildingId>,
        window: WindowRequest,
        expected_catch: u32,
    ) -> Result<Record<Activity>, EngineError> {
        let citizen_record = require_citizen(self.store, citizen).await?;
        if let Some(building) = &from_building {
            self.require_building(building).await?;
        }

        let (start, end) = compute_window(
            self.now,
            window,
            ActivityType::Fishing,
            citizen_record.fields.social_class,
        );
        let activity = Activity {
            activity_id: Activity::mint_id(ActivityType::Fishing),
            activity_type: ActivityType::Fishing,
            citizen: citizen.clone(),
            from_building,
            to_building: None,
            start,
            end,
            status: ActivityStatus::Created,
            title: "Fishing the lagoon".to_owned(),
            description: format!("{citizen} sets out across the lagoon with rod and net."),
            details: ActivityDetails::Fishing { expected_catch },
        };
        self.insert(activity).await
    }

    /// Inspect and operate a public dock.
    ///
    /// Besides the activity insert, this stamps the dock's `checked_at`
    /// timestamp so harbor reports can find unattended docks.
    pub async fn manage_public_dock(
        &self,
        citizen: &Username,
        dock: &BuildingId,
        window: WindowRequest,
        inspection_fee: Decimal,
    ) -> Result<Record<Activity>, EngineError> {
        let citizen_record = require_citizen(self.store, citizen).await?;
        let dock_record = self.require_building(dock).await?;

        let (start, end) = compute_window(
            self.now,
            window,
            ActivityType::ManagePublicDock,
            citizen_record.fields.social_class,
        );
        let activity = Activity {
            activity_id: Activity::mint_id(ActivityType::ManagePublicDock),
            activity_type: ActivityType::ManagePublicDock,
            citizen: citizen.clone(),
            from_building: None,
            to_building: Some(dock.clone()),
            start,
            end,
            status: ActivityStatus::Created,
            title: format!("Managing {}", dock_record.fields.name),
            description: format!(
                "{citizen} oversees moorings and fees at {}.",
                dock_record.fields.name
            ),
            details: ActivityDetails::DockManagement { inspection_fee },
        };
        let created = self.insert(activity).await?;

        self.store
            .update_fields(
                Table::Buildings,
                &dock_record.id,
                serde_json::json!({ "checked_at": self.now }),
            )
            .await?;
        Ok(created)
    }

    /// Declare participation in a collective delivery stratagem.
    pub async fn join_collective_delivery(
        &self,
        citizen: &Username,
        stratagem_id: &str,
    ) -> Result<Record<Activity>, EngineError> {
        let citizen_record = require_citizen(self.store, citizen).await?;
        let stratagem = self.require_active_stratagem(stratagem_id).await?;

        let (start, end) = compute_window(
            self.now,
            WindowRequest::default(),
            ActivityType::JoinCollectiveDelivery,
            citizen_record.fields.social_class,
        );
        let activity = Activity {
            activity_id: Activity::mint_id(ActivityType::JoinCollectiveDelivery),
            activity_type: ActivityType::JoinCollectiveDelivery,
            citizen: citizen.clone(),
            from_building: None,
            to_building: Some(stratagem.fields.target_building.clone()),
            start,
            end,
            status: ActivityStatus::Created,
            title: "Joining a collective delivery".to_owned(),
            description: format!(
                "{citizen} answers {}'s call for {} deliveries.",
                stratagem.fields.executor,
                stratagem.fields.resource.as_str()
            ),
            details: ActivityDetails::CollectiveDelivery {
                stratagem_id: stratagem_id.to_owned(),
                resource: stratagem.fields.resource,
                amount: 0,
            },
        };
        self.insert(activity).await
    }

    /// Carry `amount` units from `from_building` to the stratagem's
    /// target building.
    pub async fn deliver_to_building(
        &self,
        citizen: &Username,
        stratagem_id: &str,
        amount: u32,
        from_building: &BuildingId,
        window: WindowRequest,
    ) -> Result<Record<Activity>, EngineError> {
        if amount == 0 {
            return Err(EngineError::validation("delivery amount must be positive"));
        }
        let citizen_record = require_citizen(self.store, citizen).await?;
        self.require_building(from_building).await?;
        let stratagem = self.require_active_stratagem(stratagem_id).await?;

        let (start, end) = compute_window(
            self.now,
            window,
            ActivityType::DeliverToBuilding,
            citizen_record.fields.social_class,
        );
        let activity = Activity {
            activity_id: Activity::mint_id(ActivityType::DeliverToBuilding),
            activity_type: ActivityType::DeliverToBuilding,
            citizen: citizen.clone(),
            from_building: Some(from_building.clone()),
            to_building: Some(stratagem.fields.target_building.clone()),
            start,
            end,
            status: ActivityStatus::Created,
            title: format!(
                "Delivering {} {}",
                amount,
                stratagem.fields.resource.as_str()
            ),
            description: format!(
                "{citizen} hauls {amount} {} toward {}.",
                stratagem.fields.resource.as_str(),
                stratagem.fields.target_building
            ),
            details: ActivityDetails::CollectiveDelivery {
                stratagem_id: stratagem_id.to_owned(),
                resource: stratagem.fields.resource,
                amount,
            },
        };
        self.insert(activity).await
    }

    /// Resolve a building reference, or reject before any write.
    async fn require_building(
        &self,
        building: &BuildingId,
    ) -> Result<Record<Building>, EngineError> {
        Ok(self
            .store
            .require(
                Table::Buildings,
                &Filter::eq("building_id", building.as_str()),
                building.as_str(),
            )
            .await?)
    }

    /// Resolve a stratagem and insist it is still accepting activities.
    async fn require_active_stratagem(
        &self,
        stratagem_id: &str,
    ) -> Result<Record<serenissima_types::Stratagem>, EngineError> {
        let record = load_stratagem(self.store, stratagem_id).await?;
        if record.fields.status != StratagemStatus::Active {
            return Err(EngineError::validation(format!(
                "stratagem {stratagem_id} is not active"
            )));
        }
        Ok(record)
    }

    /// The single insert every creator funnels through.
    async fn insert(&self, activity: Activity) -> Result<Record<Activity>, EngineError> {
        debug_assert!(activity.start <= activity.end);
        let record = self.store.create(Table::Activities, &activity).await?;
        tracing::info!(
            activity_id = %record.fields.activity_id,
            activity_type = record.fields.activity_type.as_str(),
            citizen = %record.fields.citizen,
            "Created activity"
        );
        Ok(record)
    }
}
