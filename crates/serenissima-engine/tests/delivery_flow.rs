//! End-to-end lifecycle tests against the in-memory store.
//!
//! Each test seeds citizens, buildings, and stock, runs creators and
//! processors with fixed clocks, and asserts on the resulting rows. No
//! live services are needed.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::items_after_statements,
    clippy::missing_panics_doc,
    clippy::too_many_lines
)]

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use serenissima_engine::creators::Creator;
use serenissima_engine::processors::{ProcessOutcome, Processor};
use serenissima_engine::stratagems::collective_delivery::{
    self, CreateCollectiveDelivery, JoinOutcome,
};
use serenissima_engine::{EngineError, RouteWindow, WindowRequest};
use serenissima_store::{Filter, Record, RecordStore};
use serenissima_types::{
    Activity, ActivityStatus, Building, BuildingId, Citizen, Position, ResourceStack,
    ResourceType, SocialClass, StratagemParticipant, StratagemStatus, Table, Username,
};

fn citizen(username: &str, ducats: i64) -> Citizen {
    Citizen {
        username: Username::from(username),
        first_name: "Marco".to_owned(),
        last_name: "Contarini".to_owned(),
        ducats: Decimal::from(ducats),
        social_class: SocialClass::Popolani,
        position: None,
        hungry: true,
        is_ai: true,
    }
}

fn building(id: &str) -> Building {
    Building {
        building_id: BuildingId::from(id),
        name: format!("Warehouse {id}"),
        position: None,
        checked_at: None,
    }
}

fn stack(owner: &str, resource: ResourceType, count: u32, building: &str) -> ResourceStack {
    ResourceStack {
        resource_stack_id: ResourceStack::mint_id(resource),
        resource,
        owner: Username::from(owner),
        holder_building: BuildingId::from(building),
        count,
    }
}

/// Seed a store with an executor, a deliverer holding paper at `depot`,
/// and an active paper stratagem targeting `target`. Returns the
/// stratagem's business id.
async fn seed_delivery_world(
    store: &RecordStore,
    now: DateTime<Utc>,
    depot: &str,
    target: &str,
) -> String {
    store
        .create(Table::Citizens, &citizen("ConsiglioDeiDieci", 10_000))
        .await
        .unwrap();
    store
        .create(Table::Citizens, &citizen("TechnoMedici", 100))
        .await
        .unwrap();
    store.create(Table::Buildings, &building(depot)).await.unwrap();
    store.create(Table::Buildings, &building(target)).await.unwrap();
    store
        .create(
            Table::Resources,
            &stack("TechnoMedici", ResourceType::Paper, 18, depot),
        )
        .await
        .unwrap();

    let record = collective_delivery::create(
        store,
        CreateCollectiveDelivery {
            executor: Username::from("ConsiglioDeiDieci"),
            target_building: BuildingId::from(target),
            resource: ResourceType::Paper,
            target_amount: 50,
            reward_per_unit: Decimal::from(25),
            duration_hours: 24,
        },
        now,
    )
    .await
    .unwrap();
    record.fields.stratagem_id
}

async fn stack_count(store: &RecordStore, owner: &str, building: &str) -> u32 {
    let stacks: Vec<Record<ResourceStack>> = store
        .list(
            Table::Resources,
            &Filter::and([
                Filter::eq("owner", owner),
                Filter::eq("holder_building", building),
            ]),
        )
        .await
        .unwrap();
    stacks.iter().map(|s| s.fields.count).sum()
}

async fn ducats(store: &RecordStore, username: &str) -> Decimal {
    let record: Record<Citizen> = store
        .require(Table::Citizens, &Filter::eq("username", username), username)
        .await
        .unwrap();
    record.fields.ducats
}

// =============================================================================
// The full delivery flow
// =============================================================================

#[tokio::test]
async fn delivery_moves_stock_and_pays_reward() {
    let store = RecordStore::in_memory();
    let now = Utc::now();
    let stratagem_id = seed_delivery_world(&store, now, "bld_depot", "bld_target").await;

    let creator = Creator::at(&store, now);
    let record = creator
        .deliver_to_building(
            &Username::from("TechnoMedici"),
            &stratagem_id,
            10,
            &BuildingId::from("bld_depot"),
            WindowRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(record.fields.status, ActivityStatus::Created);
    assert!(record.fields.start <= record.fields.end);

    // Nothing moves until the window closes.
    assert_eq!(stack_count(&store, "TechnoMedici", "bld_depot").await, 18);

    let later = now + Duration::hours(2);
    let processor = Processor::at(&store, later);
    let outcome = processor.process(&record).await.unwrap();
    assert_eq!(outcome, ProcessOutcome::Applied);

    // Stock relocated.
    assert_eq!(stack_count(&store, "TechnoMedici", "bld_depot").await, 8);
    assert_eq!(stack_count(&store, "TechnoMedici", "bld_target").await, 10);

    // Reward paid from the executor's purse: 10 units x 25 ducats.
    assert_eq!(ducats(&store, "TechnoMedici").await, Decimal::from(350));
    assert_eq!(ducats(&store, "ConsiglioDeiDieci").await, Decimal::from(9_750));

    // Participant row and stratagem total both reflect the delivery.
    let participant: Record<StratagemParticipant> = store
        .require(
            Table::StratagemParticipants,
            &Filter::and([
                Filter::eq("stratagem_id", stratagem_id.as_str()),
                Filter::eq("username", "TechnoMedici"),
            ]),
            &stratagem_id,
        )
        .await
        .unwrap();
    assert_eq!(participant.fields.amount_delivered, 10);
    assert_eq!(participant.fields.reward_earned, Decimal::from(250));

    let stratagem = collective_delivery::load_stratagem(&store, &stratagem_id)
        .await
        .unwrap();
    assert_eq!(stratagem.fields.collected_amount, 10);
    assert_eq!(stratagem.fields.status, StratagemStatus::Active);
}

#[tokio::test]
async fn reprocessing_a_terminal_activity_applies_nothing() {
    let store = RecordStore::in_memory();
    let now = Utc::now();
    let stratagem_id = seed_delivery_world(&store, now, "bld_depot", "bld_target").await;

    let creator = Creator::at(&store, now);
    let created = creator
        .deliver_to_building(
            &Username::from("TechnoMedici"),
            &stratagem_id,
            10,
            &BuildingId::from("bld_depot"),
            WindowRequest::default(),
        )
        .await
        .unwrap();

    let later = now + Duration::hours(2);
    let processor = Processor::at(&store, later);
    assert_eq!(
        processor.process(&created).await.unwrap(),
        ProcessOutcome::Applied
    );

    // Re-fetch the stored record (now `processed`) and process again.
    let stored: Record<Activity> = store
        .require(
            Table::Activities,
            &Filter::eq("activity_id", created.fields.activity_id.as_str()),
            &created.fields.activity_id,
        )
        .await
        .unwrap();
    assert_eq!(stored.fields.status, ActivityStatus::Processed);
    assert_eq!(
        processor.process(&stored).await.unwrap(),
        ProcessOutcome::AlreadyTerminal
    );

    // No double effects: stock and purses unchanged from the first pass.
    assert_eq!(stack_count(&store, "TechnoMedici", "bld_depot").await, 8);
    assert_eq!(ducats(&store, "TechnoMedici").await, Decimal::from(350));

    // A full pass over due activities also skips it.
    let report = processor.process_due().await.unwrap();
    assert_eq!(report.applied, 0);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn insufficient_stock_parks_the_activity_in_failed() {
    let store = RecordStore::in_memory();
    let now = Utc::now();
    let stratagem_id = seed_delivery_world(&store, now, "bld_depot", "bld_target").await;

    // The deliverer only holds 18 paper; promise 30.
    let creator = Creator::at(&store, now);
    let created = creator
        .deliver_to_building(
            &Username::from("TechnoMedici"),
            &stratagem_id,
            30,
            &BuildingId::from("bld_depot"),
            WindowRequest::default(),
        )
        .await
        .unwrap();

    let processor = Processor::at(&store, now + Duration::hours(2));
    let err = processor.process(&created).await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock { .. }));
    assert!(!err.is_retryable());

    let stored: Record<Activity> = store
        .require(
            Table::Activities,
            &Filter::eq("activity_id", created.fields.activity_id.as_str()),
            &created.fields.activity_id,
        )
        .await
        .unwrap();
    assert_eq!(stored.fields.status, ActivityStatus::Failed);

    // The failed attempt moved nothing.
    assert_eq!(stack_count(&store, "TechnoMedici", "bld_depot").await, 18);
    assert_eq!(ducats(&store, "ConsiglioDeiDieci").await, Decimal::from(10_000));
}

#[tokio::test]
async fn reaching_the_target_completes_the_stratagem() {
    let store = RecordStore::in_memory();
    let now = Utc::now();
    store
        .create(Table::Citizens, &citizen("ConsiglioDeiDieci", 10_000))
        .await
        .unwrap();
    store
        .create(Table::Citizens, &citizen("TechnoMedici", 0))
        .await
        .unwrap();
    store.create(Table::Buildings, &building("bld_a")).await.unwrap();
    store.create(Table::Buildings, &building("bld_b")).await.unwrap();
    store
        .create(
            Table::Resources,
            &stack("TechnoMedici", ResourceType::Grain, 12, "bld_a"),
        )
        .await
        .unwrap();

    let record = collective_delivery::create(
        &store,
        CreateCollectiveDelivery {
            executor: Username::from("ConsiglioDeiDieci"),
            target_building: BuildingId::from("bld_b"),
            resource: ResourceType::Grain,
            target_amount: 10,
            reward_per_unit: Decimal::ONE,
            duration_hours: 24,
        },
        now,
    )
    .await
    .unwrap();
    let stratagem_id = record.fields.stratagem_id;

    collective_delivery::deliver(
        &store,
        &stratagem_id,
        &Username::from("TechnoMedici"),
        10,
        &BuildingId::from("bld_a"),
        now,
    )
    .await
    .unwrap();

    let stratagem = collective_delivery::load_stratagem(&store, &stratagem_id)
        .await
        .unwrap();
    assert_eq!(stratagem.fields.collected_amount, 10);
    assert_eq!(stratagem.fields.status, StratagemStatus::Completed);

    // A completed stratagem accepts no further work.
    let join = collective_delivery::join(
        &store,
        &stratagem_id,
        &Username::from("ConsiglioDeiDieci"),
        now,
    )
    .await
    .unwrap();
    assert_eq!(join, JoinOutcome::NotActive);
}

// =============================================================================
// Joining
// =============================================================================

#[tokio::test]
async fn joining_twice_creates_one_participant_row() {
    let store = RecordStore::in_memory();
    let now = Utc::now();
    let stratagem_id = seed_delivery_world(&store, now, "bld_depot", "bld_target").await;
    let techno = Username::from("TechnoMedici");

    assert_eq!(
        collective_delivery::join(&store, &stratagem_id, &techno, now)
            .await
            .unwrap(),
        JoinOutcome::Joined
    );
    assert_eq!(
        collective_delivery::join(&store, &stratagem_id, &techno, now)
            .await
            .unwrap(),
        JoinOutcome::AlreadyJoined
    );

    let rows: Vec<Record<StratagemParticipant>> = store
        .list(
            Table::StratagemParticipants,
            &Filter::eq("stratagem_id", stratagem_id.as_str()),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    let row = rows.first().unwrap();
    assert_eq!(row.fields.trust_at_join, Decimal::ZERO);
}

// =============================================================================
// Conclusion
// =============================================================================

#[tokio::test]
async fn expiry_wins_over_completion() {
    let store = RecordStore::in_memory();
    let now = Utc::now();
    let stratagem_id = seed_delivery_world(&store, now, "bld_depot", "bld_target").await;

    // Well past the 24 hour window.
    let status = collective_delivery::conclude(&store, &stratagem_id, now + Duration::hours(48))
        .await
        .unwrap();
    assert_eq!(status, StratagemStatus::Expired);

    // Concluding again returns the stored terminal status unchanged.
    let again = collective_delivery::conclude(&store, &stratagem_id, now + Duration::hours(72))
        .await
        .unwrap();
    assert_eq!(again, StratagemStatus::Expired);
}

#[tokio::test]
async fn only_the_executor_may_cancel() {
    let store = RecordStore::in_memory();
    let now = Utc::now();
    let stratagem_id = seed_delivery_world(&store, now, "bld_depot", "bld_target").await;

    let err = collective_delivery::cancel(&store, &stratagem_id, &Username::from("TechnoMedici"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation { .. }));

    collective_delivery::cancel(
        &store,
        &stratagem_id,
        &Username::from("ConsiglioDeiDieci"),
    )
    .await
    .unwrap();

    let stratagem = collective_delivery::load_stratagem(&store, &stratagem_id)
        .await
        .unwrap();
    assert_eq!(stratagem.fields.status, StratagemStatus::Cancelled);

    // Cancelling a cancelled stratagem is an explicit error.
    let err = collective_delivery::cancel(
        &store,
        &stratagem_id,
        &Username::from("ConsiglioDeiDieci"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyTerminal { .. }));
}

// =============================================================================
// Other activity effects
// =============================================================================

#[tokio::test]
async fn fishing_lands_the_catch_and_clears_hunger() {
    let store = RecordStore::in_memory();
    let now = Utc::now();
    store
        .create(Table::Citizens, &citizen("TechnoMedici", 0))
        .await
        .unwrap();
    store.create(Table::Buildings, &building("bld_jetty")).await.unwrap();

    let creator = Creator::at(&store, now);
    let created = creator
        .fishing(
            &Username::from("TechnoMedici"),
            Some(BuildingId::from("bld_jetty")),
            WindowRequest::default(),
            3,
        )
        .await
        .unwrap();

    let processor = Processor::at(&store, now + Duration::hours(3));
    assert_eq!(
        processor.process(&created).await.unwrap(),
        ProcessOutcome::Applied
    );

    assert_eq!(stack_count(&store, "TechnoMedici", "bld_jetty").await, 3);
    let fisher: Record<Citizen> = store
        .require(
            Table::Citizens,
            &Filter::eq("username", "TechnoMedici"),
            "TechnoMedici",
        )
        .await
        .unwrap();
    assert!(!fisher.fields.hungry);
}

#[tokio::test]
async fn dock_management_stamps_the_dock_and_credits_the_fee() {
    let store = RecordStore::in_memory();
    let now = Utc::now();
    store
        .create(Table::Citizens, &citizen("TechnoMedici", 100))
        .await
        .unwrap();
    store.create(Table::Buildings, &building("bld_dock")).await.unwrap();

    let creator = Creator::at(&store, now);
    let created = creator
        .manage_public_dock(
            &Username::from("TechnoMedici"),
            &BuildingId::from("bld_dock"),
            WindowRequest::default(),
            Decimal::from(40),
        )
        .await
        .unwrap();

    // The inspection timestamp lands at creation, not at processing.
    let dock: Record<Building> = store
        .require(
            Table::Buildings,
            &Filter::eq("building_id", "bld_dock"),
            "bld_dock",
        )
        .await
        .unwrap();
    assert_eq!(dock.fields.checked_at, Some(now));
    assert_eq!(ducats(&store, "TechnoMedici").await, Decimal::from(100));

    let processor = Processor::at(&store, now + Duration::hours(2));
    assert_eq!(
        processor.process(&created).await.unwrap(),
        ProcessOutcome::Applied
    );
    assert_eq!(ducats(&store, "TechnoMedici").await, Decimal::from(140));
}

#[tokio::test]
async fn goto_arrival_moves_the_citizen_to_the_destination() {
    let store = RecordStore::in_memory();
    let now = Utc::now();
    store
        .create(Table::Citizens, &citizen("TechnoMedici", 0))
        .await
        .unwrap();
    let rialto = Building {
        building_id: BuildingId::from("bld_rialto"),
        name: "Rialto Bridge".to_owned(),
        position: Some(Position {
            lat: 45.4380,
            lng: 12.3359,
        }),
        checked_at: None,
    };
    store.create(Table::Buildings, &rialto).await.unwrap();

    let creator = Creator::at(&store, now);
    let created = creator
        .goto_location(
            &Username::from("TechnoMedici"),
            &BuildingId::from("bld_rialto"),
            WindowRequest::default(),
            Vec::new(),
        )
        .await
        .unwrap();

    let processor = Processor::at(&store, now + Duration::hours(1));
    assert_eq!(
        processor.process(&created).await.unwrap(),
        ProcessOutcome::Applied
    );

    let walker: Record<Citizen> = store
        .require(
            Table::Citizens,
            &Filter::eq("username", "TechnoMedici"),
            "TechnoMedici",
        )
        .await
        .unwrap();
    assert_eq!(walker.fields.position, rialto.position);
}

#[tokio::test]
async fn activities_ending_exactly_now_are_due() {
    let store = RecordStore::in_memory();
    let now = chrono::DateTime::parse_from_rfc3339("2026-08-30T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    store
        .create(Table::Citizens, &citizen("TechnoMedici", 0))
        .await
        .unwrap();

    // A round-second window closing exactly at the processing instant.
    let window = WindowRequest {
        explicit_start: None,
        explicit_duration_minutes: None,
        route: Some(RouteWindow {
            start: now - Duration::hours(1),
            end: now,
        }),
    };
    let creator = Creator::at(&store, now - Duration::hours(1));
    creator
        .fishing(&Username::from("TechnoMedici"), None, window, 2)
        .await
        .unwrap();

    let report = Processor::at(&store, now).process_due().await.unwrap();
    assert_eq!(report.applied, 1);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn short_executor_purse_fails_before_any_stock_moves() {
    let store = RecordStore::in_memory();
    let now = Utc::now();
    store
        .create(Table::Citizens, &citizen("ConsiglioDeiDieci", 5))
        .await
        .unwrap();
    store
        .create(Table::Citizens, &citizen("TechnoMedici", 100))
        .await
        .unwrap();
    store.create(Table::Buildings, &building("bld_depot")).await.unwrap();
    store.create(Table::Buildings, &building("bld_target")).await.unwrap();
    store
        .create(
            Table::Resources,
            &stack("TechnoMedici", ResourceType::Paper, 18, "bld_depot"),
        )
        .await
        .unwrap();
    let record = collective_delivery::create(
        &store,
        CreateCollectiveDelivery {
            executor: Username::from("ConsiglioDeiDieci"),
            target_building: BuildingId::from("bld_target"),
            resource: ResourceType::Paper,
            target_amount: 50,
            reward_per_unit: Decimal::from(25),
            duration_hours: 24,
        },
        now,
    )
    .await
    .unwrap();

    let err = collective_delivery::deliver(
        &store,
        &record.fields.stratagem_id,
        &Username::from("TechnoMedici"),
        10,
        &BuildingId::from("bld_depot"),
        now,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds { .. }));

    // No goods moved and no ducats changed hands.
    assert_eq!(stack_count(&store, "TechnoMedici", "bld_depot").await, 18);
    assert_eq!(stack_count(&store, "TechnoMedici", "bld_target").await, 0);
    assert_eq!(ducats(&store, "ConsiglioDeiDieci").await, Decimal::from(5));
    assert_eq!(ducats(&store, "TechnoMedici").await, Decimal::from(100));

    let stratagem = collective_delivery::load_stratagem(&store, &record.fields.stratagem_id)
        .await
        .unwrap();
    assert_eq!(stratagem.fields.collected_amount, 0);
}

#[tokio::test]
async fn creating_against_a_missing_citizen_rejects_before_any_write() {
    let store = RecordStore::in_memory();
    let creator = Creator::at(&store, Utc::now());

    let err = creator
        .fishing(
            &Username::from("Nobody"),
            None,
            WindowRequest::default(),
            1,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Store(_)));

    let rows: Vec<Record<Activity>> =
        store.list(Table::Activities, &Filter::All).await.unwrap();
    assert!(rows.is_empty());
}
