//! Round-trip persistence: serialize -> migrate (no-op at current version)
//! -> deserialize must reproduce the exact entry set, protection flags
//! included. Exercised against both the in-memory repository and SQLite.

use std::sync::Arc;
use std::time::Duration;

use tripsync::adapters::sqlite::{create_pool, SqliteSnapshotRepository};
use tripsync::domain::models::{AccommodationPatch, BudgetPreset, TravelerGroup};
use tripsync::services::{Instruction, PersistenceHandle, TripEngine};
use tripsync::InMemorySnapshotRepository;

mod common;
use common::leg;

fn populated_engine() -> TripEngine {
    let engine = TripEngine::default();
    engine.set_trip_type(tripsync::TripType::MultiCity);
    engine.finalize_flight_leg(leg("Boston", "Tokyo"));
    engine.finalize_flight_leg(leg("Tokyo", "Osaka"));
    let result = engine.apply_instruction(
        Instruction::accommodation(
            AccommodationPatch::default().budget_preset(BudgetPreset::Luxury),
        )
        .for_city("Tokyo"),
    );
    assert!(result.mutated(), "instruction must apply");
    engine.set_travelers(TravelerGroup::new(2, 1, 0)).unwrap();
    engine
}

fn assert_state_matches(original: &TripEngine, restored: &TripEngine) {
    assert_eq!(
        restored.accommodation().len(),
        original.accommodation().len()
    );
    let restored_store = restored.accommodation();
    let original_store = original.accommodation();
    let restored_tokyo = restored_store.by_city("Tokyo").unwrap();
    let original_tokyo = original_store.by_city("Tokyo").unwrap();
    assert_eq!(restored_tokyo, original_tokyo, "entries match exactly");
    assert!(restored_tokyo.protection.user_modified_budget);

    assert_eq!(restored.traveler().group(), original.traveler().group());
    assert_eq!(
        restored.flight().trip_type(),
        original.flight().trip_type()
    );
    assert_eq!(restored.flight().legs().len(), original.flight().legs().len());
}

#[tokio::test]
async fn round_trip_through_in_memory_repository() {
    let repository = Arc::new(InMemorySnapshotRepository::new());
    let engine = populated_engine();

    let handle = PersistenceHandle::spawn(repository.clone(), Duration::from_millis(10));
    engine.attach_persistence(handle);
    engine.snapshot_all();
    engine.shutdown().await.unwrap();

    let restored = TripEngine::default();
    restored.hydrate(repository.as_ref()).await.unwrap();

    assert_state_matches(&engine, &restored);
}

#[tokio::test]
async fn round_trip_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("snapshots.db");
    let pool = create_pool(db_path.to_str().unwrap(), None).await.unwrap();
    let repository = Arc::new(SqliteSnapshotRepository::new(pool));
    repository.ensure_schema().await.unwrap();

    let engine = populated_engine();
    let handle = PersistenceHandle::spawn(repository.clone(), Duration::from_millis(10));
    engine.attach_persistence(handle);
    engine.snapshot_all();
    engine.shutdown().await.unwrap();

    let restored = TripEngine::default();
    restored.hydrate(repository.as_ref()).await.unwrap();

    assert_state_matches(&engine, &restored);
}

#[tokio::test]
async fn corrupt_snapshot_falls_back_to_defaults() {
    let repository = InMemorySnapshotRepository::new();
    use tripsync::domain::ports::snapshot_repository::StoreKind;
    use tripsync::SnapshotRepository as _;

    repository
        .save(StoreKind::Accommodation, "{{{definitely not json")
        .await
        .unwrap();

    let engine = TripEngine::default();
    engine.hydrate(&repository).await.unwrap();

    assert_eq!(engine.accommodation().len(), 0, "defaults, not a crash");
}
