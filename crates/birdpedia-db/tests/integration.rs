use std::time::Duration;

use birdpedia_db::{
    create_pool, BirdStore, DbPool, DbRuntimeSettings, Store, StoreError, BIRDS_SCHEMA,
};
use birdpedia_types::Bird;
use r2d2_sqlite::SqliteConnectionManager;
use tempfile::TempDir;

/// Opens a store over a fresh on-disk database with the reference schema.
///
/// The `TempDir` must outlive the store.
fn setup_store() -> (TempDir, BirdStore, DbPool) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("birds.db");
    let pool = create_pool(path.to_str().unwrap(), DbRuntimeSettings::default())
        .expect("failed to create pool");
    pool.get()
        .expect("failed to get connection")
        .execute_batch(BIRDS_SCHEMA)
        .expect("failed to create birds table");
    (dir, BirdStore::new(pool.clone()), pool)
}

fn count_matching(pool: &DbPool, species: &str, description: &str) -> i64 {
    pool.get()
        .unwrap()
        .query_row(
            "SELECT COUNT(*) FROM birds WHERE species = ?1 AND description = ?2",
            [species, description],
            |row| row.get(0),
        )
        .expect("failed to count birds")
}

#[test]
fn create_bird_inserts_exactly_one_row() {
    let (_dir, store, pool) = setup_store();

    store
        .create_bird(&Bird::new("test species", "test description"))
        .expect("create_bird should succeed");

    assert_eq!(count_matching(&pool, "test species", "test description"), 1);
}

#[test]
fn get_birds_on_empty_table_is_empty() {
    let (_dir, store, _pool) = setup_store();

    let birds = store.get_birds().expect("get_birds should succeed");
    assert!(birds.is_empty());
}

#[test]
fn get_birds_returns_directly_inserted_row() {
    let (_dir, store, pool) = setup_store();
    pool.get()
        .unwrap()
        .execute(
            "INSERT INTO birds (species, description) VALUES ('bird', 'description')",
            [],
        )
        .unwrap();

    let birds = store.get_birds().expect("get_birds should succeed");
    assert_eq!(birds, vec![Bird::new("bird", "description")]);
}

#[test]
fn get_birds_returns_every_row() {
    let (_dir, store, _pool) = setup_store();
    for i in 0..5 {
        store
            .create_bird(&Bird::new(format!("species-{i}"), format!("description-{i}")))
            .unwrap();
    }

    let mut species: Vec<String> = store
        .get_birds()
        .unwrap()
        .into_iter()
        .map(|b| b.species)
        .collect();
    species.sort();

    assert_eq!(
        species,
        (0..5).map(|i| format!("species-{i}")).collect::<Vec<_>>()
    );
}

#[test]
fn created_bird_is_listed_unchanged() {
    let (_dir, store, _pool) = setup_store();
    let bird = Bird::new("Troglodytes troglodytes", "Tiny brown bird, very loud song.");

    store.create_bird(&bird).unwrap();

    let birds = store.get_birds().unwrap();
    assert_eq!(birds.len(), 1);
    assert_eq!(birds[0], bird);
}

#[test]
fn empty_strings_are_accepted() {
    let (_dir, store, pool) = setup_store();

    store.create_bird(&Bird::new("", "")).unwrap();

    assert_eq!(count_matching(&pool, "", ""), 1);
    assert_eq!(store.get_birds().unwrap(), vec![Bird::new("", "")]);
}

#[test]
fn duplicate_birds_are_kept() {
    let (_dir, store, pool) = setup_store();
    let bird = Bird::new("robin", "red breast");

    store.create_bird(&bird).unwrap();
    store.create_bird(&bird).unwrap();

    assert_eq!(count_matching(&pool, "robin", "red breast"), 2);
    assert_eq!(store.get_birds().unwrap().len(), 2);
}

#[test]
fn null_column_is_a_decode_error() {
    let (_dir, store, pool) = setup_store();
    pool.get()
        .unwrap()
        .execute(
            "INSERT INTO birds (species, description) VALUES ('bird', NULL)",
            [],
        )
        .unwrap();

    match store.get_birds() {
        Err(StoreError::Decode(_)) => {}
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn missing_table_is_a_query_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.db");
    let pool = create_pool(path.to_str().unwrap(), DbRuntimeSettings::default()).unwrap();
    let store = BirdStore::new(pool);

    let err = store.create_bird(&Bird::new("a", "b")).unwrap_err();
    assert!(matches!(err, StoreError::Query(_)), "got {err:?}");

    let err = store.get_birds().unwrap_err();
    assert!(matches!(err, StoreError::Query(_)), "got {err:?}");
}

#[test]
fn rejected_insert_is_surfaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strict.db");
    let pool = create_pool(path.to_str().unwrap(), DbRuntimeSettings::default()).unwrap();
    pool.get()
        .unwrap()
        .execute_batch(
            "CREATE TABLE birds (
                species TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL
            );",
        )
        .unwrap();
    let store = BirdStore::new(pool);

    store.create_bird(&Bird::new("dodo", "extinct")).unwrap();
    let err = store
        .create_bird(&Bird::new("dodo", "still extinct"))
        .expect_err("unique constraint should reject the insert");
    assert!(matches!(err, StoreError::Query(_)), "got {err:?}");
}

#[test]
fn store_is_shareable_across_threads() {
    let (_dir, store, _pool) = setup_store();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || {
                store
                    .create_bird(&Bird::new(format!("thread-{i}"), "concurrent"))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.get_birds().unwrap().len(), 4);
}

/// Opens a store over a `birds` table whose columns have no declared type,
/// so SQLite keeps whatever storage class a value is inserted with.
fn setup_untyped_store() -> (TempDir, BirdStore, DbPool) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("untyped.db");
    let pool = create_pool(path.to_str().unwrap(), DbRuntimeSettings::default()).unwrap();
    pool.get()
        .unwrap()
        .execute_batch("CREATE TABLE birds (species, description);")
        .unwrap();
    (dir, BirdStore::new(pool.clone()), pool)
}

#[test]
fn integer_column_is_a_decode_error() {
    let (_dir, store, pool) = setup_untyped_store();
    pool.get()
        .unwrap()
        .execute(
            "INSERT INTO birds (species, description) VALUES (5, 'x')",
            [],
        )
        .unwrap();

    let err = store.get_birds().unwrap_err();
    match err {
        StoreError::Decode(rusqlite::Error::InvalidColumnType(0, _, _)) => {}
        other => panic!("expected decode error on column 0, got {other:?}"),
    }
}

#[test]
fn invalid_utf8_text_is_a_decode_error() {
    let (_dir, store, pool) = setup_untyped_store();
    pool.get()
        .unwrap()
        .execute(
            "INSERT INTO birds (species, description) VALUES ('wren', CAST(X'FFFE' AS TEXT))",
            [],
        )
        .unwrap();

    let err = store.get_birds().unwrap_err();
    match err {
        StoreError::Decode(rusqlite::Error::FromSqlConversionFailure(1, _, _)) => {}
        other => panic!("expected conversion failure on column 1, got {other:?}"),
    }
}

#[test]
fn exhausted_pool_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("busy.db");
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .connection_timeout(Duration::from_millis(100))
        .build(SqliteConnectionManager::file(&path))
        .expect("failed to build pool");
    pool.get().unwrap().execute_batch(BIRDS_SCHEMA).unwrap();
    let store = BirdStore::new(pool.clone());

    let _held = pool.get().expect("failed to check out the only connection");

    let err = store.create_bird(&Bird::new("a", "b")).unwrap_err();
    assert!(matches!(err, StoreError::Connection(_)), "got {err:?}");

    let err = store.get_birds().unwrap_err();
    assert!(matches!(err, StoreError::Connection(_)), "got {err:?}");
}
