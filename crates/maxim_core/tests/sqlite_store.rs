use maxim_core::db::{open_db, open_db_in_memory, DbError, KV_LAYOUT_VERSION};
use maxim_core::{
    Command, EntryDraft, FixedClock, Journal, KeyValueStore, LoadOrigin, Outcome, SeededRandom,
    SqliteKvStore, StorageError, StorageKeys,
};
use rusqlite::Connection;

#[test]
fn get_and_set_round_trip_with_upsert() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let store = SqliteKvStore::try_new(&conn).expect("bootstrapped db has kv table");

    assert_eq!(store.get("missing").expect("read should succeed"), None);
    store.set("k", "first").expect("insert should succeed");
    store.set("k", "second").expect("upsert should succeed");
    store.set("a", "other").expect("insert should succeed");

    assert_eq!(
        store.get("k").expect("read should succeed").as_deref(),
        Some("second")
    );
    assert_eq!(
        store.keys().expect("list keys"),
        vec!["a".to_string(), "k".to_string()]
    );
}

#[test]
fn try_new_rejects_connection_without_kv_table() {
    let conn = Connection::open_in_memory().expect("open bare connection");
    let err = SqliteKvStore::try_new(&conn).err().expect("bare connection must be rejected");
    assert!(matches!(err, StorageError::Unavailable(_)));
}

#[test]
fn open_db_records_layout_version_and_rejects_newer() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("journal.sqlite3");
    {
        let conn = open_db(&path).expect("open file db");
        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .expect("read user_version");
        assert_eq!(version, KV_LAYOUT_VERSION);
        conn.execute_batch(&format!("PRAGMA user_version = {};", KV_LAYOUT_VERSION + 1))
            .expect("bump user_version");
    }

    let err = open_db(&path).expect_err("newer layout must be rejected");
    assert!(matches!(
        err,
        DbError::UnsupportedLayoutVersion { db_version, .. } if db_version == KV_LAYOUT_VERSION + 1
    ));
}

#[test]
fn journal_state_survives_reopening_file_database() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("journal.sqlite3");

    let created = {
        let conn = open_db(&path).expect("open file db");
        let store = SqliteKvStore::try_new(&conn).expect("bootstrapped db has kv table");
        let mut journal = Journal::open_with(
            &store,
            StorageKeys::default(),
            SeededRandom::new(5),
            FixedClock::new(1_700_000_000_000),
        );
        let outcome = journal
            .dispatch(Command::Submit(EntryDraft::new("Persisted", "Across restarts")))
            .expect("submit should persist");
        journal
            .dispatch(Command::GeneratePhrase)
            .expect("generate should persist");
        match outcome {
            Outcome::Created(id) => id,
            other => panic!("unexpected outcome: {other:?}"),
        }
    };

    let conn = open_db(&path).expect("reopen file db");
    let store = SqliteKvStore::try_new(&conn).expect("bootstrapped db has kv table");
    let journal = Journal::open(&store, StorageKeys::default());
    assert_eq!(journal.items().origin(), LoadOrigin::Stored);
    assert_eq!(journal.items().len(), 5);
    assert_eq!(
        journal
            .items()
            .get(&created)
            .expect("created entry survives reopen")
            .title,
        "Persisted"
    );
    assert!(journal.phrase().is_some());
}
