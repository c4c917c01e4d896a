use maxim_core::{
    Command, EntryDraft, FixedClock, FocusSlot, FsFileIo, Journal, JournalError, KeyValueStore,
    MemoryStore, Outcome, SeededRandom, SpiceLevel, StorageKeys, StoreError, TransferError,
};
use serde_json::json;
use std::cell::Cell;

const NOW: i64 = 1_700_000_000_000;

fn open(storage: &MemoryStore) -> Journal<'_, MemoryStore> {
    Journal::open_with(
        storage,
        StorageKeys::default(),
        SeededRandom::new(11),
        FixedClock::new(NOW),
    )
}

#[test]
fn render_hook_fires_after_each_applied_command() {
    let storage = MemoryStore::new();
    let renders = Cell::new(0);
    let mut journal = open(&storage);
    journal.set_render_hook(|| renders.set(renders.get() + 1));

    journal
        .dispatch(Command::Submit(EntryDraft::new("t", "b")))
        .expect("submit should succeed");
    journal
        .dispatch(Command::EnterFocus(None))
        .expect("enter focus should succeed");
    journal.dispatch(Command::Move(1)).expect("move should succeed");
    assert_eq!(renders.get(), 3);

    storage.set_read_only(true);
    assert!(journal
        .dispatch(Command::Submit(EntryDraft::new("x", "y")))
        .is_err());
    assert_eq!(renders.get(), 3, "failed commands do not render");
}

#[test]
fn submit_creates_then_updates_entry_under_edit() {
    let storage = MemoryStore::new();
    let mut journal = open(&storage);

    let Outcome::Created(id) = journal
        .dispatch(Command::Submit(EntryDraft::new("Draft", "Body")))
        .expect("submit should succeed")
    else {
        panic!("submit should create");
    };
    assert_eq!(journal.items().len(), 5);

    let Outcome::EditStarted(prefill) = journal
        .dispatch(Command::BeginEdit(id.clone()))
        .expect("begin edit should succeed")
    else {
        panic!("begin edit should return the draft");
    };
    assert_eq!(prefill.title, "Draft");
    assert_eq!(journal.editing(), Some(&id));
    assert_eq!(
        journal.editing_entry().map(|entry| entry.title.as_str()),
        Some("Draft")
    );

    let rejected = journal
        .dispatch(Command::Submit(EntryDraft::new("", "Body")))
        .expect("invalid draft is not an error");
    assert_eq!(rejected, Outcome::Ignored);
    assert_eq!(journal.editing(), Some(&id), "form stays populated");

    let edited = prefill.clone().with_note("lived it").with_flags(true, false);
    let edited = EntryDraft {
        title: "Final".to_string(),
        ..edited
    };
    assert_eq!(
        journal
            .dispatch(Command::Submit(edited))
            .expect("submit should succeed"),
        Outcome::Updated(id.clone())
    );
    assert_eq!(journal.editing(), None);
    assert!(journal.editing_entry().is_none());
    assert_eq!(journal.items().len(), 5);
    let entry = journal.items().get(&id).expect("edited entry exists");
    assert_eq!(entry.title, "Final");
    assert_eq!(entry.note, "lived it");
    assert!(entry.favorite);
}

#[test]
fn deleting_entry_under_edit_clears_edit() {
    let storage = MemoryStore::new();
    let mut journal = open(&storage);
    let id = journal
        .sorted_view()
        .get(0)
        .expect("seed is not empty")
        .id
        .clone();

    journal
        .dispatch(Command::BeginEdit(id.clone()))
        .expect("begin edit should succeed");
    assert_eq!(
        journal
            .dispatch(Command::Delete(id.clone()))
            .expect("delete should succeed"),
        Outcome::Deleted(id.clone())
    );
    assert_eq!(journal.editing(), None);
    assert_eq!(
        journal
            .dispatch(Command::Delete(id))
            .expect("second delete is a no-op"),
        Outcome::Ignored
    );
}

#[test]
fn delete_under_focus_keeps_cursor_in_range() {
    let storage = MemoryStore::new();
    let mut journal = open(&storage);

    journal
        .dispatch(Command::EnterFocus(Some(3)))
        .expect("enter focus should succeed");
    let last = journal
        .sorted_view()
        .get(3)
        .expect("seed has four entries")
        .id
        .clone();
    journal
        .dispatch(Command::Delete(last))
        .expect("delete should succeed");
    assert_eq!(journal.focus().index(), 2);

    match journal.focus_slot() {
        FocusSlot::Entry { index, .. } => assert_eq!(index, 2),
        other => panic!("unexpected slot: {other:?}"),
    }
}

#[test]
fn exit_focus_resets_note_and_chrome() {
    let storage = MemoryStore::new();
    let mut journal = open(&storage);

    for command in [Command::RandomFocus, Command::ToggleNote, Command::ToggleChrome] {
        journal.dispatch(command).expect("focus command should succeed");
    }
    assert!(journal.focus().show_note());
    assert!(journal.focus().reveal_affordance_visible());

    journal
        .dispatch(Command::ExitFocus)
        .expect("exit focus should succeed");
    assert!(!journal.focus().is_active());
    assert!(!journal.focus().show_note());
    assert!(!journal.focus().chrome_hidden());
    assert_eq!(journal.focus_slot(), FocusSlot::Inactive);
}

#[test]
fn spice_level_cycles_and_persists() {
    let storage = MemoryStore::new();
    {
        let mut journal = open(&storage);
        assert_eq!(journal.spice(), SpiceLevel::DEFAULT);
        assert_eq!(
            journal
                .dispatch(Command::CycleSpice)
                .expect("cycle spice should persist"),
            Outcome::Spice(SpiceLevel::new(2))
        );
    }
    let keys = StorageKeys::default();
    assert_eq!(
        storage.get(&keys.spice).expect("read should succeed").as_deref(),
        Some("2")
    );
    assert_eq!(open(&storage).spice(), SpiceLevel::new(2));
}

#[test]
fn phrase_commands_require_and_store_phrase() {
    let storage = MemoryStore::new();
    let mut journal = open(&storage);

    assert!(matches!(
        journal.require_phrase(),
        Err(JournalError::Transfer(TransferError::MissingPhrase))
    ));
    assert!(matches!(
        journal.dispatch(Command::SetPhrase("   ".to_string())),
        Err(JournalError::Transfer(TransferError::MissingPhrase))
    ));

    let Outcome::Phrase(generated) = journal
        .dispatch(Command::GeneratePhrase)
        .expect("generate should persist")
    else {
        panic!("generate should return the phrase");
    };
    assert_eq!(
        journal.require_phrase().expect("phrase was just generated"),
        generated
    );
}

#[test]
fn export_then_import_round_trips_through_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let source_storage = MemoryStore::new();
    let mut source = open(&source_storage);
    source
        .dispatch(Command::SetPhrase("Amber Heron Grove".to_string()))
        .expect("set phrase should persist");
    let path = dir.path().join(source.pack_file_name());
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("tao-of-life-pack-2023-11-14.json")
    );
    source
        .export_pack_to(&FsFileIo, &path)
        .expect("export should write the file");

    let target_storage = MemoryStore::with_values([(StorageKeys::default().items, "[]")]);
    let mut target = open(&target_storage);
    assert_eq!(
        target
            .import_pack_from(&FsFileIo, &path)
            .expect("import should read the file"),
        4
    );
    assert_eq!(target.items().entries(), source.items().entries());
    assert_eq!(target.phrase(), Some("amber-heron-grove"));
}

#[test]
fn invalid_import_surfaces_invalid_pack_and_keeps_items() {
    let storage = MemoryStore::new();
    let mut journal = open(&storage);
    let before = journal.items().entries().to_vec();

    let err = journal
        .dispatch(Command::ImportPack(r#"{"items":"not-a-sequence"}"#.to_string()))
        .expect_err("string items must be rejected");
    assert!(matches!(
        err,
        JournalError::Transfer(TransferError::InvalidPack(_))
    ));
    assert_eq!(journal.items().entries(), before.as_slice());
}

#[test]
fn import_with_unwritable_phrase_restores_items_and_skips_render() {
    let keys = StorageKeys::default();
    let storage = MemoryStore::new();
    let renders = Cell::new(0);
    let mut journal = open(&storage);
    journal
        .dispatch(Command::SetPhrase("old-phrase".to_string()))
        .expect("set phrase should persist");
    journal.set_render_hook(|| renders.set(renders.get() + 1));
    journal.items().persist().expect("seed should persist");
    let before = journal.items().entries().to_vec();
    let stored_before = storage.get(&keys.items).expect("read should succeed");

    storage.reject_writes_to(keys.phrase.as_str());
    let document = json!({
        "phrase": "new-phrase",
        "items": [{ "id": "lx3k9a", "title": "t", "body": "b", "createdAt": 1 }]
    })
    .to_string();
    let err = journal
        .dispatch(Command::ImportPack(document))
        .expect_err("phrase write failure must fail the import");

    assert!(matches!(
        err,
        JournalError::Transfer(TransferError::Store(StoreError::Storage(_)))
    ));
    assert_eq!(journal.items().entries(), before.as_slice());
    assert_eq!(
        storage.get(&keys.items).expect("read should succeed"),
        stored_before
    );
    assert_eq!(journal.phrase(), Some("old-phrase"));
    assert_eq!(renders.get(), 0);
}
