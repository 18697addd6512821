use ignomi_core::{
    BookmarkFileError, BookmarkRepository, BookmarkStore, ChangeBus, ChangeEvent, ItemId,
    JsonFileBookmarkRepository, LauncherError, Topic,
};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

fn open_store(path: &Path) -> (BookmarkStore<JsonFileBookmarkRepository>, Rc<ChangeBus>) {
    let bus = Rc::new(ChangeBus::new());
    let store = BookmarkStore::open(JsonFileBookmarkRepository::new(path), Rc::clone(&bus));
    (store, bus)
}

#[test]
fn missing_file_loads_as_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _bus) = open_store(&dir.path().join("bookmarks.json"));

    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
}

#[test]
fn malformed_file_loads_as_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmarks.json");
    fs::write(&path, "{\"bookmarks\": [\"a.desktop\",").unwrap();

    let (store, _bus) = open_store(&path);

    assert!(store.list().is_empty());
}

#[test]
fn document_without_bookmarks_key_loads_as_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmarks.json");
    fs::write(&path, "{}").unwrap();

    let (store, _bus) = open_store(&path);

    assert!(store.list().is_empty());
}

#[test]
fn load_drops_duplicates_keeping_first_position() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmarks.json");
    fs::write(
        &path,
        r#"{"bookmarks": ["b.desktop", "a.desktop", "b.desktop", "c.desktop"]}"#,
    )
    .unwrap();

    let (store, _bus) = open_store(&path);

    assert_eq!(store.list(), vec!["b.desktop", "a.desktop", "c.desktop"]);
}

#[test]
fn add_is_idempotent_and_order_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmarks.json");
    let (mut store, _bus) = open_store(&path);

    assert!(store.add("firefox.desktop").unwrap());
    assert!(store.add("code.desktop").unwrap());
    assert!(!store.add("firefox.desktop").unwrap());
    assert!(store.contains("code.desktop"));

    let (reloaded, _bus) = open_store(&path);
    assert_eq!(reloaded.list(), vec!["firefox.desktop", "code.desktop"]);
}

#[test]
fn saved_document_uses_bookmarks_key_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("bookmarks.json");
    let repo = JsonFileBookmarkRepository::new(&path);
    let (mut store, _bus) = open_store(&path);

    store.add("firefox.desktop").unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw, serde_json::json!({ "bookmarks": ["firefox.desktop"] }));
    assert!(!repo.temp_path().exists());
}

#[test]
fn remove_and_reorder() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _bus) = open_store(&dir.path().join("bookmarks.json"));
    for item in ["a.desktop", "b.desktop", "c.desktop"] {
        store.add(item).unwrap();
    }

    assert!(store.reorder("c.desktop", 0).unwrap());
    assert_eq!(store.list(), vec!["c.desktop", "a.desktop", "b.desktop"]);

    assert!(store.reorder("c.desktop", 99).unwrap());
    assert_eq!(store.list(), vec!["a.desktop", "b.desktop", "c.desktop"]);

    assert!(!store.reorder("c.desktop", 2).unwrap());
    assert!(!store.reorder("missing.desktop", 0).unwrap());

    assert!(store.remove("b.desktop").unwrap());
    assert!(!store.remove("b.desktop").unwrap());
    assert_eq!(store.list(), vec!["a.desktop", "c.desktop"]);
}

#[test]
fn blank_ids_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _bus) = open_store(&dir.path().join("bookmarks.json"));

    let err = store.add("  ").unwrap_err();
    assert!(matches!(err, LauncherError::InvalidArgument(_)));
}

#[test]
fn mutations_publish_new_list_and_noops_stay_silent() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, bus) = open_store(&dir.path().join("bookmarks.json"));
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    bus.subscribe(Topic::BookmarkChanged, move |event| {
        sink.borrow_mut().push(event.clone());
        Ok(())
    });

    store.add("a.desktop").unwrap();
    store.add("b.desktop").unwrap();
    store.add("a.desktop").unwrap();
    store.reorder("b.desktop", 0).unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            ChangeEvent::BookmarkChanged {
                bookmarks: vec!["a.desktop".to_string()]
            },
            ChangeEvent::BookmarkChanged {
                bookmarks: vec!["a.desktop".to_string(), "b.desktop".to_string()]
            },
            ChangeEvent::BookmarkChanged {
                bookmarks: vec!["b.desktop".to_string(), "a.desktop".to_string()]
            },
        ]
    );
}

/// Loads fine, refuses every save.
struct ReadOnlyRepository {
    items: Vec<ItemId>,
}

impl BookmarkRepository for ReadOnlyRepository {
    fn load(&self) -> Result<Vec<ItemId>, BookmarkFileError> {
        Ok(self.items.clone())
    }

    fn save(&self, _bookmarks: &[ItemId]) -> Result<(), BookmarkFileError> {
        Err(BookmarkFileError::Io {
            path: "bookmarks.json".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[test]
fn failed_save_keeps_previous_list_and_publishes_nothing() {
    let bus = Rc::new(ChangeBus::new());
    let hits = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&hits);
    bus.subscribe(Topic::BookmarkChanged, move |_| {
        *counter.borrow_mut() += 1;
        Ok(())
    });
    let mut store = BookmarkStore::open(
        ReadOnlyRepository {
            items: vec!["a.desktop".to_string()],
        },
        Rc::clone(&bus),
    );

    let err = store.add("b.desktop").unwrap_err();

    assert!(matches!(err, LauncherError::StorageUnavailable(_)));
    assert_eq!(store.list(), vec!["a.desktop"]);
    assert_eq!(*hits.borrow(), 0);
}
