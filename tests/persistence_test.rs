// End-to-end: TaskStore over the on-disk backends

use std::fs;
use tempfile::TempDir;
use todostore::{FilePersistence, Persistence, SqlitePersistence, Task, TaskFilter, TaskStore};

fn exercise<P: Persistence>(mut store: TaskStore<P>) -> (Vec<Task>, P) {
    let a = store.add("A").unwrap();
    let b = store.add("B").unwrap();
    let c = store.add("C").unwrap();
    store.toggle_completed(b.id).unwrap();
    assert!(store.delete(c.id));
    store.set_filter(TaskFilter::Pending);
    assert_eq!(store.list_filtered(), vec![&a]);

    let tasks = store.tasks().to_vec();
    (tasks, store.into_persistence())
}

#[test]
fn test_file_backend_survives_reopen() {
    let temp = TempDir::new().unwrap();

    let store = TaskStore::open(FilePersistence::open(temp.path(), "tasks").unwrap());
    let (expected, _) = exercise(store);

    let reopened = TaskStore::open(FilePersistence::open(temp.path(), "tasks").unwrap());
    assert_eq!(reopened.tasks(), expected.as_slice());
    assert_eq!(reopened.stats().completed, 1);
    assert_eq!(reopened.stats().pending, 1);
}

#[test]
fn test_file_backend_layout() {
    let temp = TempDir::new().unwrap();
    let mut store = TaskStore::open(FilePersistence::open(temp.path(), "tasks").unwrap());
    let task = store.add("buy milk").unwrap();

    let raw = fs::read_to_string(temp.path().join(".todostore/tasks.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);

    let object = items[0].as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
    keys.sort();
    assert_eq!(keys, vec!["completed", "createdAt", "id", "text"]);
    assert_eq!(object["id"].as_i64(), Some(task.id));
    assert_eq!(object["text"].as_str(), Some("buy milk"));
    assert_eq!(object["completed"].as_bool(), Some(false));
}

#[test]
fn test_file_backend_corrupt_file_loads_empty() {
    let temp = TempDir::new().unwrap();
    let persistence = FilePersistence::open(temp.path(), "tasks").unwrap();
    fs::write(persistence.path(), "{ this is not json").unwrap();

    let mut store = TaskStore::open(persistence);
    assert!(store.tasks().is_empty());

    // Next write replaces the corrupt blob
    store.add("fresh start").unwrap();
    let reopened = TaskStore::open(FilePersistence::open(temp.path(), "tasks").unwrap());
    assert_eq!(reopened.tasks().len(), 1);
}

#[test]
fn test_sqlite_backend_survives_reopen() {
    let temp = TempDir::new().unwrap();

    let store = TaskStore::open(SqlitePersistence::open(temp.path(), "tasks").unwrap());
    let (expected, persistence) = exercise(store);
    drop(persistence);

    let reopened = TaskStore::open(SqlitePersistence::open(temp.path(), "tasks").unwrap());
    assert_eq!(reopened.tasks(), expected.as_slice());
}

#[test]
fn test_keys_are_independent() {
    let temp = TempDir::new().unwrap();

    let mut work = TaskStore::open(FilePersistence::open(temp.path(), "work").unwrap());
    work.add("ship release").unwrap();

    let home = TaskStore::open(FilePersistence::open(temp.path(), "home").unwrap());
    assert!(home.tasks().is_empty());
}

#[test]
fn test_boxed_backend() {
    let temp = TempDir::new().unwrap();
    let persistence: Box<dyn Persistence> = Box::new(SqlitePersistence::open(temp.path(), "tasks").unwrap());

    let mut store = TaskStore::open(persistence);
    let task = store.add("boxed").unwrap();
    assert_eq!(store.get(task.id), Some(&task));
}
