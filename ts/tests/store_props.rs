//! Property and persistence tests for TaskStore

use proptest::prelude::*;
use std::collections::HashSet;
use taskstore::{
    FileStorage, MemoryStorage, SequentialIdSource, Status, Task, TaskStore, partition,
};
use tempfile::TempDir;

#[derive(Debug, Clone)]
enum Op {
    Create(String, String, usize),
    Update(usize, usize),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        ("[a-z]{1,8}", "[a-z ]{0,12}", 0usize..3).prop_map(|(t, d, s)| Op::Create(t, d, s)),
        (0usize..20, 0usize..3).prop_map(|(i, s)| Op::Update(i, s)),
        (0usize..20).prop_map(Op::Delete),
    ]
}

fn status(index: usize) -> Status {
    Status::ALL[index % 3]
}

proptest! {
    #[test]
    fn columns_cover_list_exactly_once(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut store = TaskStore::open(MemoryStorage::new(), SequentialIdSource::default());

        for op in ops {
            match op {
                Op::Create(title, description, s) => {
                    let task = store.new_task(title, description, status(s));
                    store.create(task);
                }
                Op::Update(i, s) => {
                    if let Some(task) = store.tasks().get(i).cloned() {
                        store.update(task.with_status(status(s)));
                    }
                }
                Op::Delete(i) => {
                    if let Some(id) = store.tasks().get(i).map(|t| t.id) {
                        store.delete(id);
                    }
                }
            }
        }

        let tasks = store.tasks();
        let columns = partition(tasks);

        let total: usize = columns.iter().map(Vec::len).sum();
        prop_assert_eq!(total, tasks.len());

        let mut seen = HashSet::new();
        for (index, column) in columns.iter().enumerate() {
            for task in column {
                prop_assert_eq!(task.status, Status::ALL[index]);
                prop_assert!(seen.insert(task.id), "task {} appears twice", task.id);
            }
        }
        let all: HashSet<_> = tasks.iter().map(|t| t.id).collect();
        prop_assert_eq!(seen, all);
    }
}

#[test]
fn file_round_trip_yields_equal_list() {
    let temp = TempDir::new().unwrap();
    let tasks = vec![
        Task::new(1, "Fix bug", "in module X", Status::Doing),
        Task::new(2, "Write docs", "", Status::Todo),
        Task::new(3, "Ship", "v1 \"final\"", Status::Done),
    ];

    {
        let mut store = TaskStore::open(FileStorage::new(temp.path()), SequentialIdSource::default());
        for task in &tasks {
            store.create(task.clone());
        }
    }

    let reopened = TaskStore::open(FileStorage::new(temp.path()), SequentialIdSource::default());
    assert_eq!(reopened.tasks(), tasks.as_slice());
}

#[test]
fn file_absent_or_corrupted_yields_empty() {
    let temp = TempDir::new().unwrap();
    let store = TaskStore::open(FileStorage::new(temp.path()), SequentialIdSource::default());
    assert!(store.tasks().is_empty());

    std::fs::write(temp.path().join("tasks.json"), "[{\"id\": \"nope\"").unwrap();
    let store = TaskStore::open(FileStorage::new(temp.path()), SequentialIdSource::default());
    assert!(store.tasks().is_empty());
}

#[test]
fn file_contains_wire_format() {
    let temp = TempDir::new().unwrap();
    let mut store = TaskStore::open(FileStorage::new(temp.path()), SequentialIdSource::default());
    store.create(Task::new(7, "a", "b", Status::Todo));

    let raw = std::fs::read_to_string(temp.path().join("tasks.json")).unwrap();
    assert_eq!(raw, r#"[{"id":7,"title":"a","description":"b","status":"TO-DO"}]"#);
}
