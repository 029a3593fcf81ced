//! End-to-end golden file behaviour on the real filesystem.

mod common;

use common::Fixture;
use goldsnap::prelude::*;
use goldsnap::storage::golden;
use goldsnap::{SnapshotId, Storage};
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

fn sample() -> BTreeMap<&'static str, serde_json::Value> {
    BTreeMap::from([
        ("a", serde_json::json!("str")),
        ("b", serde_json::json!(true)),
        ("c", serde_json::json!(3.14)),
    ])
}

#[test]
fn first_run_records_a_versioned_file() {
    let fx = Fixture::new();
    let m = fx.matcher("first run", vec![with_serializer(JsonSerializer::default())]);
    assert!(m.matches(&sample()).unwrap());

    let text = fx.golden_text();
    assert!(text.starts_with("version: 1\n"), "{text}");
    let file = golden::decode(&fx.golden_path(), text.as_bytes()).unwrap();
    assert_eq!(
        file.snapshots.get("first run"),
        Some("{\n  \"a\": \"str\",\n  \"b\": true,\n  \"c\": 3.14\n}\n")
    );
}

#[test]
fn matching_run_leaves_the_file_untouched() {
    let fx = Fixture::new();
    let m = fx.matcher("stable", vec![]);
    assert!(m.matches(&sample()).unwrap());
    let before = std::fs::metadata(fx.golden_path()).unwrap().modified().unwrap();
    let text_before = fx.golden_text();

    thread::sleep(Duration::from_millis(20));
    let m = fx.matcher("stable", vec![]);
    assert!(m.matches(&sample()).unwrap());

    let after = std::fs::metadata(fx.golden_path()).unwrap().modified().unwrap();
    assert_eq!(before, after);
    assert_eq!(text_before, fx.golden_text());
}

#[test]
fn changed_value_fails_with_a_diff() {
    let fx = Fixture::new();
    let json = || vec![with_serializer(JsonSerializer::default())];
    assert!(fx.matcher("drift", json()).matches(&sample()).unwrap());

    let mut changed = sample();
    changed.insert("c", serde_json::json!(3.15));
    let m = fx.matcher("drift", json());
    assert!(!m.matches(&changed).unwrap());

    let message = m.failure_message(&changed);
    let lines: Vec<&str> = message.lines().collect();
    assert!(lines[0].starts_with("Expected to match the golden file \""), "{message}");
    assert!(lines[0].ends_with("fixture.golden\""), "{message}");
    assert_eq!(lines[1..4], ["- Snapshot", "+ Received", ""]);
    assert!(lines.contains(&"-  \"c\": 3.14"), "{message}");
    assert!(lines.contains(&"+  \"c\": 3.15"), "{message}");
}

#[test]
fn update_mode_overwrites_only_its_own_entry() {
    let fx = Fixture::new();
    assert!(fx.matcher("kept", vec![]).matches("untouched").unwrap());
    assert!(fx.matcher("replaced", vec![]).matches("old").unwrap());

    let m = fx.matcher("replaced", vec![with_update(true)]);
    assert!(m.matches("new").unwrap());

    assert!(fx.matcher("kept", vec![]).matches("untouched").unwrap());
    assert!(fx.matcher("replaced", vec![]).matches("new").unwrap());
    assert!(!fx.matcher("replaced", vec![]).matches("old").unwrap());
}

#[test]
fn descriptions_share_one_file() {
    let fx = Fixture::new();
    let raw = |desc: &str| {
        vec![
            with_description(desc),
            with_serializer(StringSerializer::new()),
        ]
    };
    assert!(fx.matcher("multi", raw("first")).matches("foo").unwrap());
    assert!(fx.matcher("multi", raw("second")).matches("bar").unwrap());
    assert!(fx.matcher("multi", raw("third")).matches("foobar").unwrap());

    let file = golden::decode(&fx.golden_path(), fx.golden_text().as_bytes()).unwrap();
    let entries: Vec<_> = file.snapshots.iter().collect();
    assert_eq!(
        entries,
        [
            ("multi first", "foo"),
            ("multi second", "bar"),
            ("multi third", "foobar"),
        ]
    );
}

#[test]
fn corrupt_file_is_an_error_and_survives() {
    let fx = Fixture::new();
    std::fs::create_dir_all(fx.golden_path().parent().unwrap()).unwrap();
    std::fs::write(fx.golden_path(), "version: 2\nsnapshots: {}\n").unwrap();

    let err = fx.matcher("any", vec![]).matches(&sample()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptGoldenFile);
    assert_eq!(fx.golden_text(), "version: 2\nsnapshots: {}\n");

    let err = fx
        .matcher("any", vec![with_update(true)])
        .matches(&sample())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptGoldenFile);
    assert_eq!(fx.golden_text(), "version: 2\nsnapshots: {}\n");
}

#[test]
fn redaction_keeps_volatile_fields_out_of_the_file() {
    #[derive(serde::Serialize)]
    struct Session {
        user: &'static str,
        token: String,
    }

    let fx = Fixture::new();
    let options = || {
        vec![
            with_transformer(Redact::new().field("token", "<token>")),
            with_serializer(YamlSerializer),
        ]
    };
    let first = Session {
        user: "ada",
        token: "5f1c".into(),
    };
    let second = Session {
        user: "ada",
        token: "9e07".into(),
    };
    assert!(fx.matcher("session", options()).matches(&first).unwrap());
    assert!(fx.matcher("session", options()).matches(&second).unwrap());
    assert!(!fx.golden_text().contains("5f1c"));
}

#[test]
fn parallel_tests_can_share_a_file() {
    let fx = Fixture::new();
    thread::scope(|scope| {
        for i in 0..8 {
            let fx = &fx;
            scope.spawn(move || {
                let m = fx.matcher(&format!("worker {i}"), vec![]);
                assert!(m.matches(&i).unwrap());
            });
        }
    });

    let file = golden::decode(&fx.golden_path(), fx.golden_text().as_bytes()).unwrap();
    assert_eq!(file.snapshots.len(), 8);
    for i in 0..8 {
        assert_eq!(file.snapshots.get(&format!("worker {i}")), Some(format!("{i}\n").as_str()));
    }
}

#[test]
fn cached_storage_loses_nothing_under_concurrent_reads() {
    let fx = Fixture::cached();
    thread::scope(|scope| {
        for i in 0..8 {
            let fx = &fx;
            scope.spawn(move || {
                let m = fx.matcher(&format!("worker {i}"), vec![]);
                assert!(m.matches(&i).unwrap());
            });
            scope.spawn(move || {
                let id = SnapshotId::new(fx.golden_path(), format!("worker {}", (i + 1) % 8));
                for _ in 0..25 {
                    let _ = fx.defaults.storage.read(&id);
                }
            });
        }
    });

    let file = golden::decode(&fx.golden_path(), fx.golden_text().as_bytes()).unwrap();
    assert_eq!(file.snapshots.len(), 8);
    for i in 0..8 {
        let m = fx.matcher(&format!("worker {i}"), vec![]);
        assert!(m.matches(&i).unwrap());
        assert!(!m.matches(&(i + 100)).unwrap());
    }
}

#[test]
fn sorted_sets_match_across_runs() {
    use std::collections::HashSet;

    let fx = Fixture::new();
    let tags: Vec<String> = (0..20).map(|i| format!("tag-{i}")).collect();
    for round in 0..5 {
        let set: HashSet<&String> = if round % 2 == 0 {
            tags.iter().collect()
        } else {
            tags.iter().rev().collect()
        };
        let m = fx.matcher("tags", vec![with_transformer(SortSeqs)]);
        assert!(m.matches(&set).unwrap(), "round {round}");
    }
}
