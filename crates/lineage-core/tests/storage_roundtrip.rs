use lineage_core::error::LineageError;
use lineage_core::lineage::Lineage;
use lineage_core::person::{Gender, PersonId};
use lineage_core::storage;
use tempfile::TempDir;

fn sample() -> Lineage {
    let mut l = Lineage::new();
    let bob = l.add_person("Bob", Gender::Male).unwrap().id();
    let alice = l.add_person("Alice", Gender::Female).unwrap().id();
    let carol = l.add_person("Carol", Gender::Female).unwrap().id();
    let temp = l.add_person("Temp", Gender::Male).unwrap().id();
    let dan = l.add_person("Dan", Gender::Male).unwrap().id();
    l.add_spouse(bob, alice).unwrap();
    l.add_parent(carol, bob).unwrap();
    l.add_parent(carol, alice).unwrap();
    l.add_child(alice, dan).unwrap();
    l.remove_person(temp).unwrap();
    l
}

#[test]
fn test_save_and_load_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("lineage.json");

    let original = sample();
    original.save_to_file(&path).unwrap();
    let loaded = Lineage::load_from_file(&path).unwrap();

    assert_eq!(loaded, original);
    assert_eq!(loaded.next_id(), PersonId::new(6));
    assert!(loaded.find_person_by_id(PersonId::new(4)).is_none());
    assert_eq!(loaded.all_relations(), original.all_relations());
}

#[test]
fn test_roundtrip_keeps_children_order() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("lineage.json");

    let mut original = Lineage::new();
    let dad = original.add_person("Dad", Gender::Male).unwrap().id();
    let older = original.add_person("Ann", Gender::Female).unwrap().id();
    let younger = original.add_person("Ben", Gender::Male).unwrap().id();
    original.add_child(dad, younger).unwrap();
    original.add_child(dad, older).unwrap();
    original.save_to_file(&path).unwrap();
    let loaded = Lineage::load_from_file(&path).unwrap();

    assert_eq!(loaded, original);
    assert_eq!(
        loaded.find_person_by_id(dad).unwrap().children(),
        &[older, younger]
    );
    assert_eq!(
        loaded.shortest_path(older, younger).unwrap(),
        original.shortest_path(older, younger).unwrap()
    );
}

#[test]
fn test_empty_lineage_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("empty.json");

    let original = Lineage::new();
    original.save_to_file(&path).unwrap();
    let loaded = Lineage::load_from_file(&path).unwrap();

    assert!(loaded.is_empty());
    assert_eq!(loaded.next_id(), original.next_id());
}

#[test]
fn test_removed_ids_stay_retired_after_load() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("l.json");
    let mut l = Lineage::new();
    let a = l.add_person("A", Gender::Male).unwrap().id();
    l.remove_person(a).unwrap();
    l.save_to_file(&path).unwrap();

    let mut loaded = Lineage::load_from_file(&path).unwrap();
    let b = loaded.add_person("B", Gender::Female).unwrap().id();
    assert_eq!(b, PersonId::new(2));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let result = Lineage::load_from_file(&tmp.path().join("missing.json"));
    assert!(matches!(result, Err(LineageError::Io { .. })));
}

fn write_doc(tmp: &TempDir, persons: serde_json::Value, next_id: u64) -> std::path::PathBuf {
    let path = tmp.path().join("doc.json");
    let doc = serde_json::json!({
        "version": "1.0.0",
        "saved_at": "2026-10-18T12:00:00Z",
        "next_id": next_id,
        "persons": persons,
    });
    std::fs::write(&path, doc.to_string()).unwrap();
    path
}

#[test]
fn test_dangling_reference_is_corrupt() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(
        &tmp,
        serde_json::json!([{"id": 1, "name": "Kid", "gender": "m", "parent_ids": [9]}]),
        10,
    );
    assert!(matches!(
        Lineage::load_from_file(&path),
        Err(LineageError::CorruptData(_))
    ));
}

#[test]
fn test_two_fathers_is_corrupt() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(
        &tmp,
        serde_json::json!([
            {"id": 1, "name": "Kid", "gender": "m", "parent_ids": [2, 3]},
            {"id": 2, "name": "Dad", "gender": "m"},
            {"id": 3, "name": "Other dad", "gender": "m"},
        ]),
        4,
    );
    assert!(matches!(
        Lineage::load_from_file(&path),
        Err(LineageError::CorruptData(_))
    ));
}

#[test]
fn test_conflicting_spouses_is_corrupt() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(
        &tmp,
        serde_json::json!([
            {"id": 1, "name": "A", "gender": "f", "spouse_id": 2},
            {"id": 2, "name": "B", "gender": "m"},
            {"id": 3, "name": "C", "gender": "f", "spouse_id": 2},
        ]),
        4,
    );
    assert!(matches!(
        Lineage::load_from_file(&path),
        Err(LineageError::CorruptData(_))
    ));
}

#[test]
fn test_duplicate_id_is_corrupt() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(
        &tmp,
        serde_json::json!([
            {"id": 1, "name": "A", "gender": "f"},
            {"id": 1, "name": "B", "gender": "m"},
        ]),
        2,
    );
    assert!(matches!(
        Lineage::load_from_file(&path),
        Err(LineageError::CorruptData(_))
    ));
}

#[test]
fn test_id_beyond_counter_is_corrupt() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(
        &tmp,
        serde_json::json!([{"id": 5, "name": "A", "gender": "f"}]),
        3,
    );
    assert!(matches!(
        Lineage::load_from_file(&path),
        Err(LineageError::CorruptData(_))
    ));
}

#[test]
fn test_exhausted_id_counter_is_corrupt() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(&tmp, serde_json::json!([]), u64::MAX);
    assert!(matches!(
        Lineage::load_from_file(&path),
        Err(LineageError::CorruptData(_))
    ));

    let path = write_doc(&tmp, serde_json::json!([]), u64::MAX - 1);
    let mut lineage = Lineage::load_from_file(&path).unwrap();
    let last = lineage.add_person("Last", Gender::Male).unwrap().id();
    assert_eq!(last, PersonId::new(u64::MAX - 1));
    assert_eq!(lineage.next_id(), PersonId::new(u64::MAX));
}

#[test]
fn test_bad_gender_is_corrupt() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(
        &tmp,
        serde_json::json!([{"id": 1, "name": "A", "gender": "x"}]),
        2,
    );
    assert!(matches!(
        Lineage::load_from_file(&path),
        Err(LineageError::CorruptData(_))
    ));
}

#[test]
fn test_list_snapshots_newest_first() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    storage::ensure_dirs(root).unwrap();
    for name in [
        "lineage 2026-01-02 10.00.00.json",
        "lineage 2026-03-01 08.30.00.json",
        "lineage 2025-12-31 23.59.59.json",
        "notes.txt",
    ] {
        std::fs::write(root.join(name), "{}").unwrap();
    }

    let files = storage::list_snapshots(root).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "lineage 2026-03-01 08.30.00.json",
            "lineage 2026-01-02 10.00.00.json",
            "lineage 2025-12-31 23.59.59.json",
        ]
    );
    assert_eq!(
        storage::latest_snapshot(root).unwrap(),
        Some(root.join("lineage 2026-03-01 08.30.00.json"))
    );
    assert!(storage::autosave_dir(root).is_dir());
}

#[test]
fn test_save_creates_parent_directories() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("autosave").join("a.json");
    sample().save_to_file(&path).unwrap();
    assert!(path.exists());
}
