use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

use curator_core::traits::SourceProvider;
use curator_ingest::{discover_sources, load_source, load_sources, FolderSource, DEFAULT_PREFIX, RESULTS_FILE};

fn write_results(root: &Path, folder: &str, body: serde_json::Value) {
    let dir = root.join(folder);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(RESULTS_FILE), serde_json::to_string_pretty(&body).unwrap()).unwrap();
}

fn results(query: &str, total: u64, ids: &[u64]) -> serde_json::Value {
    json!({
        "timestamp": "20250101_120000",
        "query": query,
        "parameters_used": { "keywords": query },
        "results": {
            "total": total,
            "images": ids.iter().map(|id| json!({ "art_id": id, "title": format!("art {id}") })).collect::<Vec<_>>(),
        }
    })
}

#[test]
fn discovers_prefixed_folders_in_numeric_order() {
    let tmp = TempDir::new().unwrap();
    for name in ["search_10", "search_2", "search_1", "notes", "search_extra"] {
        fs::create_dir_all(tmp.path().join(name)).unwrap();
    }
    fs::write(tmp.path().join("search_3.json"), "{}").unwrap();

    let dirs = discover_sources(tmp.path(), DEFAULT_PREFIX).expect("discover");
    let names: Vec<String> = dirs.iter().map(|d| d.file_name().unwrap().to_string_lossy().to_string()).collect();
    assert_eq!(names, vec!["search_1", "search_2", "search_10", "search_extra"]);
}

#[test]
fn missing_root_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(discover_sources(&tmp.path().join("nope"), DEFAULT_PREFIX).is_err());
}

#[test]
fn parses_images_total_and_label() {
    let tmp = TempDir::new().unwrap();
    write_results(tmp.path(), "search_1", results("flat icons", 5400, &[11, 12, 13]));

    let source = load_source(&tmp.path().join("search_1")).expect("load");
    assert_eq!(source.source_id, "search_1");
    assert_eq!(source.label.as_deref(), Some("flat icons"));
    assert_eq!(source.available_total, 5400);
    let ids: Vec<&str> = source.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["11", "12", "13"]);
    assert_eq!(source.items[0].payload["title"], "art 11");
}

#[test]
fn images_without_art_id_are_skipped() {
    let tmp = TempDir::new().unwrap();
    write_results(
        tmp.path(),
        "search_1",
        json!({ "results": { "images": [ { "art_id": 1 }, { "title": "orphan" }, { "art_id": "x-2" } ] } }),
    );
    let source = load_source(&tmp.path().join("search_1")).expect("load");
    let ids: Vec<&str> = source.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "x-2"]);
    // no reported total: falls back to what was listed
    assert_eq!(source.available_total, 2);
}

#[test]
fn missing_results_file_gives_empty_source() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("search_4")).unwrap();
    let source = FolderSource::new(tmp.path().join("search_4")).fetch().expect("fetch");
    assert_eq!(source.source_id, "search_4");
    assert!(source.is_empty());
}

#[test]
fn corrupt_json_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("search_1");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(RESULTS_FILE), "{ not json").unwrap();
    let err = load_source(&dir).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse"));
}

#[tokio::test]
async fn loads_all_folders_concurrently_in_order() {
    let tmp = TempDir::new().unwrap();
    for s in 1..=6u64 {
        let ids: Vec<u64> = (0..20).map(|i| s * 1000 + i).collect();
        write_results(tmp.path(), &format!("search_{s}"), results(&format!("variant {s}"), 100, &ids));
    }
    let sources = load_sources(tmp.path(), DEFAULT_PREFIX).await.expect("load");
    assert_eq!(sources.len(), 6);
    for (i, source) in sources.iter().enumerate() {
        assert_eq!(source.source_id, format!("search_{}", i + 1));
        assert_eq!(source.len(), 20);
    }
}

#[tokio::test]
async fn one_bad_folder_fails_the_batch() {
    let tmp = TempDir::new().unwrap();
    write_results(tmp.path(), "search_1", results("ok", 1, &[1]));
    let bad = tmp.path().join("search_2");
    fs::create_dir_all(&bad).unwrap();
    fs::write(bad.join(RESULTS_FILE), "[1, 2").unwrap();

    let err = load_sources(tmp.path(), DEFAULT_PREFIX).await.unwrap_err();
    assert!(format!("{err:#}").contains("search_2"));
}
