use std::fs;

use serde_json::{json, Value};
use tempfile::TempDir;

use curator_core::config::CurationConfig;
use curator_core::types::{CandidateRef, SourceList};
use curator_engine::{curate, CandidatePool};
use curator_ingest::{write_mapping_csv, write_report_json, write_subset_csv, write_subset_json, write_unique_json};

fn sources() -> Vec<SourceList> {
    let item = |id: u64| CandidateRef::new(id.to_string(), json!({ "art_id": id, "title": format!("t{id}") }));
    vec![
        SourceList::new("search_1", vec![item(30), item(4), item(100)]),
        SourceList::new("search_2", vec![item(4), item(7)]),
    ]
}

#[test]
fn subset_files_describe_the_curation() {
    let tmp = TempDir::new().unwrap();
    let sources = sources();
    let pool = CandidatePool::build(&sources);
    let curation = curate(&sources, &CurationConfig::new(3, 1).with_seed(5)).expect("curate");

    let json_path = tmp.path().join("out/subset.json");
    write_subset_json(&json_path, &curation, pool.len()).expect("json");
    let written: Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(written["total_unique_artworks"], 3);
    assert_eq!(written["selection_metadata"]["original_total"], 4);
    assert_eq!(written["selection_metadata"]["target_size"], 3);
    assert!(written["selection_metadata"]["generated_at"].is_string());
    let art_ids: Vec<Value> = written["artworks"].as_array().unwrap().iter().map(|a| a["art_id"].clone()).collect();
    let expected: Vec<Value> = curation.items.iter().map(|i| i.payload["art_id"].clone()).collect();
    assert_eq!(art_ids, expected);

    let csv_path = tmp.path().join("out/subset.csv");
    write_subset_csv(&csv_path, &curation).expect("csv");
    let csv = fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("art_id,search_folders,selection_reason"));
    assert!(csv.contains("4,search_1;search_2,multi_folder"));
    assert_eq!(lines.count(), 3);
}

#[test]
fn mapping_is_sorted_by_numeric_id() {
    let tmp = TempDir::new().unwrap();
    let pool = CandidatePool::build(&sources());
    let path = tmp.path().join("mapping.csv");
    write_mapping_csv(&path, &pool).expect("mapping");
    let csv = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec!["art_id,search_folders", "4,search_1;search_2", "7,search_2", "30,search_1", "100,search_1"]
    );
}

#[test]
fn unique_and_report_files_round_out_the_run() {
    let tmp = TempDir::new().unwrap();
    let sources = sources();
    let pool = CandidatePool::build(&sources);
    let curation = curate(&sources, &CurationConfig::new(10, 2).with_seed(1)).expect("curate");

    let unique_path = tmp.path().join("unique.json");
    write_unique_json(&unique_path, &pool).expect("unique");
    let unique: Value = serde_json::from_str(&fs::read_to_string(&unique_path).unwrap()).unwrap();
    assert_eq!(unique["total_unique_artworks"], 4);
    assert_eq!(unique["artworks"][0]["art_id"], 30);

    let report_path = tmp.path().join("report.json");
    write_report_json(&report_path, &curation.report).expect("report");
    let report: Value = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["shortfall"], 6);
    assert_eq!(report["relevance_tier_size"], 1);
    assert_eq!(report["sources"][1]["source_id"], "search_2");
}
