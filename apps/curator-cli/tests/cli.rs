use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::json;
use tempfile::TempDir;

fn cmd(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("curator").unwrap();
    cmd.current_dir(cwd).env("RUST_ENV", "dev").env("RUST_LOG", "warn");
    cmd
}

/// Three variants of 8 images each; ids 0 and 1 appear in every variant.
fn seed_run(root: &Path) {
    for s in 1..=3u64 {
        let mut ids = vec![0u64, 1];
        ids.extend((0..6).map(|i| s * 100 + i));
        let images: Vec<_> = ids.iter().map(|id| json!({ "art_id": id, "title": format!("art {id}") })).collect();
        let dir = root.join(format!("search_{s}"));
        fs::create_dir_all(&dir).unwrap();
        let body = json!({ "query": format!("variant {s}"), "results": { "total": 500, "images": images } });
        fs::write(dir.join("search_results.json"), body.to_string()).unwrap();
    }
}

#[test]
fn curate_writes_subset_files() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("prompt1");
    seed_run(&root);
    let out = tmp.path().join("curated");

    cmd(tmp.path())
        .args(["curate", root.to_str().unwrap(), "--out", out.to_str().unwrap(), "--target", "10", "--seed", "42"])
        .assert()
        .success()
        .stdout(contains("Selected: 10"))
        .stdout(contains("Cross-query candidates: 2"));

    let subset: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("prompt1_subset_10.json")).unwrap()).unwrap();
    assert_eq!(subset["artworks"].as_array().unwrap().len(), 10);
    // 2 shared ids plus 6 private per variant
    assert_eq!(subset["selection_metadata"]["original_total"], 20);
    assert!(out.join("prompt1_subset_10.csv").exists());
    assert!(out.join("prompt1_fill_report.json").exists());
}

#[test]
fn inspect_prints_distribution_and_writes_mapping() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("prompt2");
    seed_run(&root);
    let out = tmp.path().join("mapping");

    cmd(tmp.path())
        .args(["inspect", root.to_str().unwrap(), "--out", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Total unique artworks: 20"))
        .stdout(contains("2 artworks appeared in 3 folder(s)"));

    assert!(out.join("prompt2_art_id_mapping.csv").exists());
    assert!(out.join("prompt2_unique_artworks.json").exists());
}

#[test]
fn zero_target_fails() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("prompt3");
    seed_run(&root);

    cmd(tmp.path())
        .args(["curate", root.to_str().unwrap(), "--out", tmp.path().join("o").to_str().unwrap(), "--target", "0"])
        .assert()
        .failure()
        .stderr(contains("target_size"));
}

#[test]
fn missing_root_fails() {
    let tmp = TempDir::new().unwrap();
    cmd(tmp.path())
        .args(["inspect", tmp.path().join("absent").to_str().unwrap()])
        .assert()
        .failure();
}
