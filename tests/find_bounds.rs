//! End-to-end runs of the batch walker over on-disk grids.

use std::fs;
use std::path::Path;

use plume_plot::config::Config;
use plume_plot::data::grid::Bounds;
use plume_plot::walker::find_bounds;
use tempfile::TempDir;

fn write_config(root: &Path, runs_toml: &str) -> Config {
    let text = format!(
        "data_base_dir = {:?}\ndata_type = \"2d_bc\"\n{runs_toml}",
        root.join("data").to_str().unwrap()
    );
    let path = root.join("plume.toml");
    fs::write(&path, text).unwrap();
    Config::load(&path).unwrap()
}

fn write_grid(root: &Path, run: &str, name: &str, text: &str) {
    let dir = root.join("data").join(run);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), text).unwrap();
}

const ONE_LOOP_TWO_INDICES: &str = r#"
[[runs]]
name = "urban"
[[runs.loops]]
num = 1
[[runs.loops.indices]]
num = 1
[[runs.loops.indices]]
num = 2
"#;

#[test]
fn two_payloads_give_masked_global_bounds() {
    let dir = TempDir::new().unwrap();
    write_grid(dir.path(), "urban", "2d_bc_0001_00000001.txt", "2 3\n4 5\n");
    write_grid(dir.path(), "urban", "2d_bc_0001_00000002.txt", "0 -1\n6 1\n");
    let config = write_config(dir.path(), ONE_LOOP_TWO_INDICES);

    let mut progress = Vec::new();
    let bounds = find_bounds(&config, &mut progress).unwrap();

    assert_eq!(bounds, Bounds { min: Some(1.0), max: Some(6.0) });
    assert_eq!(
        String::from_utf8(progress).unwrap(),
        "urban 2d_bc_0001_00000001\nurban 2d_bc_0001_00000002\n"
    );
}

#[test]
fn bounds_do_not_depend_on_visit_order() {
    let dir = TempDir::new().unwrap();
    write_grid(dir.path(), "urban", "2d_bc_0001_00000001.txt", "2 3\n4 5\n");
    write_grid(dir.path(), "urban", "2d_bc_0001_00000002.txt", "0 -1\n6 1\n");

    let forward = write_config(dir.path(), ONE_LOOP_TWO_INDICES);
    let reversed = write_config(
        dir.path(),
        r#"
[[runs]]
name = "urban"
[[runs.loops]]
num = 1
[[runs.loops.indices]]
num = 2
[[runs.loops.indices]]
num = 1
"#,
    );

    let a = find_bounds(&forward, &mut std::io::sink()).unwrap();
    let b = find_bounds(&reversed, &mut std::io::sink()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn every_leaf_is_visited_once_across_runs() {
    let dir = TempDir::new().unwrap();
    for (run, name) in [
        ("a", "2d_bc_0001_00000001.txt"),
        ("a", "2d_bc_0002_00000007.txt"),
        ("b", "2d_bc_0001_00000003.txt"),
    ] {
        write_grid(dir.path(), run, name, "1\n");
    }
    let config = write_config(
        dir.path(),
        r#"
[[runs]]
name = "a"
[[runs.loops]]
num = 1
[[runs.loops.indices]]
num = 1
[[runs.loops]]
num = 2
[[runs.loops.indices]]
num = 7

[[runs]]
name = "b"
[[runs.loops]]
num = 1
[[runs.loops.indices]]
num = 3
"#,
    );

    let mut progress = Vec::new();
    find_bounds(&config, &mut progress).unwrap();
    let lines: Vec<String> = String::from_utf8(progress)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(
        lines,
        [
            "a 2d_bc_0001_00000001",
            "a 2d_bc_0002_00000007",
            "b 2d_bc_0001_00000003",
        ]
    );
}

#[test]
fn all_masked_batch_leaves_bounds_unset() {
    let dir = TempDir::new().unwrap();
    write_grid(dir.path(), "urban", "2d_bc_0001_00000001.txt", "0 0\n");
    write_grid(dir.path(), "urban", "2d_bc_0001_00000002.txt", "-1 -2\n");
    let config = write_config(dir.path(), ONE_LOOP_TWO_INDICES);

    let bounds = find_bounds(&config, &mut std::io::sink()).unwrap();
    assert!(!bounds.is_set());
}

#[test]
fn missing_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_grid(dir.path(), "urban", "2d_bc_0001_00000001.txt", "1 2\n");
    let config = write_config(dir.path(), ONE_LOOP_TWO_INDICES);

    let err = find_bounds(&config, &mut std::io::sink()).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("2d_bc_0001_00000002.txt"), "{chain}");
}
