//! CLI flag contract tests
//!
//! Runs the lngraph binary against an embedded `file://` store to verify
//! that input flags, --nodelete, stats output and exit codes work.

use std::path::{Path, PathBuf};
use std::process::Command;

fn lngraph_bin() -> String {
    env!("CARGO_BIN_EXE_lngraph").to_string()
}

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .display()
        .to_string()
}

fn store_url(dir: &Path) -> String {
    format!("file://{}", dir.join("store").display())
}

/// Run lngraph with the given args, returning (exit code, stdout, stderr)
fn run_lngraph(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(lngraph_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .env("HOME", std::env::temp_dir())
        .env("XDG_CONFIG_HOME", std::env::temp_dir().join("lngraph-test-config"))
        .output()
        .expect("Failed to run lngraph");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

/// Count printed by `stats` for a label or relationship type
fn stat(stdout: &str, name: &str) -> Option<u64> {
    stdout.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        if parts.next() == Some(name) {
            parts.next().and_then(|n| n.parse().ok())
        } else {
            None
        }
    })
}

fn import_graph(url: &str, extra_args: &[&str]) -> (i32, String, String) {
    let graph = fixture("describegraph.json");
    let mut args = vec!["--url", url, "--no-progress", "--graph", graph.as_str()];
    args.extend_from_slice(extra_args);
    run_lngraph(&args)
}

#[test]
fn test_import_then_stats() {
    let dir = tempfile::tempdir().unwrap();
    let url = store_url(dir.path());
    let (txns, peers, info) = (
        fixture("listchaintxns.json"),
        fixture("listpeers.json"),
        fixture("getinfo.json"),
    );

    let (code, stdout, stderr) = import_graph(
        &url,
        &["--chaintxns", &txns, "--peers", &peers, "--getinfo", &info],
    );
    assert_eq!(code, 0, "import failed: {stderr}");
    assert!(stdout.contains("3 nodes, 2 channels, 3 transactions, 2 peers"));

    let (code, stdout, _) = run_lngraph(&["--url", &url, "stats"]);
    assert_eq!(code, 0);
    assert_eq!(stat(&stdout, "Node"), Some(3));
    assert_eq!(stat(&stdout, "Channel"), Some(2));
    assert_eq!(stat(&stdout, "Transaction"), Some(3));
    assert_eq!(stat(&stdout, "OPENED"), Some(4));
    assert_eq!(stat(&stdout, "FUNDED"), Some(1));
    assert_eq!(stat(&stdout, "PEER"), Some(2));
}

#[test]
fn test_reimport_replaces_data() {
    let dir = tempfile::tempdir().unwrap();
    let url = store_url(dir.path());

    for _ in 0..2 {
        let (code, _, stderr) = import_graph(&url, &[]);
        assert_eq!(code, 0, "import failed: {stderr}");
    }

    let (_, stdout, _) = run_lngraph(&["--url", &url, "stats"]);
    assert_eq!(stat(&stdout, "Node"), Some(3));
    assert_eq!(stat(&stdout, "OPENED"), Some(4));
}

#[test]
fn test_nodelete_keeps_existing_data() {
    let dir = tempfile::tempdir().unwrap();
    let url = store_url(dir.path());

    let (code, _, _) = import_graph(&url, &[]);
    assert_eq!(code, 0);
    let (code, _, stderr) = import_graph(&url, &["--nodelete"]);
    assert_eq!(code, 0, "import failed: {stderr}");

    let (_, stdout, _) = run_lngraph(&["--url", &url, "stats"]);
    assert_eq!(stat(&stdout, "Node"), Some(6));
    assert_eq!(stat(&stdout, "Channel"), Some(4));
}

#[test]
fn test_channel_with_unknown_node_fails() {
    let dir = tempfile::tempdir().unwrap();
    let graph = dir.path().join("graph.json");
    std::fs::write(
        &graph,
        r#"{"nodes":[{"pub_key":"02aa"}],
            "edges":[{"channel_id":"7","chan_point":"abc:0","node1_pub":"02aa","node2_pub":"03bb","capacity":"1000"}]}"#,
    )
    .unwrap();

    let url = store_url(dir.path());
    let (code, _, stderr) = run_lngraph(&[
        "--url",
        &url,
        "--no-progress",
        "--graph",
        graph.to_str().unwrap(),
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Error"), "stderr: {stderr}");
    assert!(stderr.contains("03bb"), "stderr: {stderr}");
}

#[test]
fn test_malformed_json_fails() {
    let dir = tempfile::tempdir().unwrap();
    let graph = dir.path().join("graph.json");
    std::fs::write(&graph, "{\"nodes\": [").unwrap();

    let url = store_url(dir.path());
    let (code, _, stderr) = run_lngraph(&[
        "--url",
        &url,
        "--no-progress",
        "--graph",
        graph.to_str().unwrap(),
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("failed to decode channel graph"), "stderr: {stderr}");
}

#[test]
fn test_graph_from_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let dir = tempfile::tempdir().unwrap();
    let url = store_url(dir.path());
    let body = std::fs::read(fixture("describegraph.json")).unwrap();

    let mut child = Command::new(lngraph_bin())
        .args(["--url", &url, "--no-progress", "--graph", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run lngraph");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(&body)
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let (_, stdout, _) = run_lngraph(&["--url", &url, "stats"]);
    assert_eq!(stat(&stdout, "Channel"), Some(2));
}

#[test]
fn test_two_stdin_inputs_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let url = store_url(dir.path());
    let (code, _, stderr) = run_lngraph(&[
        "--url",
        &url,
        "--graph",
        "-",
        "--chaintxns",
        "-",
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("only one input can be read from stdin"));
}

#[test]
fn test_peers_without_getinfo_is_usage_error() {
    let peers = fixture("listpeers.json");
    let (code, _, stderr) = run_lngraph(&["--url", "memory:", "--peers", &peers]);
    assert_eq!(code, 2);
    assert!(stderr.contains("--getinfo"));
}

#[test]
fn test_unsupported_url() {
    let (code, _, stderr) = run_lngraph(&["--url", "http://localhost:7474", "stats"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unsupported store url"), "stderr: {stderr}");
}

#[cfg(not(feature = "lnd"))]
#[test]
fn test_grpc_needs_lnd_feature() {
    let (code, _, stderr) = run_lngraph(&["--url", "memory:", "--lnd-grpc", "localhost:10009"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("`lnd` feature"), "stderr: {stderr}");
}
