use std::io::Write;
use std::time::Duration;

use aid_config::{load_config, load_snapshot};
use aid_domain::TenantId;

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create fixture");
    file.write_all(content.as_bytes()).expect("write fixture");
    path
}

#[test]
fn load_full_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "aid.yml",
        "agent_name: aid-test\nmax_operation_retry: 3\nretry_cooldown: 10s\n",
    );
    let config = load_config(&path).expect("should load without error");
    assert_eq!(config.agent_name, "aid-test");
    assert_eq!(config.max_operation_retry, 3);
    assert_eq!(config.retry_cooldown, Duration::from_secs(10));
}

#[test]
fn missing_keys_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "aid.yml", "agent_name: aid-test\n");
    let config = load_config(&path).unwrap();
    assert_eq!(config.max_operation_retry, 5);
    assert_eq!(config.retry_cooldown, Duration::from_secs(5));
}

#[test]
fn zero_retry_budget_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "aid.yml", "max_operation_retry: 0\n");
    assert!(load_config(&path).is_err());
}

#[test]
fn missing_file_returns_error() {
    let path = std::path::Path::new("/nonexistent/path/does/not/exist.yml");
    assert!(load_config(path).is_err());
}

#[test]
fn load_snapshot_with_resources_and_faults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "desired.yml",
        concat!(
            "resources:\n",
            "  - kind: Tenant\n",
            "    identity: [t1]\n",
            "  - kind: BridgeDomain\n",
            "    identity: [t1, bd1]\n",
            "    attributes:\n",
            "      arp_flood: \"yes\"\n",
            "faults:\n",
            "  - parent_kind: BridgeDomain\n",
            "    parent_identity: [t1, bd1]\n",
            "    fault_code: F0123\n",
            "    severity: major\n",
        ),
    );
    let snapshot = load_snapshot(&path).expect("should load without error");
    assert_eq!(snapshot.resources.len(), 2);
    assert_eq!(snapshot.faults.len(), 1);
    assert_eq!(snapshot.tenants(), vec![TenantId::new("t1")]);

    let (_, fault) = &snapshot.faults[0];
    assert_eq!(fault.external_identifier, "uni/tn-t1/BD-bd1/fault-F0123");
}

#[test]
fn snapshot_rejects_unknown_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "bad.yml",
        "resources:\n  - kind: FlubberDomain\n    identity: [t1]\n",
    );
    assert!(load_snapshot(&path).is_err());
}
