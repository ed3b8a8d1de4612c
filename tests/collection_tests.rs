//! End-to-end collection against a fake user profile on disk.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use daas_detector::{
    read_settings_files, ArtifactAggregator, ArtifactKind, CollectionEnvironment, CollectionError,
    CollectorSettings, CookieCollector, CookieEntry, DataProtection, DetectorConfig,
    RegistryCollector, RegistrySource, RegistryValue, SettingsFileSpec,
};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

const KEY: [u8; 32] = [0x42; 32];

/// Unwraps only the local-state key blob; cookie values always fail, which
/// forces the AES-GCM path.
struct KeyOnlyProtection;

impl DataProtection for KeyOnlyProtection {
    fn unprotect(&self, blob: &[u8]) -> Result<Vec<u8>, CollectionError> {
        if blob == &KEY[..] {
            Ok(blob.to_vec())
        } else {
            Err(CollectionError::Decryption("not a DPAPI blob".to_string()))
        }
    }
}

struct NoRegistry;

impl RegistrySource for NoRegistry {
    fn read_first_value(&self, key_path: &str) -> Result<RegistryValue, CollectionError> {
        Err(CollectionError::PathNotFound(key_path.to_string()))
    }
}

fn encrypt(plaintext: &[u8], nonce: &[u8; 12]) -> Vec<u8> {
    let cipher = Aes256Gcm::new_from_slice(&KEY).unwrap();
    let mut out = b"v10".to_vec();
    out.extend_from_slice(nonce);
    out.extend_from_slice(&cipher.encrypt(Nonce::from_slice(nonce), plaintext).unwrap());
    out
}

fn workspaces_dir(root: &Path) -> PathBuf {
    root.join("Amazon Web Services").join("Amazon WorkSpaces")
}

fn build_profile_tree(root: &Path) {
    let target = workspaces_dir(root);
    let network = target.join("EBWebView").join("Default").join("Network");
    fs::create_dir_all(&network).unwrap();
    fs::create_dir_all(target.join("logs")).unwrap();

    fs::write(
        target.join("UserSettings.json"),
        r#"{"CurrentRegistration": "abc", "WindowState": "Maximized"}"#,
    )
    .unwrap();
    fs::write(target.join("logs").join("workspaces.log"), "launched\nconnected\n").unwrap();

    let mut wrapped = b"DPAPI".to_vec();
    wrapped.extend_from_slice(&KEY);
    let local_state = json!({
        "os_crypt": {
            "encrypted_key": base64::engine::general_purpose::STANDARD.encode(&wrapped)
        }
    });
    fs::write(target.join("EBWebView").join("Local State"), local_state.to_string()).unwrap();

    let conn = Connection::open(network.join("Cookies")).unwrap();
    conn.execute(
        "CREATE TABLE cookies (host_key TEXT NOT NULL, name TEXT NOT NULL, value TEXT NOT NULL, encrypted_value BLOB)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO cookies VALUES (?1, ?2, '', ?3)",
        rusqlite::params![".workspaces.aws", "session", encrypt(b"s3cr3t", &[1; 12])],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO cookies VALUES (?1, ?2, '', ?3)",
        rusqlite::params![".workspaces.aws", "corrupt", vec![b'v', b'1', b'0', 0, 1, 2]],
    )
    .unwrap();
}

fn aggregator(root: &Path) -> ArtifactAggregator {
    ArtifactAggregator::new(
        CollectionEnvironment::new(root, root.join("profile")),
        CollectorSettings::default(),
    )
    .with_collector(Box::new(RegistryCollector::with_source(Box::new(NoRegistry))))
    .with_collector(Box::new(CookieCollector::with_protection(Box::new(KeyOnlyProtection))))
}

#[test]
fn one_valid_and_one_missing_settings_file() {
    let root = tempfile::tempdir().unwrap();
    build_profile_tree(root.path());

    let specs = vec![
        SettingsFileSpec {
            file_name: "UserSettings.json".to_string(),
            keys: vec!["CurrentRegistration".to_string()],
        },
        SettingsFileSpec {
            file_name: "RegistrationList.json".to_string(),
            keys: vec!["RegistrationCode".to_string(), "RegionKey".to_string(), "OrgName".to_string()],
        },
    ];
    let results = read_settings_files(&workspaces_dir(root.path()), &specs);

    assert_eq!(results.len(), 2);
    assert_eq!(results.iter().filter(|r| r.extract_flag()).count(), 1);
    assert_eq!(results.iter().filter(|r| r.error_flag()).count(), 1);
    assert!(results[1].error_msg().contains("does not exist"));
}

#[test]
fn amazon_workspaces_profile_end_to_end() {
    let root = tempfile::tempdir().unwrap();
    build_profile_tree(root.path());

    let config = DetectorConfig::default();
    let profile = config.service("Amazon WorkSpaces").unwrap();
    let report = aggregator(root.path()).collect(profile);

    // Registry is the only failure
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, ArtifactKind::Registry);
    assert!(matches!(report.failures[0].error, CollectionError::PathNotFound(_)));

    let appdata: Vec<_> = report.records_of(ArtifactKind::AppData).collect();
    assert_eq!(appdata.len(), 3);
    assert_eq!(appdata[0].file_name, "Amazon WorkSpaces");
    assert!(appdata[0].content.starts_with("Amazon WorkSpaces:\n"));
    assert!(appdata[0].content.contains("\n    workspaces.log"));
    let settings: Value = serde_json::from_str(&appdata[1].content).unwrap();
    assert_eq!(settings, json!({"CurrentRegistration": "abc"}));
    assert!(appdata[2].content.starts_with("File does not exist:"));

    let cookies: Vec<_> = report.records_of(ArtifactKind::Cookie).collect();
    assert_eq!(cookies.len(), 1);
    let entries: Vec<CookieEntry> = serde_json::from_str(&cookies[0].content).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].value.as_deref(), Some("s3cr3t"));
    assert_eq!(entries[1].name, "corrupt");
    assert_eq!(entries[1].value, None);

    let logs: Vec<_> = report.records_of(ArtifactKind::Log).collect();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].content, "launched\nconnected\n");

    let kinds: Vec<ArtifactKind> = report.records.iter().map(|r| r.file_type).collect();
    let mut sorted = kinds.clone();
    sorted.sort_by_key(|k| ArtifactKind::ALL.iter().position(|a| a == k));
    assert_eq!(kinds, sorted, "records follow collection order");
    assert!(report.records.iter().all(|r| !r.file_name.is_empty()));
}

#[test]
fn missing_client_directory_fails_file_based_kinds_only() {
    let root = tempfile::tempdir().unwrap();
    let config = DetectorConfig::default();
    let report = aggregator(root.path()).collect(config.service("Amazon WorkSpaces").unwrap());

    assert!(report.records.is_empty());
    let kinds: Vec<ArtifactKind> = report.failures.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, ArtifactKind::ALL.to_vec());
    assert!(report.failures[1]
        .error
        .to_string()
        .ends_with("Amazon Web Services folder not found"));
}

#[test]
fn report_serializes_for_json_output() {
    let root = tempfile::tempdir().unwrap();
    build_profile_tree(root.path());
    let config = DetectorConfig::default();
    let report = aggregator(root.path()).collect(config.service("Amazon WorkSpaces").unwrap());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["service_name"], "Amazon WorkSpaces");
    assert_eq!(json["records"][0]["file_type"], "AppData");
    assert_eq!(json["failures"][0]["kind"], "Registry");
}
