use chatpad::config::InferenceConfig;
use chatpad::inference::InferenceClient;
use chatpad::storage::SledStore;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::MockServer;

#[allow(dead_code)]
pub fn create_temp_storage() -> (SledStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("sessions.db");
    let storage = SledStore::new(db_path).expect("failed to create sled storage with path");
    (storage, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Inference client pointed at `/models/test` on the mock server
#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> InferenceClient {
    let config = InferenceConfig {
        api_url: format!("{}/models/test", server.uri()),
        ..Default::default()
    };
    InferenceClient::new(config).expect("failed to create inference client")
}
