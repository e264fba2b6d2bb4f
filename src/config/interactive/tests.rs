use super::load_existing_config as load_existing_config_impl;
use super::*;
use tempfile::TempDir;

#[test]
fn load_existing_config_falls_back_to_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = load_existing_config_impl(temp_dir.path());

    assert_eq!(config.get_base_dir(), temp_dir.path());
    assert!(!config.ollama.host.is_empty());
    assert!(config.ollama.port > 0);
    assert!(!config.ollama.model.is_empty());
    assert!(config.chunking.chunk_length > 0);
}

#[test]
fn load_existing_config_reads_saved_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut saved = Config {
        base_dir: temp_dir.path().to_path_buf(),
        ..Config::default()
    };
    saved.retrieval.k = 5;
    saved.save().expect("should save config");

    let config = load_existing_config_impl(temp_dir.path());
    assert_eq!(config.retrieval.k, 5);
}

#[test]
fn connection_test_fails_for_unreachable_host() {
    let ollama = OllamaConfig {
        host: "127.0.0.1".to_string(),
        port: 9,
        ..OllamaConfig::default()
    };
    assert!(!test_ollama_connection(&ollama));
}
