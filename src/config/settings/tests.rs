use super::*;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.provider.base_url, "https://api.openai.com/v1/");
    assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
    assert_eq!(config.provider.embedding_model, "text-embedding-3-large");
    assert_eq!(config.provider.completion_model, "gpt-4.1-mini");
    assert_eq!(config.provider.embedding_dimension, 3072);
    assert_eq!(config.provider.retry_attempts, 1);
    assert_eq!(config.chunking.chunk_size, 800);
    assert_eq!(config.chunking.overlap, 120);
    assert_eq!(config.retrieval.top_k, 4);
    assert!(!config.indexing.purge_stale_chunks);
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.provider.base_url = "ftp://example.com/".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.provider.base_url = "not a url".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidUrl(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.provider.embedding_model = "   ".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.provider.batch_size = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.chunking.overlap = 800;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::OverlapTooLarge(800, 800))
    ));

    let mut invalid_config = config;
    invalid_config.retrieval.top_k = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTopK(0))
    ));
}

#[test]
fn endpoint_url_gets_trailing_slash() {
    let mut config = ProviderConfig::default();
    config.base_url = "http://localhost:11434/v1".to_string();

    let url = config
        .endpoint_url()
        .expect("should generate endpoint url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/v1/");
    assert_eq!(
        url.join("embeddings").expect("can join path").as_str(),
        "http://localhost:11434/v1/embeddings"
    );
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}

#[test]
fn partial_toml_uses_defaults() {
    let partial_toml = r#"
        [provider]
        embedding_model = "nomic-embed-text"

        [chunking]
        chunk_size = 400
    "#;

    let config: Config = toml::from_str(partial_toml).expect("should parse partial toml");
    assert_eq!(config.provider.embedding_model, "nomic-embed-text");
    assert_eq!(config.provider.completion_model, "gpt-4.1-mini");
    assert_eq!(config.chunking.chunk_size, 400);
    assert_eq!(config.chunking.overlap, 120);
    assert_eq!(config.retrieval.top_k, 4);
}

#[test]
fn load_missing_config_returns_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let config = Config::load(temp_dir.path()).expect("should load default config");
    assert_eq!(config.get_base_dir(), temp_dir.path());
    assert_eq!(config.provider, ProviderConfig::default());
}

#[test]
fn save_and_reload() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = Config::load(temp_dir.path()).expect("should load default config");
    config
        .provider
        .set_completion_model("gpt-4.1".to_string())
        .expect("valid model name");
    config.retrieval.top_k = 8;

    config.save().expect("should save config");
    assert!(config.config_file_path().exists());

    let reloaded = Config::load(temp_dir.path()).expect("should reload config");
    assert_eq!(reloaded, config);
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[chunking]\nchunk_size = 100\noverlap = 200\n",
    )
    .expect("should write config file");

    assert!(Config::load(temp_dir.path()).is_err());
}

#[test]
fn setter_validation() {
    let mut config = ProviderConfig::default();

    assert!(
        config
            .set_base_url("http://localhost:8080/v1/".to_string())
            .is_ok()
    );
    assert!(config.set_embedding_model("new-model".to_string()).is_ok());
    assert!(config.set_embedding_dimension(768).is_ok());
    assert!(config.set_batch_size(128).is_ok());
    assert!(config.set_retry_attempts(3).is_ok());

    assert!(config.set_base_url("ws://localhost".to_string()).is_err());
    assert!(config.set_completion_model(String::new()).is_err());
    assert!(config.set_embedding_dimension(0).is_err());
    assert!(config.set_batch_size(0).is_err());
    assert!(config.set_batch_size(2049).is_err());
    assert!(config.set_retry_attempts(0).is_err());

    assert_eq!(config.base_url, "http://localhost:8080/v1/");
    assert_eq!(config.embedding_dimension, 768);
}

#[test]
#[serial]
fn api_key_from_environment() {
    let config = ProviderConfig {
        api_key_env: "PDF_RAG_TEST_API_KEY".to_string(),
        ..ProviderConfig::default()
    };

    // SAFETY: serialized test, no other thread reads this variable
    unsafe { env::set_var("PDF_RAG_TEST_API_KEY", "sk-test") };
    assert_eq!(config.api_key(), Some("sk-test".to_string()));

    // SAFETY: see above
    unsafe { env::set_var("PDF_RAG_TEST_API_KEY", "  ") };
    assert_eq!(config.api_key(), None);

    // SAFETY: see above
    unsafe { env::remove_var("PDF_RAG_TEST_API_KEY") };
    assert_eq!(config.api_key(), None);
}
