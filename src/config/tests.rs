use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_insight_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("INSIGHT_PORT");
        env::remove_var("INSIGHT_BIND_ADDR");
        env::remove_var("INSIGHT_VOCABULARY_PATH");
        env::remove_var("INSIGHT_LOAD_VECTORS");
        env::remove_var("INSIGHT_OPENAI_API_KEY");
        env::remove_var("INSIGHT_OPENAI_BASE_URL");
        env::remove_var("INSIGHT_EMBEDDING_MODEL");
        env::remove_var("INSIGHT_EMBEDDING_DIM");
        env::remove_var("INSIGHT_ASSISTANT_MODEL");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert!(config.vocabulary_path.is_none());
    assert!(config.load_vectors);
    assert!(config.openai_api_key.is_none());
    assert_eq!(config.embedding_model, "text-embedding-3-small");
    assert_eq!(config.embedding_dim, 1536);
    assert!(config.assistant_model.is_none());
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_insight_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8080);
    assert!(config.load_vectors);
    assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_insight_env();

    with_env_vars(
        &[
            ("INSIGHT_PORT", "3000"),
            ("INSIGHT_LOAD_VECTORS", "false"),
            ("INSIGHT_OPENAI_API_KEY", "sk-test"),
            ("INSIGHT_EMBEDDING_DIM", "256"),
            ("INSIGHT_ASSISTANT_MODEL", "claude-haiku-4-5"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.port, 3000);
            assert!(!config.load_vectors);
            assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
            assert_eq!(config.embedding_dim, 256);
            assert_eq!(config.assistant_model.as_deref(), Some("claude-haiku-4-5"));
        },
    );
}

#[test]
#[serial]
fn test_from_env_blank_key_is_none() {
    clear_insight_env();

    with_env_vars(&[("INSIGHT_OPENAI_API_KEY", "   ")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.openai_api_key.is_none());
    });
}

#[test]
#[serial]
fn test_from_env_invalid_port_zero() {
    clear_insight_env();

    with_env_vars(&[("INSIGHT_PORT", "0")], || {
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidPort { .. })));
    });
}

#[test]
#[serial]
fn test_from_env_invalid_port_string() {
    clear_insight_env();

    with_env_vars(&[("INSIGHT_PORT", "not-a-port")], || {
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::PortParseError { .. })));
    });
}

#[test]
#[serial]
fn test_from_env_invalid_bind_addr() {
    clear_insight_env();

    with_env_vars(&[("INSIGHT_BIND_ADDR", "not.an.ip")], || {
        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidBindAddr { .. })));
    });
}

#[test]
#[serial]
fn test_from_env_invalid_dimension() {
    clear_insight_env();

    with_env_vars(&[("INSIGHT_EMBEDDING_DIM", "wide")], || {
        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "INSIGHT_EMBEDDING_DIM",
                ..
            })
        ));
    });
}

#[test]
fn test_validate_missing_vocabulary_file() {
    let config = Config {
        vocabulary_path: Some(PathBuf::from("/definitely/not/here.jsonl")),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));
}

#[test]
fn test_validate_vocabulary_path_is_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = Config {
        vocabulary_path: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::NotAFile { .. })));
}

#[test]
fn test_validate_zero_dimension() {
    let config = Config {
        embedding_dim: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
#[serial]
fn test_list_from_env() {
    with_env_vars(&[("INSIGHT_TEST_LIST", "1, 3,5,")], || {
        let list = list_from_env("INSIGHT_TEST_LIST", vec![9]).unwrap();
        assert_eq!(list, vec![1, 3, 5]);
    });

    let list = list_from_env("INSIGHT_TEST_LIST", vec![9]).unwrap();
    assert_eq!(list, vec![9]);

    with_env_vars(&[("INSIGHT_TEST_LIST", "1,x")], || {
        assert!(list_from_env("INSIGHT_TEST_LIST", vec![]).is_err());
    });
}

#[test]
#[serial]
fn test_bool_from_env() {
    with_env_vars(&[("INSIGHT_TEST_FLAG", "0")], || {
        assert!(!bool_from_env("INSIGHT_TEST_FLAG", true));
    });
    with_env_vars(&[("INSIGHT_TEST_FLAG", "yes")], || {
        assert!(bool_from_env("INSIGHT_TEST_FLAG", false));
    });
    assert!(bool_from_env("INSIGHT_TEST_FLAG", true));
}
