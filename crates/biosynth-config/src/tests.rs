#[cfg(test)]
mod tests {
    use super::super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.cache.result_ttl_secs, 3600);
        assert_eq!(config.pipeline.max_sequence_length, 10_000);
        assert!(config.cache.redis_url.is_none());
        assert!(config.credentials.anthropic().is_none());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [pipeline]
            simulation_seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.simulation_seed, 7);
        assert_eq!(config.pipeline.external_timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("CLAUDE_API_KEY", "sk-test"),
                ("CACHE_TTL", "60"),
                ("REDIS_URL", "redis://cache:6379"),
            ]))
            .unwrap();
        assert_eq!(config.credentials.anthropic(), Some("sk-test"));
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.redis_url.as_deref(), Some("redis://cache:6379"));
    }

    #[test]
    fn test_cache_ttl_env_sets_both_lifetimes() {
        let mut config = Config::from_toml_str(
            r#"
            [cache]
            ttl_secs = 1800
            result_ttl_secs = 7200
            "#,
        )
        .unwrap();
        assert_eq!(config.cache.result_ttl(), Duration::from_secs(7200));

        config.apply_env(env(&[("CACHE_TTL", "60")])).unwrap();
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.cache.result_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_env_number_is_rejected() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("CACHE_TTL", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_placeholder_keys_count_as_absent() {
        let mut config = Config::default();
        config
            .apply_env(env(&[("CLAUDE_API_KEY", "your_claude_api_key_here"), ("GEMINI_API_KEY", "  ")]))
            .unwrap();
        assert!(config.credentials.anthropic().is_none());
        assert!(config.credentials.gemini().is_none());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let mut config = Config::default();
        config.apply_env(env(&[("GEMINI_API_KEY", "secret-value")])).unwrap();
        let printed = format!("{:?}", config.credentials);
        assert!(!printed.contains("secret-value"));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9100").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9100);
    }
}
