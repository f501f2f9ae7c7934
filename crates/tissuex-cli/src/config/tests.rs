#[cfg(test)]
mod tests {
    use super::super::*;
    use tissuex_test_utils::{tempdir, write_fixture};

    #[test]
    fn test_flag_beats_env_var() {
        let source = resolve_source(Some(Path::new("run.yaml")), Some("env.toml".to_string()));
        assert_eq!(source, ConfigSource::Required(PathBuf::from("run.yaml")));
    }

    #[test]
    fn test_env_var_beats_default_file() {
        let source = resolve_source(None, Some("/etc/tissuex.toml".to_string()));
        assert_eq!(source, ConfigSource::Required(PathBuf::from("/etc/tissuex.toml")));

        let source = resolve_source(None, Some("  ".to_string()));
        assert_eq!(source, ConfigSource::Optional(PathBuf::from(DEFAULT_CONFIG_FILE)));
    }

    #[test]
    fn test_missing_optional_file_gives_defaults() {
        let dir = tempdir();
        let source = ConfigSource::Optional(dir.path().join(DEFAULT_CONFIG_FILE));
        let config = load_from(&source).unwrap();
        assert_eq!(config, ClassifierConfig::default());
    }

    #[test]
    fn test_missing_required_file_is_an_error() {
        let dir = tempdir();
        let source = ConfigSource::Required(dir.path().join("absent.toml"));
        let err = load_from(&source).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_toml_file_is_loaded_and_validated() {
        let dir = tempdir();
        let good = write_fixture(dir.path(), "good.toml", "[thresholds]\nstable = 8.0\n");
        let config = load_from(&ConfigSource::Required(good)).unwrap();
        assert_eq!(config.thresholds.stable, 8.0);

        let bad = write_fixture(dir.path(), "bad.toml", "[thresholds]\nspecificity = 2.0\n");
        assert!(load_from(&ConfigSource::Required(bad)).is_err());
    }
}
