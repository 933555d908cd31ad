use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Contents of `urlshelf.toml`; every key is optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UrlshelfConfig {
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub poll_interval_ms: Option<u64>,
}

impl UrlshelfConfig {
    /// The config written by `urlshelf init`
    pub fn with_defaults() -> Self {
        Self {
            database: Some(default_database_path().to_string_lossy().to_string()),
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
            poll_interval_ms: Some(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// Values from the command line; these win over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Effective settings after merging CLI, config file, and defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database: PathBuf,
    pub host: String,
    pub port: u16,
    pub poll_interval: Duration,
}

impl Settings {
    pub fn resolve(overrides: Overrides, config: Option<UrlshelfConfig>) -> Self {
        let config = config.unwrap_or_default();

        Self {
            database: overrides
                .database
                .or_else(|| config.database.map(PathBuf::from))
                .unwrap_or_else(default_database_path),
            host: overrides
                .host
                .or(config.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(config.port).unwrap_or(DEFAULT_PORT),
            poll_interval: Duration::from_millis(
                config
                    .poll_interval_ms
                    .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
                    .max(1),
            ),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("urlshelf.toml")
}

pub fn default_database_path() -> PathBuf {
    default_database_path_in(Path::new(""))
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".urlshelf").join("urlshelf.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<UrlshelfConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: UrlshelfConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &UrlshelfConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn ensure_gitignore(project_root: &Path) -> anyhow::Result<()> {
    let gitignore_path = project_root.join(".gitignore");
    let entry = ".urlshelf/";

    let mut content = String::new();
    if gitignore_path.exists() {
        content = std::fs::read_to_string(&gitignore_path)?;
        if content.lines().any(|line| line.trim() == entry) {
            return Ok(());
        }
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
    }
    content.push_str(entry);
    content.push('\n');
    std::fs::write(&gitignore_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_file() {
        let config = UrlshelfConfig {
            database: Some("from-file.db".to_string()),
            host: Some("0.0.0.0".to_string()),
            port: Some(8080),
            poll_interval_ms: Some(250),
        };
        let overrides = Overrides {
            port: Some(9000),
            ..Default::default()
        };

        let settings = Settings::resolve(overrides, Some(config));
        assert_eq!(settings.database, PathBuf::from("from-file.db"));
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_defaults_without_config() {
        let settings = Settings::resolve(Overrides::default(), None);
        assert_eq!(settings.database, PathBuf::from(".urlshelf/urlshelf.db"));
        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.poll_interval, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS));
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urlshelf.toml");

        let config = UrlshelfConfig::with_defaults();
        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urlshelf.toml");
        std::fs::write(&path, "port = 4000\n").unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.port, Some(4000));
        assert!(loaded.database.is_none());
        assert!(load_config(Some(&dir.path().join("missing.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_gitignore_entry_added_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "target").unwrap();

        ensure_gitignore(dir.path()).unwrap();
        ensure_gitignore(dir.path()).unwrap();

        let contents = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(contents, "target\n.urlshelf/\n");
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("urls.db");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}
