use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::{
    storage::{file_storage::FileStorage, sqlite_storage::SQLiteStorage, storage::SlotStorage},
    todos::store::{TodoStore, DEFAULT_SLOT_KEY},
};

const APP_PREFIX: &str = "task_calendar";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    backend: Backend,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
enum BackendStrains {
    #[default]
    File,
    SQLite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct Backend {
    #[serde(default)]
    strain: BackendStrains,
    uri: Option<String>,
    #[serde(default = "default_key")]
    key: String,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            strain: BackendStrains::default(),
            uri: None,
            key: default_key(),
        }
    }
}

fn default_key() -> String {
    DEFAULT_SLOT_KEY.to_string()
}

impl Backend {
    pub fn get_storage_engine(&self) -> Result<Box<dyn SlotStorage>> {
        match self.strain {
            BackendStrains::File => {
                let dir = match &self.uri {
                    Some(uri) => PathBuf::from(strip_file_uri(uri)?),
                    None => xdg::BaseDirectories::with_prefix(APP_PREFIX)?.get_data_home(),
                };
                Ok(Box::new(FileStorage::new(dir)))
            }
            BackendStrains::SQLite => {
                let path = match &self.uri {
                    Some(uri) => PathBuf::from(strip_file_uri(uri)?),
                    None => xdg::BaseDirectories::with_prefix(APP_PREFIX)?
                        .place_data_file("todos.db")?,
                };
                let Some(path) = path.to_str() else {
                    bail!("Database path {:?} is not valid UTF-8", path);
                };
                Ok(Box::new(SQLiteStorage::new(path)?))
            }
        }
    }
}

fn strip_file_uri(uri: &str) -> Result<&str> {
    match uri.strip_prefix("file://") {
        Some(path) if !path.is_empty() => Ok(path),
        _ => bail!("Expected path to start with file:// but found {uri}"),
    }
}

impl Config {
    /// Reads the given file, or the XDG config file when present, or falls
    /// back to defaults.
    pub fn load(path: Option<String>) -> Result<Config> {
        let config_file = match path {
            Some(x) => Path::new(&x).to_path_buf(),
            None => match config_path()? {
                Some(x) => x,
                None => return Ok(Config::default()),
            },
        };
        let mut content = String::new();
        File::open(config_file)?.read_to_string(&mut content)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn get_storage_engine(&self) -> Result<Box<dyn SlotStorage>> {
        let backend = &self.backend;
        backend.get_storage_engine()
    }

    pub fn slot_key(&self) -> &str {
        &self.backend.key
    }

    pub fn open_store(&self) -> Result<TodoStore> {
        let storage = self.get_storage_engine()?;
        Ok(TodoStore::load(storage, self.slot_key())?)
    }
}

fn config_path() -> Result<Option<PathBuf>> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_PREFIX)?;
    Ok(xdg_dirs.find_config_file("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn deserialized_correctly() {
        let config: Config = toml::from_str(
            r#"
        [backend]
        strain = "SQLite"
        uri = "file:///tmp/todos.db"
        key = "calendar"
        "#,
        )
        .unwrap();
        assert_eq!(config.backend.strain, BackendStrains::SQLite);
        assert_eq!(config.backend.uri.as_deref(), Some("file:///tmp/todos.db"));
        assert_eq!(config.slot_key(), "calendar");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.backend.strain, BackendStrains::File);
        assert_eq!(config.backend.uri, None);
        assert_eq!(config.slot_key(), "todos");
    }

    #[test]
    fn unknown_strain_rejected() {
        let config = toml::from_str::<Config>(
            r#"
        [backend]
        strain = "Api"
        "#,
        );
        assert!(config.is_err());
    }

    #[test]
    fn uri_must_be_file_uri() {
        assert_eq!(strip_file_uri("file:///tmp/x").unwrap(), "/tmp/x");
        assert!(strip_file_uri("/tmp/x").is_err());
        assert!(strip_file_uri("file://").is_err());
    }

    #[test]
    fn load_from_explicit_path_opens_store() {
        let dir = tempfile::tempdir().unwrap();
        let slots_dir = dir.path().join("slots");
        let mut config_file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile_in(dir.path())
            .unwrap();
        write!(
            config_file,
            "[backend]\nstrain = \"File\"\nuri = \"file://{}\"\n",
            slots_dir.display()
        )
        .unwrap();

        let config =
            Config::load(Some(config_file.path().to_str().unwrap().to_string())).unwrap();
        let mut store = config.open_store().unwrap();
        store.add("water plants", None).unwrap();
        assert!(slots_dir.join("todos.json").exists());
    }

    #[test]
    fn missing_explicit_path_fails() {
        assert!(Config::load(Some("/does/not/exist.toml".to_string())).is_err());
    }
}
