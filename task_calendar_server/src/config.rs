use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let config_file = match path {
            Some(x) => Path::new(x).to_path_buf(),
            None => match default_config_path()? {
                Some(x) => x,
                None => return Ok(Config::default()),
            },
        };
        let mut content = String::new();
        File::open(config_file)?.read_to_string(&mut content)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

fn default_config_path() -> anyhow::Result<Option<PathBuf>> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("task_calendar")?;
    Ok(xdg_dirs.find_config_file("task_calendar_server.toml"))
}
