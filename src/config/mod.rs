use std::{
    collections::HashMap,
    env, fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use directories::BaseDirs;

use crate::transport::{CommandHost, OsascriptHost, ScriptHost};

/// Layered string settings: built-in defaults, then `.indesignrc`, then the environment.
#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_path(), env::vars())
    }

    /// Load with an explicit rc path and environment, for tests and tooling.
    pub fn load_from(
        config_path: &Path,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        let mut map = default_map();

        if config_path.exists() {
            let file = fs::File::open(config_path)
                .with_context(|| format!("opening config file: {}", config_path.display()))?;
            for line in BufReader::new(file).lines() {
                let line =
                    line.with_context(|| format!("reading config file: {}", config_path.display()))?;
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((k, v)) = line.split_once('=') {
                    map.insert(k.trim().to_string(), v.trim().to_string());
                }
            }
        }

        // Environment wins over the rc file
        for (k, v) in vars {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Ok(Self {
            inner: map,
            config_path: config_path.to_path_buf(),
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get_u64(&self, key: &str) -> Result<Option<u64>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map(Some)
                .with_context(|| format!("{} must be a whole number of seconds, got {:?}", key, v)),
        }
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    pub fn app_name(&self) -> String {
        self.get("INDESIGN_APP").unwrap_or_default()
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.get_path("SCRATCH_DIR")
            .unwrap_or_else(|| env::temp_dir().join("indesign_mcp"))
    }

    pub fn log_level(&self) -> String {
        self.get("LOG_LEVEL").unwrap_or_else(|| "info".into())
    }

    pub fn script_timeout(&self) -> Result<Duration> {
        self.timeout("SCRIPT_TIMEOUT", 30)
    }

    pub fn long_script_timeout(&self) -> Result<Duration> {
        self.timeout("LONG_SCRIPT_TIMEOUT", 120)
    }

    fn timeout(&self, key: &str, fallback: u64) -> Result<Duration> {
        let secs = self.get_u64(key)?.unwrap_or(fallback);
        if secs == 0 {
            bail!("{} must be greater than zero", key);
        }
        Ok(Duration::from_secs(secs))
    }

    /// `osascript` against the configured app, unless `HOST_PROGRAM` names a
    /// custom command (arguments from `HOST_ARGS`, whitespace separated).
    pub fn script_host(&self) -> Arc<dyn ScriptHost> {
        match self.get("HOST_PROGRAM").filter(|p| !p.trim().is_empty()) {
            Some(program) => {
                let args = self
                    .get("HOST_ARGS")
                    .map(|a| a.split_whitespace().map(str::to_string).collect())
                    .unwrap_or_default();
                Arc::new(CommandHost::new(program, args))
            }
            None => Arc::new(OsascriptHost::new(
                self.get("OSASCRIPT_PATH").unwrap_or_else(|| "osascript".into()),
                self.app_name(),
            )),
        }
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "INDESIGN_APP",
        "OSASCRIPT_PATH",
        "SCRIPT_TIMEOUT",
        "LONG_SCRIPT_TIMEOUT",
        "SCRATCH_DIR",
        "HOST_PROGRAM",
        "HOST_ARGS",
        "LOG_LEVEL",
    ];

    KEYS.contains(&k) || k.starts_with("INDESIGN_MCP_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("indesign_mcp").join(".indesignrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("INDESIGN_APP".into(), "Adobe InDesign 2025".into());
    m.insert("OSASCRIPT_PATH".into(), "osascript".into());
    m.insert(
        "SCRATCH_DIR".into(),
        env::temp_dir().join("indesign_mcp").to_string_lossy().into_owned(),
    );

    // Seconds
    m.insert("SCRIPT_TIMEOUT".into(), "30".into());
    m.insert("LONG_SCRIPT_TIMEOUT".into(), "120".into());

    m.insert("LOG_LEVEL".into(), "info".into());
    m
}
