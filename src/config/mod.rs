use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use directories::BaseDirs;

pub const DEFAULT_MODULE_URL: &str =
    "https://github.com/Lab2Phys/module-kvlkcl/raw/refs/heads/main/module_kvlkcl.so";

pub const DEFAULT_DECIMAL_PRECISION: u32 = 3;
pub const MAX_DECIMAL_PRECISION: u32 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let config_path = default_config_path();
        let mut cfg = Self::load_from(&config_path);

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                cfg.inner.insert(k, v);
            }
        }

        cfg
    }

    /// Defaults overlaid with the rc file at `path`, without the environment.
    pub fn load_from(path: &Path) -> Self {
        let mut map = default_map();

        if path.exists() {
            if let Ok(file) = fs::File::open(path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        Self { inner: map, config_path: path.to_path_buf() }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        // ENV first
        if let Ok(v) = env::var(key) {
            return Some(v);
        }
        self.inner.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key).and_then(|v| v.trim().parse::<u32>().ok())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from)
    }

    pub fn module_url(&self) -> String {
        self.get("MODULE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODULE_URL.to_string())
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.get_u64("REQUEST_TIMEOUT").unwrap_or(60)
    }

    /// Configured precision, or the default when unparsable or above `MAX_DECIMAL_PRECISION`.
    pub fn decimal_precision(&self) -> u32 {
        self.get_u32("DECIMAL_PRECISION")
            .filter(|p| *p <= MAX_DECIMAL_PRECISION)
            .unwrap_or(DEFAULT_DECIMAL_PRECISION)
    }
}

fn is_config_key(k: &str) -> bool {
    // Accept known keys or KVLKCL_* for forward-compat
    const KEYS: &[&str] = &[
        "MODULE_URL",
        "MODULE_PATH",
        "REQUEST_TIMEOUT",
        "DECIMAL_PRECISION",
        "SHOW_WIDGETS",
        "DEFAULT_COLOR",
        "USE_PROXY",
    ];

    KEYS.contains(&k) || k.starts_with("KVLKCL_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("kvlkcl").join(".kvlkclrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    m.insert("MODULE_URL".into(), DEFAULT_MODULE_URL.into());

    // Numbers
    m.insert("REQUEST_TIMEOUT".into(), "60".into());
    m.insert("DECIMAL_PRECISION".into(), "3".into());

    // Bools as strings
    m.insert("SHOW_WIDGETS".into(), "false".into());
    m.insert("DEFAULT_COLOR".into(), "true".into());
    m.insert("USE_PROXY".into(), "true".into());

    m
}
