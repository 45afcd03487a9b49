use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    /// Exclusive upper bound of the comic id range, ids `1..max_id` are crawled
    #[serde(default = "default_max_id")]
    pub max_id: u64,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_mirror_hosts")]
    pub mirror_hosts: Vec<String>,
    #[serde(default = "default_verify_host")]
    pub verify_host: String,
    #[serde(default = "default_image_host")]
    pub image_host: String,
    #[serde(default = "default_image_referer")]
    pub image_referer: String,
    /// Per request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default = "default_startup_delay")]
    pub startup_delay: u64,
    /// Seconds between periodic syncs, 0 disables them
    #[serde(default)]
    pub sync_interval: u64,
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: darkshelf_home().join("config.yml"),
            port: default_port(),
            public_dir: default_public_dir(),
            snapshot_path: default_snapshot_path(),
            max_id: default_max_id(),
            workers: default_workers(),
            max_attempts: default_max_attempts(),
            mirror_hosts: default_mirror_hosts(),
            verify_host: default_verify_host(),
            image_host: default_image_host(),
            image_referer: default_image_referer(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            startup_delay: default_startup_delay(),
            sync_interval: 0,
            show_progress: default_show_progress(),
        }
    }
}

fn darkshelf_home() -> PathBuf {
    match std::env::var("DARKSHELF_HOME") {
        Ok(path) => PathBuf::from(path),
        Err(_) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".darkshelf"),
    }
}

fn default_port() -> u16 {
    7777
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_snapshot_path() -> String {
    "public/data.json".to_string()
}

fn default_max_id() -> u64 {
    60000
}

fn default_workers() -> usize {
    50
}

fn default_max_attempts() -> usize {
    5
}

fn default_mirror_hosts() -> Vec<String> {
    vec!["v2.api.dmzj.com".to_string(), "v3api.dmzj.com".to_string()]
}

fn default_verify_host() -> String {
    "api.m.dmzj.com".to_string()
}

fn default_image_host() -> String {
    "http://images.dmzj.com".to_string()
}

fn default_image_referer() -> String {
    "https://m.dmzj.com/".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_startup_delay() -> u64 {
    1
}

fn default_show_progress() -> bool {
    true
}

impl Config {
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Config, anyhow::Error> {
        let config_path = match path {
            Some(p) => PathBuf::new().join(p),
            None => darkshelf_home().join("config.yml"),
        };

        match std::fs::File::open(&config_path) {
            Ok(file) => {
                info!("open config from {}", config_path.display());
                let mut cfg: Self = serde_yml::from_reader(file)?;
                cfg.path = config_path;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Config {
                    path: config_path,
                    ..Default::default()
                };
                cfg.save()?;
                info!("write default config at {}", cfg.path.display());
                Ok(cfg)
            }
        }
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_yml::to_string(&self)?)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
