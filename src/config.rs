use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Context};
use tracing::info;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub pool_size: u32,
    pub login_ttl_secs: i64,
    pub max_upload_bytes: usize,
    pub static_dir: Option<PathBuf>,
    pub cloudinary: CloudinaryConfig,
}

/// The part of the configuration handlers need at request time.
#[derive(Clone, Debug)]
pub struct AppSettings {
    pub login_ttl_secs: i64,
    pub max_upload_bytes: usize,
}

#[derive(Clone, Debug)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub url_base: String,
}

impl Config {
    /// Reads the process environment. Call `dotenv` first to pick up a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: try_load("DATABASE_URL", "salon.db")?,
            bind_addr: try_load("BIND_ADDR", "127.0.0.1:8080")?,
            pool_size: try_load("DB_POOL_SIZE", "8")?,
            login_ttl_secs: try_load("LOGIN_TTL_SECS", "3600")?,
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "10485760")?,
            static_dir: env::var("STATIC_DIR").ok().map(PathBuf::from),
            cloudinary: CloudinaryConfig {
                cloud_name: require("CLOUDINARY_NAME")?,
                api_key: require("CLOUDINARY_API_KEY")?,
                api_secret: require("CLOUDINARY_API_SECRET")?,
                url_base: try_load("CLOUDINARY_URL_BASE", "https://api.cloudinary.com/v1_1")?,
            },
        })
    }

    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            login_ttl_secs: self.login_ttl_secs,
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

fn require(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} not set"))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    parse_value(key, &value)
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value {value:?}: {e}"))
}
