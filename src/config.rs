use crate::image::DEFAULT_MAX_IMAGE_BYTES;
use anyhow::{anyhow, Context};

pub const ENV_MAX_IMAGE_BYTES: &str = "MATHTEMPLATED_MAX_IMAGE_BYTES";
pub const ENV_LOG: &str = "MATHTEMPLATED_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_image_bytes: usize,
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();

        if let Some(raw) = lookup(ENV_MAX_IMAGE_BYTES) {
            let n: usize = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_IMAGE_BYTES}={raw:?} is not a byte count"))?;
            if n == 0 {
                return Err(anyhow!("{ENV_MAX_IMAGE_BYTES} must be greater than zero"));
            }
            cfg.max_image_bytes = n;
        }

        cfg.log_filter = lookup(ENV_LOG).filter(|v| !v.trim().is_empty());
        Ok(cfg)
    }
}
