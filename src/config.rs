use log::LevelFilter;
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, PartialEq, Deserialize)]
pub struct Config {
    /// Number of frames the replacer tracks, i.e., the buffer pool size.
    pub pool_size: usize,
    /// The K of LRU-K.
    pub replacer_k: usize,
    pub log_level: String,
}

impl Config {
    pub fn new(file: &str) -> Result<Config> {
        let mut cfg = config::Config::builder()
            .set_default("pool_size", 64)?
            .set_default("replacer_k", 2)?
            .set_default("log_level", "info")?;
        if !file.is_empty() {
            cfg = cfg.add_source(config::File::with_name(file))
        }
        cfg = cfg.add_source(config::Environment::with_prefix("SBOXDB"));
        let cfg: Config = cfg.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.replacer_k == 0 {
            return Err(Error::Value("replacer_k should be larger than zero".to_string()));
        }
        self.log_level.parse::<LevelFilter>()?;
        Ok(())
    }

    /// Install the process wide logger at the configured level.
    pub fn init_logger(&self) -> Result<()> {
        let level = self.log_level.parse::<LevelFilter>()?;
        env_logger::Builder::new().filter_level(level).try_init()?;
        Ok(())
    }
}
