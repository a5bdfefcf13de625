use lowvol_rating::{
    GlickoConfig,
    glicko::{DEFAULT_DEVIATION, DEFAULT_RATING},
};
use tracing::debug;

use crate::ranker::RankerConfig;

pub const AVOID_TWICE_KEY: &str = "LOWVOL_AVOID_TWICE";
pub const RD_FLOOR_KEY: &str = "LOWVOL_RD_FLOOR";
pub const DEFAULT_RATING_KEY: &str = "LOWVOL_DEFAULT_RATING";
pub const DEFAULT_RD_KEY: &str = "LOWVOL_DEFAULT_RD";

/// Deviation floor used when `LOWVOL_RD_FLOOR` is not set.
pub const DEFAULT_RD_FLOOR: f64 = 30.0;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to load .env: {0}")]
    DotenvError(#[from] dotenv::Error),
    #[error("invalid value `{value}` for `{key}`")]
    Invalid { key: &'static str, value: String },
}

/// Ranker settings read from the environment (and `.env`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankerEnv {
    /// LOWVOL_AVOID_TWICE
    pub avoid_twice: bool,
    /// LOWVOL_RD_FLOOR
    pub rd_floor: f64,
    /// LOWVOL_DEFAULT_RATING
    pub default_rating: f64,
    /// LOWVOL_DEFAULT_RD
    pub default_rd: f64,
}

impl Default for RankerEnv {
    fn default() -> Self {
        Self {
            avoid_twice: true,
            rd_floor: DEFAULT_RD_FLOOR,
            default_rating: DEFAULT_RATING,
            default_rd: DEFAULT_DEVIATION,
        }
    }
}

impl RankerEnv {
    /// Loads `.env` when present, then reads the process environment.
    pub fn try_from_env() -> Result<Self, Error> {
        match dotenv::dotenv() {
            Ok(path) => debug!("loaded {}", path.display()),
            Err(err) if err.not_found() => debug!("no .env file"),
            Err(err) => return Err(err.into()),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads every setting through `lookup`; missing keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let defaults = Self::default();
        Ok(Self {
            avoid_twice: parse_with(&lookup, AVOID_TWICE_KEY, parse_bool)?
                .unwrap_or(defaults.avoid_twice),
            rd_floor: parse_with(&lookup, RD_FLOOR_KEY, parse_non_negative)?
                .unwrap_or(defaults.rd_floor),
            default_rating: parse_with(&lookup, DEFAULT_RATING_KEY, parse_finite)?
                .unwrap_or(defaults.default_rating),
            default_rd: parse_with(&lookup, DEFAULT_RD_KEY, parse_positive)?
                .unwrap_or(defaults.default_rd),
        })
    }

    pub const fn ranker_config(&self) -> RankerConfig {
        RankerConfig {
            avoid_twice: self.avoid_twice,
            glicko: GlickoConfig::new().rd_floor(self.rd_floor),
        }
    }
}

fn parse_with<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, Error> {
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    parse(value.trim())
        .map(Some)
        .ok_or(Error::Invalid { key, value })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_non_negative(value: &str) -> Option<f64> {
    parse_finite(value).filter(|v| *v >= 0.0)
}

// An entity with zero deviation is never picked first.
fn parse_positive(value: &str) -> Option<f64> {
    parse_finite(value).filter(|v| *v > 0.0)
}
