use serde::{Deserialize, Serialize};
use std::fs;
use truco_engine::options::{FaltaEnvido, MatchOptions};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    pub match_point: u8,
    pub flor: bool,
    pub falta_envido: FaltaEnvido,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub seed: ValueSource,
    pub match_point: ValueSource,
    pub flor: ValueSource,
    pub falta_envido: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            seed: ValueSource::Default,
            match_point: ValueSource::Default,
            flor: ValueSource::Default,
            falta_envido: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        let opts = MatchOptions::default();
        Self {
            seed: None,
            match_point: opts.match_point,
            flor: opts.flor,
            falta_envido: opts.falta_envido,
        }
    }
}

impl Config {
    /// Match options for this configuration, engine defaults elsewhere.
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            match_point: self.match_point,
            flor: self.flor,
            falta_envido: self.falta_envido,
            ..MatchOptions::default()
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

/// Resolves defaults, then the TOML file named by `TRUCO_CONFIG`, then
/// `TRUCO_*` environment variables. Later layers win.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var("TRUCO_CONFIG")
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.match_point {
            cfg.match_point = v;
            sources.match_point = ValueSource::File;
        }
        if let Some(v) = f.flor {
            cfg.flor = v;
            sources.flor = ValueSource::File;
        }
        if let Some(v) = f.falta_envido {
            cfg.falta_envido = v;
            sources.falta_envido = ValueSource::File;
        }
    }

    if let Ok(seed) = std::env::var("TRUCO_SEED")
        && !seed.is_empty()
    {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid("Invalid seed".into()))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Ok(mp) = std::env::var("TRUCO_MATCH_POINT")
        && !mp.is_empty()
    {
        cfg.match_point = mp
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid match point".into()))?;
        sources.match_point = ValueSource::Env;
    }
    if let Ok(flor) = std::env::var("TRUCO_FLOR")
        && !flor.is_empty()
    {
        cfg.flor = parse_bool(&flor).ok_or_else(|| ConfigError::Invalid("Invalid flor".into()))?;
        sources.flor = ValueSource::Env;
    }
    if let Ok(falta) = std::env::var("TRUCO_FALTA")
        && !falta.is_empty()
    {
        cfg.falta_envido = parse_falta(&falta)
            .ok_or_else(|| ConfigError::Invalid("Invalid falta envido (single or double)".into()))?;
        sources.falta_envido = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    match_point: Option<u8>,
    #[serde(default)]
    flor: Option<bool>,
    #[serde(default)]
    falta_envido: Option<FaltaEnvido>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    cfg.match_options()
        .validate()
        .map_err(|e| ConfigError::Invalid(format!("Invalid configuration: {}", e)))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn parse_falta(s: &str) -> Option<FaltaEnvido> {
    match s.to_ascii_lowercase().as_str() {
        "single" => Some(FaltaEnvido::Single),
        "double" => Some(FaltaEnvido::Double),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_booleans_and_falta() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_falta("Single"), Some(FaltaEnvido::Single));
        assert_eq!(parse_falta("triple"), None);
    }

    #[test]
    fn defaults_follow_engine_options() {
        let cfg = Config::default();
        assert_eq!(cfg.match_options(), MatchOptions::default());
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn rejects_out_of_range_match_point() {
        let cfg = Config {
            match_point: 0,
            ..Config::default()
        };
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }
}
