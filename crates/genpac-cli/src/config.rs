//! Settings resolved from the command line and an optional JSON config file.

use std::fs;
use std::path::{Path, PathBuf};

use genpac_compiler::CompileMode;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::cli::Args;

pub const DEFAULT_GFWLIST_URL: &str =
    "https://raw.githubusercontent.com/gfwlist/gfwlist/master/gfwlist.txt";
pub const DEFAULT_PROXY: &str = "DIRECT";

static FETCH_PROXY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(PROXY|SOCKS|SOCKS4|SOCKS5)\s+(?:([^:@\s]+):([^@\s]+)@)?([^:\s]+):(\d+)$")
        .expect("valid regex")
});

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid gfwlist proxy '{0}', expected \"PROXY|SOCKS5 [user:pwd@]host:port\"")]
    InvalidFetchProxy(String),

    #[error("SOCKS4 is not supported for fetching gfwlist: '{0}'")]
    UnsupportedFetchProxy(String),
}

/// `user-rule-from` accepts a single path or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// On-disk config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FileConfig {
    pub proxy: Option<String>,
    pub gfwlist_url: Option<String>,
    pub gfwlist_proxy: Option<String>,
    pub gfwlist_local: Option<String>,
    pub update_gfwlist_local: Option<bool>,
    pub user_rule_from: Option<OneOrMany>,
    pub output: Option<String>,
    pub compress: Option<bool>,
    pub base64: Option<bool>,
    pub precise: Option<bool>,
    pub psl_file: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from '{}'", path.display());
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Proxy string written into the PAC file.
    pub proxy: String,
    pub gfwlist_url: String,
    /// Proxy URL for the gfwlist download, already validated.
    pub gfwlist_proxy: Option<String>,
    pub gfwlist_local: Option<PathBuf>,
    pub update_gfwlist_local: bool,
    pub user_rules: Vec<String>,
    pub user_rule_files: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub compress: bool,
    pub base64: bool,
    pub mode: CompileMode,
    pub psl_file: Option<PathBuf>,
}

impl Settings {
    /// Merge the command line over the config file named by `--config-from`.
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let file = match &args.config_from {
            Some(path) => FileConfig::load(&expand_home(path))?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    pub fn merge(args: &Args, file: FileConfig) -> Result<Self, ConfigError> {
        let gfwlist_proxy = match args.gfwlist_proxy.clone().or(file.gfwlist_proxy) {
            Some(raw) if !raw.trim().is_empty() => Some(fetch_proxy_url(&raw)?),
            _ => None,
        };

        let user_rule_files = if args.user_rule_from.is_empty() {
            file.user_rule_from
                .map(OneOrMany::into_vec)
                .unwrap_or_default()
                .into_iter()
                .map(PathBuf::from)
                .collect()
        } else {
            args.user_rule_from.clone()
        };

        let precise = args.precise.or(file.precise).unwrap_or(false);

        Ok(Self {
            proxy: args
                .proxy
                .clone()
                .or(file.proxy)
                .unwrap_or_else(|| DEFAULT_PROXY.to_string()),
            gfwlist_url: args
                .gfwlist_url
                .clone()
                .or(file.gfwlist_url)
                .unwrap_or_else(|| DEFAULT_GFWLIST_URL.to_string()),
            gfwlist_proxy,
            gfwlist_local: args
                .gfwlist_local
                .clone()
                .or_else(|| file.gfwlist_local.map(PathBuf::from))
                .map(|p| expand_home(&p)),
            update_gfwlist_local: args
                .update_gfwlist_local
                .or(file.update_gfwlist_local)
                .unwrap_or(true),
            user_rules: args.user_rules.clone(),
            user_rule_files: user_rule_files.iter().map(|p| expand_home(p)).collect(),
            output: args
                .output
                .clone()
                .or_else(|| file.output.map(PathBuf::from))
                .map(|p| expand_home(&p)),
            compress: args.compress.or(file.compress).unwrap_or(false),
            base64: args.base64.or(file.base64).unwrap_or(false),
            mode: if precise { CompileMode::Precise } else { CompileMode::Standard },
            psl_file: args
                .psl_file
                .clone()
                .or_else(|| file.psl_file.map(PathBuf::from))
                .map(|p| expand_home(&p)),
        })
    }
}

/// Map `PROXY|SOCKS5 [user:pwd@]host:port` to a proxy URL for the HTTP client.
pub fn fetch_proxy_url(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    let caps = FETCH_PROXY
        .captures(raw)
        .ok_or_else(|| ConfigError::InvalidFetchProxy(raw.to_string()))?;

    let scheme = match caps[1].to_ascii_uppercase().as_str() {
        "PROXY" => "http",
        "SOCKS5" => "socks5",
        _ => return Err(ConfigError::UnsupportedFetchProxy(raw.to_string())),
    };

    let auth = match (caps.get(2), caps.get(3)) {
        (Some(user), Some(pwd)) => format!("{}:{}@", user.as_str(), pwd.as_str()),
        _ => String::new(),
    };

    Ok(format!("{}://{}{}:{}", scheme, auth, &caps[4], &caps[5]))
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}
