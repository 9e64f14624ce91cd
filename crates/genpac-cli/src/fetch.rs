//! Download gfwlist, falling back to a local copy.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::config::Settings;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to set up HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("gfwlist unavailable: online fetch from '{url}' failed and no local copy could be read")]
    Unavailable { url: String },
}

/// Where the gfwlist content came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    Online(String),
    Local(PathBuf),
}

impl fmt::Display for ListSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online(url) => write!(f, "online[{}]", url),
            Self::Local(path) => write!(f, "local[{}]", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchedList {
    /// Raw, still base64-encoded content.
    pub content: String,
    pub source: ListSource,
}

pub async fn fetch_gfwlist(settings: &Settings) -> Result<FetchedList, FetchError> {
    let url = settings.gfwlist_url.trim();

    if !url.is_empty() {
        let client = build_client(settings.gfwlist_proxy.as_deref())?;
        match download(&client, url).await {
            Ok(content) => {
                log::info!("Fetched gfwlist from {} ({} bytes)", url, content.len());
                if settings.update_gfwlist_local {
                    if let Some(local) = &settings.gfwlist_local {
                        refresh_local(local, &content).await;
                    }
                }
                return Ok(FetchedList {
                    content,
                    source: ListSource::Online(url.to_string()),
                });
            }
            Err(e) => log::warn!("Failed to fetch gfwlist from {}: {}", url, e),
        }
    }

    if let Some(local) = &settings.gfwlist_local {
        match tokio::fs::read_to_string(local).await {
            Ok(content) => {
                log::info!("Using local gfwlist '{}'", local.display());
                return Ok(FetchedList {
                    content,
                    source: ListSource::Local(local.clone()),
                });
            }
            Err(e) => log::warn!("Failed to read local gfwlist '{}': {}", local.display(), e),
        }
    }

    Err(FetchError::Unavailable { url: url.to_string() })
}

fn build_client(proxy_url: Option<&str>) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().timeout(FETCH_TIMEOUT);
    if let Some(proxy_url) = proxy_url {
        log::debug!("Fetching gfwlist through {}", proxy_url);
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }
    builder.build()
}

async fn download(client: &reqwest::Client, url: &str) -> Result<String, reqwest::Error> {
    client.get(url).send().await?.error_for_status()?.text().await
}

/// A failed refresh is not fatal; the fetched content is still used.
async fn refresh_local(path: &Path, content: &str) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            log::warn!("Failed to create '{}': {}", parent.display(), e);
            return;
        }
    }
    match tokio::fs::write(path, content).await {
        Ok(()) => log::debug!("Updated local gfwlist '{}'", path.display()),
        Err(e) => log::warn!("Failed to update local gfwlist '{}': {}", path.display(), e),
    }
}
