use genpac_core::SuffixTableError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::decode::DecodeError;
use crate::fetch::FetchError;
use crate::render::RenderError;

#[derive(Debug, Error)]
pub enum GenpacError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Failed to load public suffix list: {0}")]
    SuffixTable(#[from] SuffixTableError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
