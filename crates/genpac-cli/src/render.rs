//! PAC script rendering and output.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use genpac_compiler::{CompileMode, CompiledRules};
use thiserror::Error;

const PAC_TPL: &str = include_str!("../res/pac.tpl.js");
const PAC_TPL_MIN: &str = include_str!("../res/pac.min.tpl.js");
const PAC_TPL_PRECISE: &str = include_str!("../res/pac.precise.tpl.js");
const PAC_TPL_BASE64: &str = include_str!("../res/pac.base64.tpl.js");

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to serialize rules: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Header values substituted into the template.
#[derive(Debug, Clone)]
pub struct PacMeta {
    pub version: String,
    pub generated: String,
    pub modified: String,
    pub gfwlist_from: String,
    pub proxy: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub compress: bool,
    pub base64: bool,
}

pub fn render_pac(
    rules: &CompiledRules,
    meta: &PacMeta,
    options: RenderOptions,
) -> Result<String, RenderError> {
    let template = match (rules.mode(), options.compress) {
        (CompileMode::Precise, _) => PAC_TPL_PRECISE,
        (CompileMode::Standard, true) => PAC_TPL_MIN,
        (CompileMode::Standard, false) => PAC_TPL,
    };

    let rules_json = rules.to_json(options.compress)?;
    let proxy_json = serde_json::to_string(&meta.proxy)?;

    let script = fill(
        template,
        &[
            ("__VERSION__", meta.version.as_str()),
            ("__GENERATED__", comment_safe(&meta.generated).as_str()),
            ("__MODIFIED__", comment_safe(&meta.modified).as_str()),
            ("__GFWLIST_FROM__", comment_safe(&meta.gfwlist_from).as_str()),
            ("__PROXY__", proxy_json.as_str()),
            ("__RULES__", rules_json.as_str()),
        ],
    );

    if !options.base64 {
        return Ok(script);
    }

    let encoded = STANDARD.encode(script.as_bytes());
    Ok(fill(
        PAC_TPL_BASE64,
        &[("__BASE64__", encoded.as_str()), ("__VERSION__", meta.version.as_str())],
    ))
}

/// Replace placeholders in one pass, so substituted text is never rescanned.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let next = values
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|pos| (pos, *key, *value)))
            .min_by_key(|(pos, _, _)| *pos);

        match next {
            Some((pos, key, value)) => {
                out.push_str(&rest[..pos]);
                out.push_str(value);
                rest = &rest[pos + key.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Header values land inside a `/** */` block.
fn comment_safe(value: &str) -> String {
    value.replace("*/", "* /").replace(['\r', '\n'], " ")
}

/// Write to `path`, creating parent directories, or to stdout.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<(), RenderError> {
    let Some(path) = path else {
        let mut stdout = io::stdout().lock();
        return writeln!(stdout, "{}", content).map_err(|source| RenderError::Write {
            path: "<stdout>".to_string(),
            source,
        });
    };

    let write_err = |source| RenderError::Write {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, content).map_err(write_err)?;
    log::info!("Wrote PAC to '{}' ({} bytes)", path.display(), content.len());
    Ok(())
}
