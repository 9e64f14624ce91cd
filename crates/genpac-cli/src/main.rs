//! genpac
//!
//! Generate a proxy auto-config file from gfwlist and user rules.

mod cli;
mod config;
mod decode;
mod error;
mod fetch;
mod render;
mod rules;

use std::time::Instant;

use clap::Parser;
use genpac_compiler::{compile_rules, CompileMode};
use genpac_core::{BuiltinSuffixes, SuffixResolver, SuffixTable};

use crate::cli::Args;
use crate::config::Settings;
use crate::decode::decode_gfwlist;
use crate::error::GenpacError;
use crate::fetch::fetch_gfwlist;
use crate::render::{render_pac, write_output, PacMeta, RenderOptions};
use crate::rules::load_user_rules;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so a PAC printed to stdout stays clean.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

async fn run(args: Args) -> Result<(), GenpacError> {
    let settings = Settings::resolve(&args)?;
    let start = Instant::now();

    if settings.base64 {
        log::warn!("Some browsers do not support base64-encoded PAC files");
    }

    let fetched = fetch_gfwlist(&settings).await?;
    let decoded = decode_gfwlist(&fetched.content)?;
    let user_rules = load_user_rules(&settings.user_rules, &settings.user_rule_files);

    log::info!(
        "Compiling {} user rule lines and {} gfwlist lines ({:?} mode)",
        user_rules.len(),
        decoded.lines.len(),
        settings.mode,
    );

    let resolver: Box<dyn SuffixResolver> = match (&settings.psl_file, settings.mode) {
        (Some(path), CompileMode::Precise) => Box::new(SuffixTable::from_file(path)?),
        _ => Box::new(BuiltinSuffixes),
    };
    let compiled = compile_rules(settings.mode, &user_rules, &decoded.lines, resolver.as_ref());
    if compiled.is_empty() {
        log::warn!("No rules compiled; the PAC will send everything DIRECT");
    }

    let meta = PacMeta {
        version: env!("CARGO_PKG_VERSION").to_string(),
        generated: chrono::Local::now().to_rfc2822(),
        modified: decoded.modified.unwrap_or_else(|| "-".to_string()),
        gfwlist_from: fetched.source.to_string(),
        proxy: settings.proxy.clone(),
    };
    let options = RenderOptions {
        compress: settings.compress,
        base64: settings.base64,
    };
    let content = render_pac(&compiled, &meta, options)?;
    write_output(settings.output.as_deref(), &content)?;

    log::debug!("Done in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}
