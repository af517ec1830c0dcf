//! Profile command handlers.
//!
//! Aggregation never fails, so the only errors surfaced here are bad
//! arguments, an unreadable requests file, or a failed output write.

use std::io::Write;
use std::path::Path;

use clap::Args;
use tablescout_core::{AppConfig, ListingQuery, ProfileRequest};
use tablescout_profiler::{AggregateResult, Aggregator};

#[derive(Debug, Args)]
pub(crate) struct ProfileArgs {
    /// Business name to look up on the map listing
    #[arg(long)]
    pub(crate) name: Option<String>,

    /// City or neighbourhood narrowing the listing search
    #[arg(long, requires = "name")]
    pub(crate) locality: Option<String>,

    /// Instagram handle or profile URL
    #[arg(long)]
    pub(crate) instagram: Option<String>,

    /// TikTok handle or profile URL
    #[arg(long)]
    pub(crate) tiktok: Option<String>,

    /// YouTube handle, channel id, or channel URL
    #[arg(long)]
    pub(crate) youtube: Option<String>,

    /// Business website URL
    #[arg(long)]
    pub(crate) website: Option<String>,

    /// Write the JSON result to this file instead of stdout
    #[arg(long)]
    pub(crate) out: Option<std::path::PathBuf>,
}

impl ProfileArgs {
    /// Converts the flags into a request, rejecting one that names no source.
    pub(crate) fn to_request(&self) -> anyhow::Result<ProfileRequest> {
        let request = ProfileRequest {
            listing: self.name.as_ref().map(|name| ListingQuery {
                name: name.clone(),
                locality: self.locality.clone().unwrap_or_default(),
            }),
            instagram: self.instagram.clone(),
            tiktok: self.tiktok.clone(),
            youtube: self.youtube.clone(),
            website: self.website.clone(),
        };
        if request.is_empty() {
            anyhow::bail!(
                "no sources given: pass at least one of --name, --instagram, --tiktok, --youtube, --website"
            );
        }
        Ok(request)
    }
}

/// Profile a single business and print (or write) the aggregate as JSON.
///
/// # Errors
///
/// Returns an error if no source was given, the aggregator cannot be built
/// from config, or the output cannot be written.
pub(crate) async fn run_profile(config: &AppConfig, args: &ProfileArgs) -> anyhow::Result<()> {
    let request = args.to_request()?;
    let aggregator = Aggregator::from_config(config)?;

    let result = aggregator.aggregate(&request).await;
    warn_if_empty(&request, &result);

    match args.out.as_deref() {
        Some(path) => {
            write_json(path, &result)?;
            tracing::info!(path = %path.display(), "profile written");
        }
        None => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

/// Profile every request in `file` sequentially.
///
/// With `out_dir`, each result lands in `<out_dir>/<slug>.json`; otherwise
/// all results are written to `stdout` as one JSON array once the batch
/// finishes. Progress goes to the log, so `stdout` carries nothing but JSON.
///
/// # Errors
///
/// Returns an error if the requests file fails to load or validate, the
/// aggregator cannot be built, or an output cannot be written.
pub(crate) async fn run_batch(
    config: &AppConfig,
    file: &Path,
    out_dir: Option<&Path>,
    stdout: &mut impl Write,
) -> anyhow::Result<()> {
    let requests = tablescout_core::load_requests(file)?.requests;
    let aggregator = Aggregator::from_config(config)?;

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)?;
    }

    let total = requests.len();
    let mut results = Vec::with_capacity(total);
    for (idx, request) in requests.iter().enumerate() {
        let label = request.label();
        tracing::info!(label = %label, "profiling {}/{}", idx + 1, total);

        let result = aggregator.aggregate(request).await;
        warn_if_empty(request, &result);

        match out_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.json", tablescout_core::to_slug(&label)));
                write_json(&path, &result)?;
                tracing::info!(path = %path.display(), "profile written");
            }
            None => results.push(result),
        }
    }

    if out_dir.is_none() {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&results)?)?;
    }
    tracing::info!(total, "batch complete");
    Ok(())
}

fn warn_if_empty(request: &ProfileRequest, result: &AggregateResult) {
    if result.is_empty() {
        tracing::warn!(label = %request.label(), "nothing found, please verify inputs");
    }
}

pub(crate) fn write_json(path: &Path, result: &AggregateResult) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(result)?;
    std::fs::write(path, body)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))
}
