//! CLI Commands

pub mod changesets;
pub mod create;
pub mod delete;
pub mod fetch;
pub mod list;

pub use changesets::ChangesetsCommand;
pub use create::CreateCommand;
pub use delete::DeleteCommand;
pub use fetch::FetchCommand;
pub use list::ListCommand;

use anyhow::{anyhow, Context};
use mirror_usecase::{FetchOutcome, LoadedMirror, MirrorLifecycle};

use crate::context::AppContext;

/// Load a registered mirror or fail with a readable message
pub(crate) fn load(ctx: &AppContext, identifier: &str) -> anyhow::Result<LoadedMirror> {
    ctx.lifecycle
        .load(identifier)
        .with_context(|| format!("Failed to read mirror '{}'", identifier))?
        .ok_or_else(|| anyhow!("No mirror named '{}'", identifier))
}

/// Run the one fetch for `loaded` on the blocking pool
pub(crate) async fn fetch_in_background(
    lifecycle: &MirrorLifecycle,
    mut loaded: LoadedMirror,
) -> anyhow::Result<(LoadedMirror, FetchOutcome)> {
    let lifecycle = lifecycle.clone();
    tokio::task::spawn_blocking(move || {
        let outcome = lifecycle.fetch(&mut loaded);
        (loaded, outcome)
    })
    .await
    .context("fetch task panicked")
}

pub(crate) fn describe(outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Fetched => "fetched".to_string(),
        FetchOutcome::Failed { message } => format!("failed: {}", message),
        FetchOutcome::AlreadyFetched => "already fetched".to_string(),
    }
}
