//! gitmirror delete command

use anyhow::Context;
use clap::Args;
use mirror_domain::{CleanupOutcome, SkipReason};

use crate::context::AppContext;

#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Mirror identifier
    pub identifier: String,
}

impl DeleteCommand {
    pub async fn execute(&self, ctx: &AppContext) -> anyhow::Result<CleanupOutcome> {
        let lifecycle = ctx.lifecycle.clone();
        let identifier = self.identifier.clone();

        // Within this process, removal waits on the clone's lock while a
        // fetch is running. Other processes are not serialized.
        let outcome =
            tokio::task::spawn_blocking(move || lifecycle.destroy_by_identifier(&identifier))
                .await
                .context("delete task panicked")??;
        Ok(outcome)
    }

    pub async fn run(&self, ctx: &AppContext) -> anyhow::Result<()> {
        match self.execute(ctx).await? {
            CleanupOutcome::Removed { path } => {
                println!("Deleted '{}' and removed {}", self.identifier, path)
            }
            CleanupOutcome::Skipped(reason) => println!(
                "Deleted '{}', nothing removed ({})",
                self.identifier,
                match reason {
                    SkipReason::EmptyPath => "no storage path",
                    SkipReason::FilesystemRoot => "refusing to remove /",
                    SkipReason::ParentTraversal => "refusing a path containing ..",
                    SkipReason::NotADirectory => "clone directory missing",
                }
            ),
        }
        Ok(())
    }
}
