//! gitmirror changesets command

use anyhow::Context;
use clap::Args;
use mirror_usecase::ChangesetListing;

use super::{describe, load};
use crate::context::AppContext;

#[derive(Debug, Args)]
pub struct ChangesetsCommand {
    /// Mirror identifier
    pub identifier: String,

    /// Show at most this many changesets
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

impl ChangesetsCommand {
    pub async fn execute(&self, ctx: &AppContext) -> anyhow::Result<ChangesetListing> {
        let mut loaded = load(ctx, &self.identifier)?;
        let lifecycle = ctx.lifecycle.clone();
        let identifier = self.identifier.clone();

        tokio::task::spawn_blocking(move || lifecycle.changesets(&mut loaded))
            .await
            .context("changeset task panicked")?
            .with_context(|| format!("Failed to read changesets of '{}'", identifier))
    }

    pub async fn run(&self, ctx: &AppContext) -> anyhow::Result<()> {
        let listing = self.execute(ctx).await?;

        if listing.fetch.is_failed() {
            eprintln!("warning: {}", describe(&listing.fetch));
        }
        if listing.changesets.is_empty() {
            println!("No changesets");
            return Ok(());
        }

        let limit = self.limit.unwrap_or(usize::MAX);
        for changeset in listing.changesets.iter().take(limit) {
            let short = changeset.revision.get(..12).unwrap_or(&changeset.revision);
            println!(
                "{}  {}  {:<20}  {}",
                short, changeset.committed_on, changeset.author, changeset.summary
            );
        }
        Ok(())
    }
}
