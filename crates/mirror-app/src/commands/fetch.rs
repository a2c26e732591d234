//! gitmirror fetch command

use anyhow::bail;
use clap::Args;
use mirror_usecase::FetchOutcome;

use super::{describe, fetch_in_background, load};
use crate::context::AppContext;

#[derive(Debug, Args)]
pub struct FetchCommand {
    /// Mirror identifier
    pub identifier: String,
}

impl FetchCommand {
    pub async fn execute(&self, ctx: &AppContext) -> anyhow::Result<FetchOutcome> {
        let loaded = load(ctx, &self.identifier)?;
        let (_, outcome) = fetch_in_background(&ctx.lifecycle, loaded).await?;
        Ok(outcome)
    }

    pub async fn run(&self, ctx: &AppContext) -> anyhow::Result<()> {
        let outcome = self.execute(ctx).await?;
        if let FetchOutcome::Failed { message } = &outcome {
            bail!("Fetch of '{}' failed: {}", self.identifier, message);
        }
        println!("{}: {}", self.identifier, describe(&outcome));
        Ok(())
    }
}
