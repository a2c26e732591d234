//! gitmirror create command

use anyhow::Context;
use clap::Args;
use mirror_domain::NewMirror;
use mirror_usecase::{FetchOutcome, LoadedMirror};

use super::{describe, fetch_in_background};
use crate::context::AppContext;

#[derive(Debug, Args)]
pub struct CreateCommand {
    /// Remote URL (https://, ssh://, git://, or scp-like user@host:path)
    pub url: String,

    /// Identifier to register the mirror under (derived from the URL when omitted)
    #[arg(short, long)]
    pub identifier: Option<String>,

    /// Register and initialise only, do not fetch
    #[arg(long)]
    pub no_fetch: bool,
}

/// Result of a successful create
#[derive(Debug)]
pub struct CreateReport {
    pub loaded: LoadedMirror,
    pub fetch: Option<FetchOutcome>,
}

impl CreateCommand {
    pub async fn execute(&self, ctx: &AppContext) -> anyhow::Result<CreateReport> {
        let mut request = NewMirror::new(&self.url);
        if let Some(identifier) = &self.identifier {
            request = request.with_identifier(identifier);
        }

        let lifecycle = ctx.lifecycle.clone();
        let loaded = tokio::task::spawn_blocking(move || lifecycle.create(request))
            .await
            .context("create task panicked")??;

        if self.no_fetch {
            return Ok(CreateReport {
                loaded,
                fetch: None,
            });
        }

        let (loaded, outcome) = fetch_in_background(&ctx.lifecycle, loaded).await?;
        Ok(CreateReport {
            loaded,
            fetch: Some(outcome),
        })
    }

    pub async fn run(&self, ctx: &AppContext) -> anyhow::Result<()> {
        let report = self.execute(ctx).await?;
        let mirror = report.loaded.mirror();

        println!("Created {} '{}'", mirror.scm_name(), mirror.identifier());
        println!("  url:   {}", mirror.url());
        println!("  path:  {}", mirror.root_url());
        match &report.fetch {
            Some(outcome) => println!("  fetch: {}", describe(outcome)),
            None => println!("  fetch: skipped"),
        }
        Ok(())
    }
}
