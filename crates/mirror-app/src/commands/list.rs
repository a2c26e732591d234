//! gitmirror list command

use clap::Args;

use crate::context::AppContext;

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Print storage paths as well
    #[arg(short, long)]
    pub long: bool,
}

impl ListCommand {
    pub fn run(&self, ctx: &AppContext) -> anyhow::Result<()> {
        let mirrors = ctx.lifecycle.list()?;
        if mirrors.is_empty() {
            println!("No mirrors under {}", ctx.settings.storage_root.display());
            return Ok(());
        }

        for mirror in &mirrors {
            if self.long {
                println!("{:<24} {}  {}", mirror.identifier(), mirror.url(), mirror.root_url());
            } else {
                println!("{:<24} {}", mirror.identifier(), mirror.url());
            }
        }
        Ok(())
    }
}
