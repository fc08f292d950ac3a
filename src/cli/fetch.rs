//! Download packages at a version and vendor them.

use super::common::{GlobalOptions, ModifyArgs};
use crate::context::ModifyKind;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct FetchCommand {
    #[command(flatten)]
    args: ModifyArgs,
}

impl FetchCommand {
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        self.args.run(ModifyKind::Fetch, opts)
    }
}
