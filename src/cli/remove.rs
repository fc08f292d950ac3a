//! Remove packages from the vendor folder.

use super::common::{GlobalOptions, ModifyArgs};
use crate::context::ModifyKind;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct RemoveCommand {
    #[command(flatten)]
    args: ModifyArgs,
}

impl RemoveCommand {
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        self.args.run(ModifyKind::Remove, opts)
    }
}
