//! Copy vendored packages again from their GOPATH source.

use super::common::{GlobalOptions, ModifyArgs};
use crate::context::ModifyKind;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct UpdateCommand {
    #[command(flatten)]
    args: ModifyArgs,
}

impl UpdateCommand {
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        self.args.run(ModifyKind::Update, opts)
    }
}
