//! Copy packages from GOPATH into the vendor folder.
//!
//! ```bash
//! # every external package the project imports
//! gvend add +external
//!
//! # one package, with its subtree, from a fork
//! gvend add github.com/pkg/errors/^::github.com/me/errors
//! ```

use super::common::{GlobalOptions, ModifyArgs};
use crate::context::ModifyKind;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct AddCommand {
    #[command(flatten)]
    args: ModifyArgs,
}

impl AddCommand {
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        self.args.run(ModifyKind::Add, opts)
    }
}
