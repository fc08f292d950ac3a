//! Migration from packages copied under `internal/`.

use super::{move_tree, record_vendored};
use crate::context::Context;
use crate::core::VendorError;
use anyhow::{Context as _, Result};
use std::fs;

pub(super) fn migrate(ctx: &mut Context) -> Result<()> {
    let internal = ctx.root_dir.join("internal");
    if !internal.is_dir() {
        return Err(VendorError::NotFoundInSearchPath {
            path: format!("{}/internal", ctx.root_import),
        }
        .into());
    }

    let vendor_dir = ctx.vendor_dir();
    for entry in fs::read_dir(&internal).with_context(|| format!("Failed to read {}", internal.display()))? {
        let entry = entry?;
        move_tree(&entry.path(), &vendor_dir.join(entry.file_name()))?;
    }
    fs::remove_dir(&internal).with_context(|| format!("Failed to remove {}", internal.display()))?;

    record_vendored(ctx)?;
    ctx.rewrite_rules.insert(format!("{}/internal", ctx.root_import), String::new());
    Ok(())
}
