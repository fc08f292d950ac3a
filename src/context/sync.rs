//! Checking vendored packages against the manifest and restoring them.

use super::copy::hash_tree;
use super::status::{Location, Presence};
use super::{Context, OpKind, Operation};
use crate::core::VendorError;
use crate::utils::fs::import_to_path;
use anyhow::Result;

impl Context {
    /// Canonical paths of records whose vendored copy does not match its
    /// checksum: no checksum, a missing directory, or different content.
    pub fn verify(&self) -> Result<Vec<String>> {
        let vendor_dir = self.vendor_dir();
        let mut out_of_date = Vec::new();
        for record in self.manifest.package.iter().filter(|r| !r.remove) {
            let dir = import_to_path(&vendor_dir, &record.path);
            let current = if record.checksum.is_empty() || !dir.is_dir() {
                None
            } else {
                Some(hash_tree(&dir, record.tree)?)
            };
            if current.as_deref() != Some(record.checksum.as_str()) {
                tracing::debug!("{} is out of date", record.path);
                out_of_date.push(record.path.clone());
            }
        }
        Ok(out_of_date)
    }

    /// Fetch every out-of-date record at its recorded revision.
    pub fn sync(&mut self) -> Result<Vec<String>> {
        let out_of_date = self.verify()?;
        if out_of_date.is_empty() {
            tracing::info!("Vendor folder is up to date");
            return Ok(out_of_date);
        }

        for path in &out_of_date {
            let Some(record) = self.manifest.find(path) else { continue };
            let mut op = Operation::new(OpKind::Fetch, &record.path, record.source_path());
            op.pkg = self.vendor_local(&record.path);
            op.dest = import_to_path(&self.vendor_dir(), &record.path);
            op.tree = record.tree;
            op.revision = record.revision.clone();
            self.operations.push(op);
        }
        self.alter()?;
        Ok(out_of_date)
    }

    /// Fails with [`VendorError::ChecksumMismatch`] when vendored packages are
    /// out of date or imports are missing.
    pub fn status(&mut self) -> Result<()> {
        self.ensure_loaded()?;
        let mut paths = self.verify()?;
        paths.extend(
            self.packages
                .values()
                .filter(|p| {
                    p.status.location == Location::NotFound
                        || (p.status.location == Location::Vendor && p.status.presence == Presence::Missing)
                })
                .map(|p| p.canonical.clone()),
        );
        paths.sort();
        paths.dedup();
        if paths.is_empty() {
            Ok(())
        } else {
            Err(VendorError::ChecksumMismatch { paths }.into())
        }
    }
}
