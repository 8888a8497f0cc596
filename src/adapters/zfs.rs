//! External storage collaborators.
//!
//! The pipeline never persists properties itself. It consumes an inventory
//! query, an apply operation and an optional validity check through these
//! traits; `ZfsCli` backs all three with the `zfs` command.
use std::path::PathBuf;
use std::process::{Command, Output};

use log::{debug, warn};

use crate::constants::DEFAULT_ZFS_BIN;
use crate::types::errors::{Error, ErrorKind, Result};
use crate::types::{EntityName, PropertyAssignment};

pub trait DatasetInventory {
    /// Full, ordered inventory of manageable datasets.
    /// # Errors
    /// Returns an error when the inventory cannot be queried.
    fn list(&self) -> Result<Vec<EntityName>>;
}

pub trait PropertyApplier {
    /// Persist `assignment` on `entity`.
    /// # Errors
    /// Returns an error when the storage layer rejects the change.
    fn apply(&self, assignment: &PropertyAssignment, entity: &EntityName) -> Result<()>;
}

pub trait PropertyValidator {
    /// Check that `assignment` names a property the storage layer knows, using `sample`
    /// as a representative target.
    /// # Errors
    /// Returns an error describing why the property is not valid.
    fn validate(&self, assignment: &PropertyAssignment, sample: &EntityName) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct ZfsCli {
    bin: PathBuf,
}

impl Default for ZfsCli {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_ZFS_BIN))
    }
}

impl ZfsCli {
    #[must_use]
    pub const fn new(bin: PathBuf) -> Self {
        Self { bin }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!("exec: {} {}", self.bin.display(), args.join(" "));
        Command::new(&self.bin).args(args).output().map_err(|e| {
            Error::new(
                ErrorKind::Command,
                format!("cannot run {}: {e}", self.bin.display()),
            )
        })
    }

    fn check(out: Output, what: &str) -> Result<Output> {
        if out.status.success() {
            return Ok(out);
        }
        let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
        let code = out
            .status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        Err(Error::new(
            ErrorKind::Command,
            if stderr.is_empty() {
                format!("{what} exited with {code}")
            } else {
                format!("{what} exited with {code}: {stderr}")
            },
        ))
    }
}

/// Parse `zfs list -H -o name` output, skipping lines that cannot be dataset names.
pub(crate) fn parse_inventory(stdout: &str) -> Vec<EntityName> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| match EntityName::parse(l) {
            Ok(n) => Some(n),
            Err(e) => {
                warn!("inventory: skipping line {l:?}: {e}");
                None
            }
        })
        .collect()
}

impl DatasetInventory for ZfsCli {
    fn list(&self) -> Result<Vec<EntityName>> {
        let out = Self::check(
            self.run(&["list", "-H", "-o", "name", "-t", "filesystem,volume"])?,
            "zfs list",
        )?;
        Ok(parse_inventory(&String::from_utf8_lossy(&out.stdout)))
    }
}

impl PropertyApplier for ZfsCli {
    fn apply(&self, assignment: &PropertyAssignment, entity: &EntityName) -> Result<()> {
        let kv = assignment.to_string();
        Self::check(self.run(&["set", &kv, entity.as_str()])?, "zfs set").map(|_| ())
    }
}

impl PropertyValidator for ZfsCli {
    fn validate(&self, assignment: &PropertyAssignment, sample: &EntityName) -> Result<()> {
        Self::check(
            self.run(&["get", "-H", "-o", "value", &assignment.property, sample.as_str()])?,
            "zfs get",
        )
        .map(|_| ())
    }
}
