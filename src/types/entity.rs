use std::fmt;

use serde::Serialize;

use super::errors::{Error, ErrorKind, Result};

/// Hierarchical dataset name such as `pool/child/grandchild`.
///
/// Entities are only ever discovered through the inventory adapter; this type
/// just rejects lines that cannot possibly address a dataset (empty, absolute,
/// or containing empty components) so that garbage never reaches the apply step.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityName(String);

impl EntityName {
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim_end_matches(['\r', '\n']);
        if name.is_empty() {
            return Err(Error::new(ErrorKind::InvalidName, "empty dataset name"));
        }
        if name.starts_with('/') || name.split('/').any(str::is_empty) {
            return Err(Error::new(
                ErrorKind::InvalidName,
                format!("malformed dataset name: {name}"),
            ));
        }
        Ok(Self(name.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
