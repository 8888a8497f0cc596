#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockingPolicy {
    /// Live runs fail with `E_LOCKING` when no lock manager is configured.
    Required,
    Optional,
}

impl Default for LockingPolicy {
    fn default() -> Self {
        LockingPolicy::Optional
    }
}

/// Result of the classifier. Total over property names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Ordinary,
    Sensitive,
}

impl Sensitivity {
    #[must_use]
    pub const fn is_sensitive(self) -> bool {
        matches!(self, Sensitivity::Sensitive)
    }
}
