//! Building usage categories.

use std::fmt;

/// Usage codes that receive forklift and truck energy.
pub const LOGISTICS_USAGES: &[&str] = &["COOL", "COLD", "GENERAL"];

/// Primary-use classification of a building (e.g. `"COLD"`, `"OFFICE"`).
///
/// Any code is accepted; only [`LOGISTICS_USAGES`] are logistics-relevant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UsageCategory(String);

impl UsageCategory {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Whether this usage receives any logistics energy allocation.
    pub fn is_logistics(&self) -> bool {
        LOGISTICS_USAGES.contains(&self.0.as_str())
    }
}

impl fmt::Display for UsageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UsageCategory {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}
