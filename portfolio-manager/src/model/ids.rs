use serde::{Deserialize, Serialize};
use trading_core::{Holding, Instrument};

/// Canonical lookup key of a holding: the instrument name.
///
/// Every handle a caller may hold (a name, an `Instrument`, a `Holding`) is
/// normalized to this key before any container lookup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HoldingKey(String);

impl HoldingKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HoldingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HoldingKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for HoldingKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&Instrument> for HoldingKey {
    fn from(value: &Instrument) -> Self {
        Self::new(value.get_name())
    }
}

impl From<&Holding> for HoldingKey {
    fn from(value: &Holding) -> Self {
        Self::from(value.instrument())
    }
}
