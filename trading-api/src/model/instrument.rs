//! Classification of tradable instruments.
//!
//! Instruments are identified by name only. Whether an instrument carries a
//! strictly positive price is derived once from that name.

use serde::{Deserialize, Serialize};

/// Name fragments that mark an instrument as equity-like.
pub const DEFAULT_EQUITY_MARKERS: [&str; 2] = ["equity", "eqty"];

/// Broad price behaviour of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    /// Shares and the like. Prices follow a multiplicative walk and stay positive.
    Equity,
    /// Anything else. Prices are independent draws and may go negative.
    General,
}

impl AssetClass {
    /// Classifies `name` by case-insensitive substring match against `markers`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trading::model::AssetClass;
    ///
    /// let markers = ["equity", "eqty"];
    /// assert_eq!(AssetClass::classify("IBM US Equity", &markers), AssetClass::Equity);
    /// assert_eq!(AssetClass::classify("CL1 Comdty", &markers), AssetClass::General);
    /// ```
    pub fn classify<S: AsRef<str>>(name: &str, markers: &[S]) -> Self {
        let folded = name.to_lowercase();
        if markers
            .iter()
            .any(|marker| folded.contains(&marker.as_ref().to_lowercase()))
        {
            AssetClass::Equity
        } else {
            AssetClass::General
        }
    }

    pub fn is_positive_only(&self) -> bool {
        matches!(self, AssetClass::Equity)
    }
}
