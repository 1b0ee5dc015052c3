//! Containers of holdings: accounts group holdings by instrument, portfolios
//! group accounts by name.
//!
//! Containers hold no history of their own. Their market value is computed on
//! demand from fresh valuations of their members.

pub mod model;

pub use model::{Account, HoldingKey, Portfolio};
