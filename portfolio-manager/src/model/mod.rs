pub mod account;
pub mod ids;
pub mod portfolio;

pub use account::Account;
pub use ids::HoldingKey;
pub use portfolio::Portfolio;
