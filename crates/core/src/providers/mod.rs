pub mod registry;
pub mod traits;

// Provider implementations
pub mod mock;
pub mod yahoo_finance;
