pub mod ingest;
pub mod price;
pub mod screening;

// Re-export commonly used items
pub use ingest::MockSignalGenerator;
pub use price::{CachedPriceOracle, PriceOracle, StaticPriceOracle};
pub use screening::{RuleBasedScreener, Screener, ScreeningStats};
