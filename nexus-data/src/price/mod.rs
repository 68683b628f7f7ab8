pub mod cached;
pub mod oracle;

pub use cached::CachedPriceOracle;
pub use oracle::{PriceOracle, StaticPriceOracle};
