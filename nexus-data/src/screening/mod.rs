pub mod rule_screener;

pub use rule_screener::{RuleBasedScreener, Screener, ScreeningStats};
