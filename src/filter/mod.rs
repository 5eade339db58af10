//! Filtering: the ordered rule-chain primitive, two DSLs for expressing
//! rules as strings, and tag-based sink routing (§4.4).

pub mod compact_dsl;
pub mod expression_dsl;
pub mod rule;
pub mod tag;

pub use rule::{FilterRule, RuleChain};
pub use tag::TagRouting;
