//! Discovery rules and check parameters.
//!
//! Everything here is plain `serde` data. Invariants that would otherwise only surface
//! while checking (invalid regular expressions, ambiguous state tables, inverted levels)
//! are rejected when the configuration is parsed.
mod conditions;
mod error;
mod mappings;
mod params;
mod rules;

pub use conditions::{MatchingConditions, PatternList};
pub use error::{Error, Result};
pub use mappings::{CombinedMapping, IndependentMapping, StateMappings};
pub use params::{CheckParams, DiscoveredParams, InfotextFormat, TotalTraffic};
pub use rules::{
    DiscoveryRule, GroupItem, GroupingRule, Labels, NamingScheme, SingleDiscoveryRule,
};
