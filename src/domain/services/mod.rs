pub mod entity_matcher;
pub mod frontier_policy;
