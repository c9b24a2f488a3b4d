pub mod rule_based;
