pub mod frontier_store;
pub mod migrations;
