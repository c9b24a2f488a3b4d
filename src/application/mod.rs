pub mod aggregator;
pub mod annotate_debug;
pub mod crawl_worker;
pub mod orchestrator;
pub mod sentiment;
