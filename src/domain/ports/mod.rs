pub mod annotation;
pub mod crawl_engine;
