pub mod aggregate;
pub mod crawl_config;
pub mod lexicon;
pub mod polarity;
pub mod seed_url;
