use crate::domain::values::crawl_config::CrawlConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stocksense", about = "Focused crawler scoring sentiment on stocks of interest")]
pub struct Cli {
    /// Log as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl from the configured seeds and print per-stock scores as JSON
    Crawl(CrawlArgs),
    /// Score one document (file path or - for stdin)
    Analyse {
        input: String,
    },
    /// Dump every annotation of a document (file path or - for stdin)
    Annotate {
        input: String,
    },
    /// Print the first tracked company named in the text
    Match {
        text: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct CrawlArgs {
    /// Use the seeds of this test variant (falls back to default seeds)
    #[arg(long)]
    pub test_mode: Option<String>,
    /// Extra default seed URL (repeatable)
    #[arg(long = "seed")]
    pub seeds: Vec<String>,
    /// Stop the crawl after this many seconds
    #[arg(long)]
    pub duration_secs: Option<u64>,
    /// Number of crawl workers
    #[arg(long)]
    pub workers: Option<usize>,
    /// Maximum link depth from a seed (-1 for unlimited)
    #[arg(long, allow_hyphen_values = true)]
    pub max_depth: Option<i32>,
    /// Minimum delay between requests to one host, in milliseconds
    #[arg(long)]
    pub politeness_ms: Option<u64>,
    /// Do not follow https links
    #[arg(long)]
    pub no_https: bool,
    /// Visit non-text responses too
    #[arg(long)]
    pub include_binary: bool,
    /// Start from scratch instead of resuming the stored frontier
    #[arg(long)]
    pub no_resume: bool,
    /// Folder for the resumable frontier
    #[arg(long)]
    pub storage: Option<PathBuf>,
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Largest page body to download, in bytes
    #[arg(long)]
    pub max_download_size: Option<usize>,
    /// Pages a worker must visit before it follows discovered links
    #[arg(long)]
    pub expansion_threshold: Option<u64>,
    /// Stop after fetching this many pages (-1 for unlimited)
    #[arg(long, allow_hyphen_values = true)]
    pub max_pages: Option<i64>,
}

impl CrawlArgs {
    /// Overlay the flags that were given on `config`.
    pub fn apply(&self, mut config: CrawlConfig) -> CrawlConfig {
        if let Some(n) = self.workers {
            config.number_of_crawlers = n;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth_of_crawling = depth;
        }
        if let Some(ms) = self.politeness_ms {
            config.politeness_delay_ms = ms;
        }
        if self.no_https {
            config.include_https_pages = false;
        }
        if self.include_binary {
            config.include_binary_content = true;
        }
        if self.no_resume {
            config.resumable_crawling = false;
        }
        if let Some(folder) = &self.storage {
            config.crawl_storage_folder = folder.clone();
        }
        if let Some(agent) = &self.user_agent {
            config.user_agent = agent.clone();
        }
        if let Some(size) = self.max_download_size {
            config.max_download_size = size;
        }
        if let Some(threshold) = self.expansion_threshold {
            config.expansion_threshold = threshold;
        }
        if let Some(pages) = self.max_pages {
            config.max_pages_to_fetch = pages;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_flags_override_config() {
        let cli = Cli::parse_from([
            "stocksense",
            "crawl",
            "--workers",
            "4",
            "--max-depth",
            "-1",
            "--no-https",
            "--seed",
            "http://a.example/",
            "--seed",
            "http://b.example/",
        ]);
        let Commands::Crawl(args) = cli.command else {
            panic!("expected crawl");
        };
        assert_eq!(args.seeds.len(), 2);
        let config = args.apply(CrawlConfig::default());
        assert_eq!(config.number_of_crawlers, 4);
        assert_eq!(config.max_depth_of_crawling, -1);
        assert!(!config.include_https_pages);
        assert!(config.resumable_crawling);
    }

    #[test]
    fn test_no_flags_keep_defaults() {
        let config = CrawlArgs::default().apply(CrawlConfig::default());
        assert_eq!(config, CrawlConfig::default());
    }
}
