use clap::Parser;
use std::io::Read;
use std::time::Duration;
use stocksense::cli::commands::{Cli, Commands, CrawlArgs};
use stocksense::domain::error::DomainError;
use stocksense::domain::values::crawl_config::CrawlConfig;
use stocksense::domain::values::seed_url::SeedUrl;
use stocksense::{ResourcePaths, StockSense};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json);

    if let Err(e) = run_command(cli.command).await {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stocksense=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run_command(cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let paths = ResourcePaths::from_env();
    match cmd {
        Commands::Crawl(args) => crawl(&paths, args).await?,
        Commands::Analyse { input } => {
            let ss = StockSense::new(&paths, CrawlConfig::default());
            let text = read_input(&input)?;
            let output = ss.analyse(&text).map(|(stock, scale)| {
                serde_json::json!({
                    "stock": stock,
                    "score": scale.score(),
                    "positives": scale.positives(),
                    "negatives": scale.negatives(),
                })
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Annotate { input } => {
            let ss = StockSense::new(&paths, CrawlConfig::default());
            let text = read_input(&input)?;
            print!("{}", ss.annotate(&text)?);
        }
        Commands::Match { text } => {
            let ss = StockSense::new(&paths, CrawlConfig::default());
            match ss.match_company(&text) {
                Some(company) => println!("{company}"),
                None => println!("no match"),
            }
        }
    }
    Ok(())
}

async fn crawl(paths: &ResourcePaths, args: CrawlArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.apply(CrawlConfig::default());
    let ss = StockSense::new(paths, config);
    for url in &args.seeds {
        ss.add_seed(SeedUrl::default_seed(url.as_str()));
    }
    ss.set_test_mode(args.test_mode.clone());

    let limit = args.duration_secs.map(Duration::from_secs);
    let stop = async move {
        let deadline = async {
            match limit {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            _ = deadline => tracing::info!("crawl duration elapsed"),
            _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
        }
    };

    let report = ss.crawl_until(stop).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_input(input: &str) -> Result<String, DomainError> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}
