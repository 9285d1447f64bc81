//! Listing harvester command-line entry point
//!
//! Configuration comes from an optional file, `HARVESTER__*` environment
//! variables, and the flags below, in increasing order of precedence.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};

use listing_harvester::application::{HarvestSummary, Harvester};
use listing_harvester::infrastructure::logging::{init_logging_with_config, log_system_info};
use listing_harvester::infrastructure::{
    AppConfig, ConfigManager, EngineKind, HarvestConfig, HarvestConfigBuilder, SessionLauncher,
    StaticLauncher, Strictness, WebDriverLauncher,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EngineArg {
    Webdriver,
    Static,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Webdriver => Self::WebDriver,
            EngineArg::Static => Self::Static,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "listing-harvester",
    version,
    about = "Scroll paginated listing pages and export description/price/link rows to CSV"
)]
struct Cli {
    /// Configuration file (TOML or JSON); must exist when given
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Base listing URL; the page number is appended unless --single-page is set
    #[arg(long)]
    url: Option<String>,

    /// Store identifier used in the file name and every row
    #[arg(long)]
    store: Option<String>,

    /// Number of pages to harvest
    #[arg(long)]
    pages: Option<u32>,

    /// Harvest the base URL verbatim on every page
    #[arg(long)]
    single_page: bool,

    /// Output directory
    #[arg(long)]
    target_dir: Option<PathBuf>,

    /// Pixels per scroll tick
    #[arg(long)]
    scroll_step: Option<u32>,

    #[arg(long, value_enum)]
    engine: Option<EngineArg>,

    /// WebDriver endpoint, e.g. http://localhost:9515
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Container selector; pass an empty string to search the whole document
    #[arg(long)]
    content_area: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    price: Option<String>,

    #[arg(long)]
    link: Option<String>,

    /// Reject pages with uneven selector matches or missing links
    #[arg(long)]
    strict: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn load_config(&self) -> Result<AppConfig> {
        let manager = match &self.config {
            Some(path) => ConfigManager::with_path(path),
            None => ConfigManager::new(),
        };
        manager
            .load(self.config.is_some())
            .with_context(|| format!("Failed to load configuration from {:?}", manager.config_path()))
    }

    fn apply_overrides(&self, config: HarvestConfig) -> HarvestConfigBuilder {
        let mut builder = HarvestConfigBuilder::from_config(config);

        if let Some(url) = &self.url {
            builder = builder.url(url);
        }
        if let Some(store) = &self.store {
            builder = builder.store(store);
        }
        if let Some(pages) = self.pages {
            builder = builder.page_count(pages);
        }
        if self.single_page {
            builder = builder.single_page(true);
        }
        if let Some(dir) = &self.target_dir {
            builder = builder.target_directory(dir);
        }
        if let Some(step) = self.scroll_step {
            builder = builder.scroll_step(step);
        }
        if let Some(engine) = self.engine {
            builder = builder.engine(engine.into());
        }
        if let Some(selector) = &self.content_area {
            builder = builder.content_area_selector(selector);
        }
        if let Some(selector) = &self.description {
            builder = builder.description_selector(selector);
        }
        if let Some(selector) = &self.price {
            builder = builder.price_selector(selector);
        }
        if let Some(selector) = &self.link {
            builder = builder.link_selector(selector);
        }
        if let Some(endpoint) = &self.webdriver_url {
            builder = builder.webdriver_url(endpoint);
        }
        if self.strict {
            builder = builder.strictness(Strictness::Strict);
        }

        builder
    }
}

async fn harvest<L: SessionLauncher>(config: HarvestConfig, launcher: L) -> Result<HarvestSummary> {
    Ok(Harvester::new(config, launcher).run().await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let AppConfig { harvest: base, mut logging } = cli.load_config()?;

    if let Some(level) = &cli.log_level {
        logging.level.clone_from(level);
    }
    init_logging_with_config(&logging)?;
    log_system_info();

    let config = cli
        .apply_overrides(base)
        .build()
        .context("Invalid harvest configuration")?;

    info!(
        "Harvesting {} page(s) for store '{}' with the {:?} engine",
        config.page_count, config.store, config.engine
    );

    let outcome = match config.engine {
        EngineKind::WebDriver => {
            let launcher = WebDriverLauncher::new(config.browser.clone());
            harvest(config, launcher).await
        }
        EngineKind::Static => {
            let launcher = StaticLauncher::http(&config.http).context("Failed to build HTTP client")?;
            harvest(config, launcher).await
        }
    };

    match outcome {
        Ok(summary) => {
            info!(
                "Collected {} records from {} page(s) on {}",
                summary.records, summary.pages, summary.run_date
            );
            println!("Data has been saved to {}", summary.output_path.display());
            Ok(())
        }
        Err(e) => {
            error!("Harvest aborted: {:#}", e);
            Err(e)
        }
    }
}
