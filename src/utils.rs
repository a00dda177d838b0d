use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use std::env;
use time::{format_description::well_known::Iso8601, OffsetDateTime};

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Parser, Clone, Debug, Default)]
#[command(
    author,
    version,
    about = "Hawaii Climate API - read-only aggregation service over daily weather observations"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    #[arg(short, long, env = "CLIMATE_API_CONFIG")]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "CLIMATE_API_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short, long, env = "CLIMATE_API_HOST")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "CLIMATE_API_PORT")]
    pub port: Option<String>,

    /// Public URL used for links in the index page
    #[arg(short, long, env = "CLIMATE_API_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// Path to the pre-loaded sqlite climate snapshot
    #[arg(short = 'b', long, env = "CLIMATE_API_DB")]
    pub database: Option<String>,
}

/// Values read from an optional TOML config file; CLI args and env vars win.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct FileConfig {
    level: Option<String>,
    host: Option<String>,
    port: Option<String>,
    remote_url: Option<String>,
    database: Option<String>,
}

impl Cli {
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port.clone().unwrap_or_else(|| DEFAULT_PORT.to_string())
    }

    pub fn remote_url(&self) -> String {
        self.remote_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host(), self.port()))
    }

    pub fn database(&self) -> String {
        self.database
            .clone()
            .unwrap_or_else(|| "./hawaii.sqlite".to_string())
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    let Some(file) = cli_args.config.as_deref().and_then(load_config) else {
        return cli_args;
    };

    // CLI args override file config (env vars are handled by clap)
    Cli {
        config: cli_args.config,
        level: cli_args.level.or(file.level),
        domain: cli_args.domain.or(file.host),
        port: cli_args.port.or(file.port),
        remote_url: cli_args.remote_url.or(file.remote_url),
        database: cli_args.database.or(file.database),
    }
}

fn load_config(path: &str) -> Option<FileConfig> {
    let loaded = config::Config::builder()
        .add_source(config::File::with_name(path))
        .build()
        .and_then(|settings| settings.try_deserialize::<FileConfig>());

    match loaded {
        Ok(file) => Some(file),
        Err(e) => {
            log::warn!("failed to load config file {}: {}", path, e);
            None
        }
    }
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                OffsetDateTime::now_utc().format(&Iso8601::DEFAULT).unwrap(),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
