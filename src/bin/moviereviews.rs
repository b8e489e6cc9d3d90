use bson::Bson;
use clap::{Parser, Subcommand};
use moviereviews::config::AppConfig;
use moviereviews::dao::{DEFAULT_PAGE_SIZE, FilterSpec, MovieFilter, PageRequest};
use moviereviews::server;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "moviereviews", version, about = "Movie catalog read API", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML). If omitted, default locations are searched.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Storage URI (mongodb://..., mongodb+srv://..., or memory://). Overrides MOVIEREVIEWS_DB_URI.")]
    uri: Option<String>,
    #[arg(long, help = "Database holding the movies collection. Overrides MOVIEREVIEWS_NS.")]
    ns: Option<String>,
    #[arg(long, help = "log4rs YAML config; replaces the built-in console/file setup")]
    log_config: Option<PathBuf>,
    #[arg(long, help = "Log level: error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Serve the HTTP API (default)")]
    Serve {
        #[arg(long, help = "Interface to bind")]
        host: Option<String>,
        #[arg(long, help = "Port to listen on")]
        port: Option<u16>,
        #[arg(long, help = "JSON/NDJSON fixture loaded into the embedded engine")]
        seed: Option<PathBuf>,
        #[arg(long, help = "Exit when the movies collection cannot be bound")]
        strict_bind: bool,
    },
    #[command(about = "Fetch one page of movies and print it as JSON")]
    Query {
        #[arg(long, help = "Full-text search on titles; wins over --rated")]
        title: Option<String>,
        #[arg(long, help = "Exact content rating, e.g. PG-13")]
        rated: Option<String>,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        page: i64,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, allow_hyphen_values = true)]
        page_size: i64,
        #[arg(long, help = "JSON/NDJSON fixture loaded into the embedded engine")]
        seed: Option<PathBuf>,
    },
}

impl Cli {
    fn overrides(&self) -> AppConfig {
        let mut cfg = AppConfig {
            db_uri: self.uri.clone(),
            namespace: self.ns.clone(),
            log_config: self.log_config.clone(),
            log_level: self.log_level.clone(),
            ..AppConfig::default()
        };
        match &self.command {
            Some(Commands::Serve { host, port, seed, strict_bind }) => {
                cfg.host = host.clone();
                cfg.port = *port;
                cfg.seed_path = seed.clone();
                cfg.strict_bind = strict_bind.then_some(true);
            }
            Some(Commands::Query { seed, .. }) => cfg.seed_path = seed.clone(),
            None => {}
        }
        cfg
    }
}

async fn query(cfg: &AppConfig, filters: FilterSpec, page: PageRequest) -> Result<(), Box<dyn std::error::Error>> {
    let conn = server::connect(cfg).await?;
    let dao = server::bind_movies(cfg, conn.as_ref())?;
    let result = dao.get_movies(&MovieFilter::from(filters), page).await;
    let movies: Vec<serde_json::Value> =
        result.items.into_iter().map(|d| Bson::Document(d).into_relaxed_extjson()).collect();
    let out = serde_json::json!({ "movies": movies, "total_results": result.total_matching });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let cfg = match AppConfig::load(cli.overrides(), cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = moviereviews::init(&cfg) {
        eprintln!("warning: logging not initialized: {e}");
    }

    let r = match cli.command {
        Some(Commands::Query { title, rated, page, page_size, .. }) => {
            query(&cfg, FilterSpec { title, rated }, PageRequest::new(page, page_size)).await
        }
        Some(Commands::Serve { .. }) | None => server::run(&cfg).await,
    };
    if let Err(e) = r {
        log::error!("{e}");
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
