use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;
use wordnet_morphy::WordNetLemmatizer;

use village_locator::{
    AnswerGenerator, AppState, Credential, HierarchyTable, MATCH_THRESHOLD, MatchStrategy,
    Normalizer, PromptAssistant, PromptTemplate, Resolver, ResolverConfig, router,
};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_HIERARCHY: &str = "data.md";
const DEFAULT_WORDNET_PATH: &str = "wordnet";
const DEFAULT_ASSISTANT_CONFIG: &str = "config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config()?;
    info!("using hierarchy at {}", config.hierarchy_path.display());
    info!(
        "match strategy: {:?} (threshold {})",
        config.resolver.strategy, config.resolver.threshold
    );

    let start = Instant::now();
    let table = Arc::new(HierarchyTable::load(&config.hierarchy_path)?);
    info!("hierarchy loaded in {} ms", start.elapsed().as_millis());

    let normalizer = load_normalizer(config.wordnet_path.as_deref())?;
    let index_start = Instant::now();
    let resolver = Arc::new(Resolver::new(table, normalizer, config.resolver));
    info!(
        "village names normalized in {} ms",
        index_start.elapsed().as_millis()
    );

    if let Some(query) = config.one_shot_query {
        println!("{}", resolver.resolve(&query).describe(&query));
        return Ok(());
    }

    let assistant = load_credential()?.map(|credential| {
        info!("assistant credential configured; replies stay deterministic");
        Arc::new(PromptAssistant::new(credential, PromptTemplate::default()))
            as Arc<dyn AnswerGenerator>
    });
    if config.disable_cache {
        info!("cache headers disabled");
    }

    let state = AppState {
        resolver,
        assistant,
        disable_cache: config.disable_cache,
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    info!("binding to {addr}");
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    hierarchy_path: PathBuf,
    wordnet_path: Option<PathBuf>,
    resolver: ResolverConfig,
    disable_cache: bool,
    one_shot_query: Option<String>,
}

fn load_config() -> anyhow::Result<Config> {
    let mut disable_cache = false;
    let mut exact = false;
    let mut cli_data: Option<PathBuf> = None;
    let mut cli_wordnet_dir: Option<PathBuf> = None;
    let mut one_shot_query: Option<String> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-cache" => disable_cache = true,
            "--exact" => exact = true,
            "--data" => cli_data = args.next().map(PathBuf::from),
            "--wordnet-dir" => cli_wordnet_dir = args.next().map(PathBuf::from),
            "--query" => one_shot_query = args.next(),
            _ => {
                if let Some(path) = arg.strip_prefix("--data=") {
                    cli_data = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--wordnet-dir=") {
                    cli_wordnet_dir = Some(PathBuf::from(path));
                } else if let Some(query) = arg.strip_prefix("--query=") {
                    one_shot_query = Some(query.to_string());
                } else {
                    warn!("ignoring unknown argument {arg:?}");
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let hierarchy_path = cli_data
        .or_else(|| env::var("HIERARCHY_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HIERARCHY));
    let wordnet_path = cli_wordnet_dir
        .or_else(|| env::var("WORDNET_DIR").ok().map(PathBuf::from))
        .or_else(default_wordnet_path);

    let strategy = if exact {
        MatchStrategy::Exact
    } else {
        match env::var("MATCH_STRATEGY") {
            Ok(raw) => MatchStrategy::parse(&raw)
                .with_context(|| format!("MATCH_STRATEGY must be fuzzy or exact, got {raw:?}"))?,
            Err(_) => MatchStrategy::Fuzzy,
        }
    };
    let threshold = match env::var("MATCH_THRESHOLD") {
        Ok(raw) => parse_threshold(&raw)
            .with_context(|| format!("MATCH_THRESHOLD must be a number in 0..=100, got {raw:?}"))?,
        Err(_) => MATCH_THRESHOLD,
    };

    Ok(Config {
        host,
        port,
        hierarchy_path,
        wordnet_path,
        resolver: ResolverConfig {
            strategy,
            threshold,
        },
        disable_cache,
        one_shot_query,
    })
}

fn parse_threshold(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| (0.0..=100.0).contains(v))
}

fn default_wordnet_path() -> Option<PathBuf> {
    let local = PathBuf::from(DEFAULT_WORDNET_PATH);
    local.exists().then_some(local)
}

fn load_normalizer(wordnet_path: Option<&Path>) -> anyhow::Result<Normalizer> {
    let Some(dir) = wordnet_path else {
        warn!("no WordNet dictionary found; lemmatization disabled");
        return Ok(Normalizer::default());
    };
    let start = Instant::now();
    let lemmatizer = WordNetLemmatizer::load(dir)?;
    info!(
        "wordnet loaded from {} in {} ms",
        dir.display(),
        start.elapsed().as_millis()
    );
    Ok(Normalizer::new(Arc::new(lemmatizer)))
}

#[derive(Deserialize)]
struct AssistantConfig {
    openai_api_key: Option<String>,
}

/// Credential from `OPENAI_API_KEY`, else from the JSON file named by
/// `ASSISTANT_CONFIG` (default `config.json` when present).
fn load_credential() -> anyhow::Result<Option<Credential>> {
    if let Some(credential) = env::var("OPENAI_API_KEY")
        .ok()
        .as_deref()
        .and_then(Credential::new)
    {
        return Ok(Some(credential));
    }
    let path = match env::var("ASSISTANT_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => {
            let default = PathBuf::from(DEFAULT_ASSISTANT_CONFIG);
            if !default.exists() {
                return Ok(None);
            }
            default
        }
    };
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read assistant config {}", path.display()))?;
    let parsed: AssistantConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parse assistant config {}", path.display()))?;
    Ok(parsed.openai_api_key.as_deref().and_then(Credential::new))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
}
