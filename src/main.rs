use anyhow::{Context, bail};
use futures::StreamExt;
use multiscout::{
    ActivitySessionRegistry, AppState, ConfigManager, MultiscoutConfig, ResearchCoordinator,
    activity::{StreamSettings, event_stream},
    api::{handlers::research::validate_request, routes},
    cli::{Cli, Commands, output::Output},
    types::ResearchRequest,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match run(cli, &output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: &Output) -> anyhow::Result<()> {
    match cli.command {
        None | Some(Commands::Serve) => serve(&cli.config, cli.verbose, output).await,
        Some(Commands::Research {
            query,
            fanout,
            results,
            model,
        }) => {
            let request = ResearchRequest {
                query,
                num_results_per_agent: results,
                fanout,
                model,
            };
            research(&cli.config, cli.verbose, request, output).await
        }
        Some(Commands::Config { validate }) => show_config(&cli.config, validate, output),
    }
}

fn init_logging(config: &MultiscoutConfig, default_level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { default_level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("multiscout={level},tower_http={level}")));

    let json = config.server.json_logs;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer()))
        .init();
}

/// Load the config file, or fall back to defaults when it does not exist.
fn load_config(path: &Path, output: &Output) -> anyhow::Result<ConfigManager> {
    if path.exists() {
        return ConfigManager::new(path)
            .with_context(|| format!("Failed to load {}", path.display()));
    }

    output.warning(&format!(
        "{} not found, using built-in defaults",
        path.display()
    ));
    Ok(ConfigManager::from_config(MultiscoutConfig::default()))
}

async fn serve(config_path: &Path, verbose: bool, output: &Output) -> anyhow::Result<()> {
    let mut manager = load_config(config_path, output)?;
    let config = manager.config();
    init_logging(&config, &config.server.log_level, verbose);
    output.banner();

    if config_path.exists()
        && let Err(e) = manager.start_watching()
    {
        warn!(error = %e, "Config hot reload disabled");
    }

    let state = AppState::from_config(Arc::new(manager))?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, search = state.coordinator.search_provider(), "Server listening");
    output.success(&format!("Listening on http://{}", addr));
    #[cfg(feature = "swagger-ui")]
    output.info(&format!("API docs at http://{}/swagger-ui/", addr));

    axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn research(
    config_path: &Path,
    verbose: bool,
    request: ResearchRequest,
    output: &Output,
) -> anyhow::Result<()> {
    let manager = load_config(config_path, output)?;
    let config = manager.config();
    init_logging(&config, "warn", verbose);

    let (query, options) = validate_request(request, &config)?;
    let coordinator = Arc::new(ResearchCoordinator::from_config(&config)?);
    let sessions = Arc::new(ActivitySessionRegistry::new());
    let session_id = sessions.create_session(&query);

    output.header(&format!("Researching: {}", query));
    println!();

    let start = Instant::now();
    let run = {
        let coordinator = Arc::clone(&coordinator);
        let sessions = Arc::clone(&sessions);
        let session_id = session_id.clone();
        let query = query.clone();
        tokio::spawn(async move {
            coordinator
                .run_in_session(&sessions, &session_id, &query, options)
                .await
        })
    };

    let settings = StreamSettings {
        poll_interval: Duration::from_millis(200),
        ..config.activity.stream_settings()
    };
    let mut events = Box::pin(event_stream(sessions.get(Some(&session_id)), settings));
    while let Some(event) = events.next().await {
        output.event(&event);
    }

    let result = match run.await.context("Research task panicked")? {
        Ok(result) => result,
        Err(e) => bail!("Research failed: {}", e),
    };
    output.report(&result, start.elapsed().as_millis() as u64);
    Ok(())
}

fn show_config(config_path: &Path, validate_env: bool, output: &Output) -> anyhow::Result<()> {
    let config = MultiscoutConfig::load(config_path)
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    if validate_env {
        config
            .validate_env()
            .context("Configuration is valid but the environment is incomplete")?;
        output.success("Configuration and environment are valid");
    } else {
        output.success("Configuration is valid");
    }

    output.header("Server");
    output.kv("Address", &format!("{}:{}", config.server.host, config.server.port));
    output.kv("Log level", &config.server.log_level);
    output.kv(
        "API key",
        if config.api_key().is_some() {
            "required"
        } else {
            "not configured"
        },
    );

    output.header("LLM");
    output.kv("Endpoint", &config.llm.api_base);
    output.kv("Default model", &config.llm.default_model);
    for model in &config.llm.models {
        output.list_item(&format!("{} ({}, {})", model.id, model.name, model.provider));
    }

    output.header("Research");
    output.kv("Search", &format!("{:?}", config.search.provider).to_lowercase());
    output.kv(
        "Results per agent",
        &config.research.default_results_per_agent.to_string(),
    );
    output.kv(
        "Dispatch",
        if config.research.parallel_subagents {
            "concurrent"
        } else {
            "sequential"
        },
    );
    output.kv("Run timeout", &format!("{}s", config.research.run_timeout_secs));

    if !validate_env {
        output.hint("Run `multiscout-server config --validate` to also check API keys");
    }
    Ok(())
}
