//! CLI entrypoint for ragdash
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use ragdash_application::{
    ContextUseCase, HealthMonitor, HealthView, NoSessionLogger, RequestDispatcher,
    SessionLogger, StreamConsumer,
};
use ragdash_domain::{
    ContextDraft, GenerationMode, Model, OutputFormat, PromptRequest, SessionState,
};
use ragdash_infrastructure::{ConfigLoader, FileConfig, HttpBackend, JsonlSessionLogger};
use ragdash_presentation::{
    ChatRepl, Cli, Command, ConsoleFormatter, ContextCommand, ProgressReporter, StreamPrinter,
};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    // stdout carries the streamed answer, so diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        let config = load_config(&cli)?;
        println!();
        println!("Effective configuration:");
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    let config = load_config(&cli)?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    let Some(command) = cli.command else {
        bail!("No command given. Run `ragdash --help` for usage.");
    };

    info!("Starting ragdash against {}", config.api.base_url);
    let format = config.output.format.unwrap_or_default();
    let show_progress = !cli.quiet && format == OutputFormat::Text;

    // === Dependency Injection ===
    let backend = Arc::new(HttpBackend::with_connect_timeout(
        config.api.base_url.clone(),
        config.api.connect_timeout(),
    )?);

    match command {
        Command::Generate(args) => {
            let model = resolve_model(args.model.as_deref(), &config);
            let mode = GenerationMode::from_rag_toggle(args.rag);
            let request = PromptRequest::new(&args.prompt, model, mode)?;
            let dispatcher = build_dispatcher(backend, &config);

            if args.no_stream {
                run_completion(&dispatcher, request, format).await
            } else {
                run_stream(&dispatcher, request, format, show_progress).await
            }
        }
        Command::Agent {
            query,
            model,
            no_stream,
        } => {
            let model = resolve_model(model.as_deref(), &config);
            let request = PromptRequest::agent(&query, model)?;
            let dispatcher = build_dispatcher(backend, &config);
            if no_stream {
                run_completion(&dispatcher, request, format).await
            } else {
                run_stream(&dispatcher, request, format, show_progress).await
            }
        }
        Command::Chat { rag, model } => {
            let model = resolve_model(model.as_deref(), &config);
            let dispatcher = Arc::new(build_dispatcher(backend, &config));
            let mut repl = ChatRepl::new(Arc::clone(&dispatcher), model)
                .with_mode(GenerationMode::from_rag_toggle(rag));
            repl.run().await?;
            dispatcher.shutdown();
            Ok(())
        }
        Command::Context(command) => {
            run_context(ContextUseCase::new(backend), command, format).await
        }
        Command::Health { watch } => {
            let monitor =
                HealthMonitor::new(backend).with_interval(config.health.poll_interval());
            if watch {
                watch_health(&monitor, format).await
            } else {
                let view = monitor.check_once().await;
                print_health(&view, format);
                if let HealthView::Failed(message) = view {
                    bail!("Health check failed: {}", message);
                }
                Ok(())
            }
        }
    }
}

/// Merge configuration sources, then apply command-line overrides.
fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    if let Some(base_url) = &cli.api_base {
        config.api.base_url = base_url.clone();
    }
    if let Some(output) = cli.output {
        config.output.format = Some(output.into());
    }

    config.validate()?;
    Ok(config)
}

fn resolve_model(arg: Option<&str>, config: &FileConfig) -> Model {
    match arg {
        Some(name) => {
            let Ok(model) = name.parse::<Model>();
            if model.is_custom() {
                warn!("Model '{}' is not one of the known models", model);
            }
            model
        }
        None => config.models.default.clone(),
    }
}

fn build_dispatcher(backend: Arc<HttpBackend>, config: &FileConfig) -> RequestDispatcher {
    let logger: Arc<dyn SessionLogger> = match &config.logging.transcript {
        Some(path) => match JsonlSessionLogger::open(path) {
            Some(logger) => {
                info!("Session transcript: {}", logger.path().display());
                Arc::new(logger)
            }
            None => Arc::new(NoSessionLogger),
        },
        None => Arc::new(NoSessionLogger),
    };

    RequestDispatcher::new(backend)
        .with_consumer(StreamConsumer::new(config.stream.decode))
        .with_session_logger(logger)
}

/// Wait for the whole response and print it.
async fn run_completion(
    dispatcher: &RequestDispatcher,
    request: PromptRequest,
    format: OutputFormat,
) -> Result<()> {
    let completion = dispatcher.complete(&request).await?;
    match format {
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_completion_json(&completion)),
        OutputFormat::Text => print!("{}", ConsoleFormatter::format_completion(&completion)),
    }
    Ok(())
}

/// Stream one request to stdout. Ctrl-C cancels it.
async fn run_stream(
    dispatcher: &RequestDispatcher,
    request: PromptRequest,
    format: OutputFormat,
    show_progress: bool,
) -> Result<()> {
    let handle = dispatcher.submit(request);

    let out: Box<dyn Write + Send> = match format {
        OutputFormat::Text => Box::new(io::stdout()),
        OutputFormat::Json => Box::new(io::sink()),
    };
    let progress = if show_progress {
        ProgressReporter::new()
    } else {
        ProgressReporter::hidden()
    };
    let mut printer = StreamPrinter::new(out, progress);

    tokio::select! {
        followed = printer.follow(handle.subscribe(), handle.request_id()) => {
            followed?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, cancelling {}", handle.request_id());
            handle.cancel();
        }
    }

    let session = handle.wait().await?;
    printer.render(&session)?;

    if format == OutputFormat::Json {
        println!("{}", ConsoleFormatter::format_session_json(&session));
    }

    match session.state() {
        SessionState::Failed(failure) => bail!("{} ({})", failure, failure.kind.as_str()),
        SessionState::Cancelled if format == OutputFormat::Text => {
            if let Some(status) = ConsoleFormatter::session_status(&session) {
                eprintln!("{}", status);
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

async fn run_context(
    use_case: ContextUseCase,
    command: ContextCommand,
    format: OutputFormat,
) -> Result<()> {
    let json = format == OutputFormat::Json;

    match command {
        ContextCommand::List => {
            let docs = use_case.list().await?;
            if json {
                println!("{}", ConsoleFormatter::format_contexts_json(&docs));
            } else {
                print!("{}", ConsoleFormatter::format_contexts(&docs));
            }
        }
        ContextCommand::Add { title, content } => {
            let id = use_case.create(ContextDraft::new(title, content)).await?;
            if json {
                println!("{}", json!({ "id": id }));
            } else {
                println!("Added context {}", id);
            }
        }
        ContextCommand::Update { id, title, content } => {
            use_case.update(&id, ContextDraft::new(title, content)).await?;
            if json {
                println!("{}", json!({ "id": id, "updated": true }));
            } else {
                println!("Updated context {}", id);
            }
        }
        ContextCommand::Delete { id } => {
            use_case.delete(&id).await?;
            if json {
                println!("{}", json!({ "id": id, "deleted": true }));
            } else {
                println!("Deleted context {}", id);
            }
        }
        ContextCommand::Seed => {
            use_case.seed_mock_data().await?;
            if json {
                println!("{}", json!({ "seeded": true }));
            } else {
                println!("Sample context documents created");
            }
        }
    }
    Ok(())
}

fn print_health(view: &HealthView, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_health_json(view)),
        OutputFormat::Text => print!("{}", ConsoleFormatter::format_health(view)),
    }
}

/// Print every health update until Ctrl-C.
async fn watch_health(monitor: &HealthMonitor, format: OutputFormat) -> Result<()> {
    let shutdown = CancellationToken::new();
    let mut watch = monitor.spawn(shutdown.clone());
    info!("Polling health every {:?}", monitor.interval());

    loop {
        let view = watch.receiver.borrow_and_update().clone();
        if view != HealthView::Loading {
            print_health(&view, format);
        }

        tokio::select! {
            changed = watch.receiver.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    shutdown.cancel();
    watch.join().await;
    Ok(())
}
