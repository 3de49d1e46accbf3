use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig as _;

use council_cli::bootstrap::{App, TurnOptions};
use council_cli::cli::{self, Cli, Command, ConfigCommand, SessionsCommand};
use council_domain::config::{Config, ObservabilityConfig};
use council_sessions::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        println!("council {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let (config, config_path) = cli::load_config()?;
    let tracer_provider = init_tracing(&config.observability, cli.log_json);

    let outcome = dispatch(cli.command, Arc::new(config), &config_path).await;

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            eprintln!("WARNING: OpenTelemetry shutdown failed: {e}");
        }
    }

    match outcome {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => Err(e),
    }
}

/// Run one command. `Ok(false)` means it finished but should exit non-zero.
async fn dispatch(command: Command, config: Arc<Config>, config_path: &str) -> anyhow::Result<bool> {
    match command {
        Command::Ask {
            message,
            attach,
            session,
            model,
            grounding,
            json,
        } => {
            let opts = TurnOptions {
                model,
                grounding,
                attachment: attach,
            };
            cli::ask::run(config, message, session, opts, json).await
        }
        Command::Chat {
            session,
            model,
            grounding,
        } => {
            let opts = TurnOptions {
                model,
                grounding,
                attachment: None,
            };
            cli::chat::chat(config, session, opts).await?;
            Ok(true)
        }
        Command::Sessions(SessionsCommand::List) => {
            cli::sessions::list(&open_store(&config)?);
            Ok(true)
        }
        Command::Sessions(SessionsCommand::Show { id }) => {
            cli::sessions::show(&open_store(&config)?, &id)?;
            Ok(true)
        }
        Command::Sessions(SessionsCommand::Delete { id }) => {
            let app = App::build(config)?;
            cli::sessions::delete(&app, &id)?;
            Ok(true)
        }
        Command::Memory(command) => {
            cli::memory::run(&open_store(&config)?, command)?;
            Ok(true)
        }
        Command::Config(ConfigCommand::Validate) => Ok(cli::config::validate(&config, config_path)),
        Command::Config(ConfigCommand::Show) => {
            cli::config::show(&config)?;
            Ok(true)
        }
        Command::Config(ConfigCommand::SetSecret) => {
            cli::config::set_secret(&config)?;
            Ok(true)
        }
        Command::Version => Ok(true),
    }
}

fn open_store(config: &Config) -> anyhow::Result<SessionStore> {
    Ok(SessionStore::open(
        &config.sessions.state_path,
        config.sessions.title_max_chars,
    )?)
}

/// Initialize tracing on stderr so stdout stays clean for answers.
///
/// `--log-json` switches to JSON lines. When `otlp_endpoint` is configured,
/// an OpenTelemetry layer exports every span via OTLP/gRPC; the returned
/// [`SdkTracerProvider`] must be shut down on exit to flush pending spans.
///
/// [`SdkTracerProvider`]: opentelemetry_sdk::trace::SdkTracerProvider
fn init_tracing(obs: &ObservabilityConfig, json: bool) -> Option<opentelemetry_sdk::trace::SdkTracerProvider> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,council=info"));

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .boxed()
    };

    let Some(endpoint) = obs.otlp_endpoint.as_deref().filter(|_| obs.otlp_enabled()) else {
        tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
        return None;
    };

    let exporter = match opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
    {
        Ok(e) => e,
        Err(e) => {
            eprintln!("WARNING: failed to create OTLP exporter for {endpoint}: {e}; continuing without OpenTelemetry");
            tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
            return None;
        }
    };

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(obs.service_name.clone())
        .build();

    let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(opentelemetry_sdk::trace::Sampler::TraceIdRatioBased(obs.sample_rate))
        .with_resource(resource)
        .build();

    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("council"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    Some(tracer_provider)
}
