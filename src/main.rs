use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use lambda_runtime::{LambdaEvent, service_fn};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use jarvis_brain::config::Config;
use jarvis_brain::context::RuntimeContext;
use jarvis_brain::handler::Handler;
use jarvis_brain::inference::bedrock::BedrockClient;
use jarvis_brain::local::{self, LocalRun};
use jarvis_brain::response::Envelope;

#[derive(Parser)]
#[command(name = "jarvis-brain", version, about = "Task analysis on a hosted Claude model.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve invocations from the function runtime (default)
    Serve,
    /// Run a single invocation locally and print the response
    Local {
        /// Task title
        #[arg(short, long)]
        title: Option<String>,

        /// Task description
        #[arg(short, long)]
        description: Option<String>,

        /// JSON event file, used instead of --title/--description
        #[arg(short, long)]
        event: Option<PathBuf>,

        /// Execution budget reported to the deadline gate
        #[arg(long, default_value_t = 30_000)]
        remaining_ms: u64,

        /// Request id echoed in the response
        #[arg(long, default_value = "local-dev-123")]
        request_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let handler = Arc::new(Handler::bedrock(Config::from_env()));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(handler).await,
        Command::Local {
            title,
            description,
            event,
            remaining_ms,
            request_id,
        } => {
            let run = LocalRun {
                event,
                title,
                description,
                request_id,
                remaining_ms,
            };
            let envelope = run.execute(&*handler).await?;
            println!("{}", local::render(&envelope));
            Ok(())
        }
    }
}

/// One handler, and so one cached client, for the life of the process.
async fn serve(handler: Arc<Handler<BedrockClient>>) -> anyhow::Result<()> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move {
            let ctx = RuntimeContext::from(&event.context);
            Ok::<Envelope, lambda_runtime::Error>(handler.handle(&event.payload, &ctx).await)
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!("function runtime stopped: {e}"))
}
