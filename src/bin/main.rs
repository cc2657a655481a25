//! sql-analyst CLI
//!
//! `serve` runs the HTTP API, `chat` is a terminal client for it and `ask`
//! answers one question in-process.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use sql_analyst::chat::{
    AnalystBackend, ChatSession, DEFAULT_API_URL, HttpBackend, LocalBackend, render_bar_chart,
    render_message,
};
use sql_analyst::config::{AppConfig, LogArgs};
use sql_analyst::error::LlmError;
use sql_analyst::observability::{TracingConfig, init_tracing};
use sql_analyst::server;
use sql_analyst::service::AnalystService;

#[derive(Parser)]
#[command(name = "sql-analyst")]
#[command(about = "Ask questions about a database in natural language", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    log: LogArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve(AppConfig),

    /// Interactive chat against a running API
    Chat(ChatArgs),

    /// Generate and run SQL for one question without a server
    Ask {
        #[command(flatten)]
        config: AppConfig,

        /// Provider to use instead of the default
        #[arg(long)]
        provider: Option<String>,

        /// Natural-language question
        question: String,
    },
}

#[derive(Args)]
struct ChatArgs {
    /// Base URL of the analyst API
    #[arg(long, env = "API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Provider to use instead of the server default
    #[arg(long)]
    provider: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(&TracingConfig::from(&cli.log)) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let outcome = match cli.command {
        Command::Serve(config) => run_server(&config).await,
        Command::Chat(args) => run_chat(args).await,
        Command::Ask {
            config,
            provider,
            question,
        } => run_ask(&config, provider, &question).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "sql-analyst failed");
            ExitCode::FAILURE
        }
    }
}

async fn run_server(config: &AppConfig) -> Result<(), LlmError> {
    let service = AnalystService::from_config(config)?;
    server::serve(Arc::new(service), config.bind_addr).await
}

async fn run_ask(
    config: &AppConfig,
    provider: Option<String>,
    question: &str,
) -> Result<(), LlmError> {
    let service = Arc::new(AnalystService::from_config(config)?);
    let mut session = ChatSession::new(LocalBackend::new(service));
    if let Some(provider) = provider {
        session = session.with_provider(provider);
    }
    let reply = session.ask(question).await;
    println!("{}", render_message(reply));
    Ok(())
}

async fn run_chat(args: ChatArgs) -> Result<(), LlmError> {
    let mut session = ChatSession::new(HttpBackend::new(&args.api_url)?);
    if let Some(provider) = args.provider {
        session = session.with_provider(provider);
    }
    println!("SQL analyst chat ({})", args.api_url);
    println!("Ask a question about your data. /chart <x> <y> draws the last result,");
    println!("/reset starts a new chat, /quit exits.");
    repl(&mut session).await
}

async fn repl<B: AnalystBackend>(session: &mut ChatSession<B>) -> Result<(), LlmError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => return Ok(()),
            "/reset" => {
                session.reset();
                println!("Started a new chat.");
            }
            command if command.starts_with("/chart") => println!("{}", chart(session, command)),
            question => {
                let reply = session.ask(question).await;
                println!("{}", render_message(reply));
            }
        }
    }
}

fn chart<B: AnalystBackend>(session: &ChatSession<B>, command: &str) -> String {
    let args: Vec<&str> = command.split_whitespace().skip(1).collect();
    let [x, y] = args.as_slice() else {
        return "Usage: /chart <x column> <y column>".to_string();
    };
    let Some(rows) = session.last_rows() else {
        return "Nothing to chart yet.".to_string();
    };
    render_bar_chart(rows, x, y).unwrap_or_else(|e| format!("Failed to draw the chart: {e}"))
}
