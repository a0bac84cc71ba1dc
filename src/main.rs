use anyhow::{bail, Context, Result};
use clap::{Args, Parser};
use tracing::{error, info};

use geochat::{chat, constants, web_server, Settings};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    services: ServiceArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Endpoints of the geocoding and completion services.
#[derive(Args, Debug)]
struct ServiceArgs {
    /// Groq API key. The Web UI always asks for its own.
    #[arg(long, env = "GROQ_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "GEOCHAT_GEOCODER_URL", global = true, default_value = constants::DEFAULT_GEOCODER_URL)]
    geocoder_url: String,

    #[arg(long, env = "GEOCHAT_USER_AGENT", global = true, default_value = constants::DEFAULT_USER_AGENT)]
    user_agent: String,

    #[arg(long, env = "GEOCHAT_COMPLETION_URL", global = true, default_value = constants::DEFAULT_COMPLETION_URL)]
    completion_url: String,

    #[arg(long, env = "GEOCHAT_MODEL", global = true, default_value = constants::DEFAULT_MODEL)]
    model: String,
}

impl ServiceArgs {
    fn settings(&self) -> Settings {
        Settings {
            geocoder_url: self.geocoder_url.clone(),
            user_agent: self.user_agent.clone(),
            completion_url: self.completion_url.clone(),
            model: self.model.clone(),
        }
    }
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the Web UI.
    Serve {
        #[arg(long, default_value_t = constants::DEFAULT_PORT, help = "Port for the web server.")]
        port: u16,
    },
    /// Chat in the terminal.
    Chat,
    /// Route a single message and print the reply.
    Ask {
        /// The message, e.g. "Show me Shailer Park".
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,geochat=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("geochat starting with command: {:?}", cli.command);

    let settings = cli.services.settings();
    let router = settings.build_router();

    match cli.command {
        Commands::Serve { port } => {
            info!("Starting Web UI on port {}...", port);
            let mut server = tokio::spawn(web_server::start_web_server(port, router));

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl-C received, shutting down...");
                    server.abort();
                }
                res = &mut server => match res {
                    Ok(Ok(())) => info!("Web server task completed unexpectedly."),
                    Ok(Err(e)) => {
                        error!("Web server failed: {:?}", e);
                        return Err(e);
                    }
                    Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                    Err(e) => error!("Web server task failed: {:?}", e),
                },
            }
            info!("Shutdown complete.");
        }
        Commands::Chat => {
            let credential = match cli.services.api_key {
                Some(key) => key,
                None => chat::prompt_credential().context("Failed to read API key")?,
            };
            let stdin = std::io::stdin();
            chat::run_session(&router, &credential, stdin.lock(), std::io::stdout())
                .await
                .context("Chat session failed")?;
        }
        Commands::Ask { message } => {
            let Some(credential) = cli.services.api_key.filter(|k| !k.is_empty()) else {
                bail!("{} (use --api-key or GROQ_API_KEY)", constants::MISSING_CREDENTIAL_INFO);
            };
            let reply = router.route(&message, &credential).await;
            println!("{}", chat::render_reply(&reply));
        }
    }

    Ok(())
}
