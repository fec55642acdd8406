use clap::Parser;
use logocreator::cli::{Cli, Commands, ConfigAction};
use logocreator::config::{validate_config, validate_config_object, Config};
use logocreator::gateway::GatewayServer;
use logocreator::logging;
use logocreator::logo::{self, models};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(opts) => {
            info!("Starting logocreator gateway");
            let config = Config::load(opts.config.as_deref())?;
            validate_config_object(&config)?;
            let server = GatewayServer::start(config, opts).await?;
            server.run_until_shutdown().await?;
        }
        Commands::Config(opts) => match opts.action {
            ConfigAction::Show => {
                let config = Config::load(opts.config.as_deref())?;
                println!("{}", serde_json::to_string_pretty(&config.redacted())?);
            }
            ConfigAction::Validate => {
                let config = Config::load(opts.config.as_deref())?;
                let errors = validate_config(&config);
                if errors.is_empty() {
                    info!("Configuration is valid");
                } else {
                    for e in &errors {
                        error!("{}", e);
                    }
                    anyhow::bail!("{} configuration error(s)", errors.len());
                }
            }
            ConfigAction::Init => {
                let path = opts.config.as_deref().unwrap_or("logocreator.json");
                if std::path::Path::new(path).exists() {
                    anyhow::bail!("Refusing to overwrite existing {}", path);
                }
                Config::write_default(path)?;
                info!("Configuration file created at {}", path);
            }
        },
        Commands::Models => {
            for model in models::all() {
                let reference = if model.requires_reference_image {
                    " (reference image)"
                } else {
                    ""
                };
                println!(
                    "{:<45} {:<20} {}{}",
                    model.model_id, model.organization, model.name, reference
                );
            }
        }
        Commands::Prompt(opts) => {
            let request = logo::validate(opts.into_raw())?;
            println!("{}", logo::compose(&request));
        }
        Commands::Version => {
            println!("logocreator {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
