use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "logocreator", version, about = "AI logo generation gateway")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP gateway.
    Serve(ServeOpts),
    Config(ConfigOpts),
    /// List the image models clients may select.
    Models,
    /// Print the prompt a request would produce, without calling the provider.
    Prompt(PromptOpts),
    Version,
}

#[derive(clap::Args)]
pub struct ServeOpts {
    #[arg(short, long)]
    pub config: Option<String>,
    #[arg(short, long, env = "LOGOCREATOR_PORT")]
    pub port: Option<u16>,
    /// loopback, lan or custom
    #[arg(short, long, env = "LOGOCREATOR_BIND")]
    pub bind: Option<String>,
}

#[derive(clap::Args)]
pub struct ConfigOpts {
    #[arg(short, long)]
    pub config: Option<String>,
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Validate,
    Init,
}

#[derive(clap::Args)]
pub struct PromptOpts {
    #[arg(long)]
    pub company: String,
    #[arg(short, long, default_value = "Minimal")]
    pub style: String,
    #[arg(short, long, default_value = "Blue")]
    pub primary: String,
    #[arg(long, default_value = "White")]
    pub background: String,
    #[arg(short, long)]
    pub model: Option<String>,
    #[arg(long)]
    pub info: Option<String>,
}

impl PromptOpts {
    pub fn into_raw(self) -> crate::logo::RawGenerationRequest {
        crate::logo::RawGenerationRequest {
            user_api_key: None,
            company_name: self.company,
            selected_style: self.style,
            selected_model: self.model,
            selected_primary_color: self.primary,
            selected_background_color: self.background,
            additional_info: self.info,
            reference_image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn prompt_defaults() {
        let cli = Cli::try_parse_from(["logocreator", "prompt", "--company", "Acme"]).unwrap();
        let Commands::Prompt(opts) = cli.command else {
            panic!("expected prompt command");
        };
        let raw = opts.into_raw();
        assert_eq!(raw.company_name, "Acme");
        assert_eq!(raw.selected_style, "Minimal");
        assert_eq!(raw.selected_primary_color, "Blue");
        assert_eq!(raw.selected_background_color, "White");
        assert!(raw.selected_model.is_none());
    }
}
