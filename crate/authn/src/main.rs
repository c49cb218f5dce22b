use std::path::PathBuf;

use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tessera_authn::{
    AResult, AuthnError, TokenAuthenticator,
    config::{ClapConfig, TESSERA_CONF, TokenAuthParams},
};
use tessera_logger::log_init;
use tracing::debug;

/// Administration of the Tessera signing keys and bearer tokens
#[derive(Parser, Debug)]
#[command(name = "tessera", version, about)]
struct Cli {
    /// A TOML configuration file. When set, it replaces the command line settings
    #[arg(long, env = TESSERA_CONF)]
    config: Option<PathBuf>,

    #[clap(flatten)]
    clap_config: ClapConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Issue a token for a principal
    Issue {
        principal: String,
        /// Override the configured token lifetime, in seconds
        #[arg(long, allow_negative_numbers = true)]
        lifetime: Option<i64>,
    },
    /// Verify a token and print its subject
    Verify { token: String },
    /// Print the header and claims of a token without verifying it
    Inspect { token: String },
    /// Rotate the signing key
    Renew,
    /// Revoke every signing key; all issued tokens become invalid
    Revoke,
    /// Print the keystore settings
    Info,
}

fn main() -> AResult<()> {
    // Load variables from a .env file
    dotenv().ok();

    let cli = Cli::parse();
    let clap_config = match &cli.config {
        Some(path) => ClapConfig::load_from_file(path)?,
        None => cli.clap_config.clone(),
    };
    log_init(clap_config.logging.rust_log.as_deref());
    debug!("configuration: {clap_config:#?}");

    let params = TokenAuthParams::try_from(&clap_config.token_auth)?;
    let authenticator = TokenAuthenticator::init(&params)?;
    run(&authenticator, cli.command)
}

fn run(authenticator: &TokenAuthenticator, command: Command) -> AResult<()> {
    match command {
        Command::Issue {
            principal,
            lifetime,
        } => {
            if let Some(seconds) = lifetime {
                let lifetime = TimeDelta::try_seconds(seconds).ok_or_else(|| {
                    AuthnError::InvalidRequest(format!("lifetime out of range: {seconds}"))
                })?;
                authenticator.set_token_lifetime(lifetime);
            }
            let token = authenticator.generate_token(&principal)?;
            println!("{}", token.data());
            println!("valid before: {}", token.metadata().valid_before.to_rfc3339());
        }
        Command::Verify { token } => {
            let principal = authenticator.verify(&token)?;
            println!("{principal}");
        }
        Command::Inspect { token } => {
            let parsed = authenticator.parse_token(&token)?;
            let view = serde_json::json!({
                "header": parsed.header(),
                "claims": parsed.claims(),
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Renew => {
            let key_id = authenticator.renew_signing_key()?;
            println!("current signing key: {key_id}");
        }
        Command::Revoke => {
            authenticator.revoke_signing_keys()?;
            println!("all signing keys revoked");
        }
        Command::Info => {
            println!("signature algorithm: {}", authenticator.signature_algorithm());
            println!("symmetric: {}", authenticator.uses_symmetric_algorithm());
            println!("keystore: {}", authenticator.keystore_type());
            if let Some(path) = authenticator.keystore_file_path() {
                println!("key file: {}", path.display());
            }
            println!(
                "keys: {}/{}",
                authenticator.current_key_list_size()?,
                authenticator.max_in_memory_keys()
            );
            println!(
                "token lifetime: {}s",
                authenticator.token_lifetime().num_seconds()
            );
        }
    }
    Ok(())
}
