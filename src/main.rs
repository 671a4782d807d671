mod api;
mod cli;
mod commands;
mod credentials;
mod guide;
mod models;
mod prompt;
mod session;

use clap::Parser;
use cli::{Cli, Commands};
use commands::build::BuildArgs;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Auth {
            client_id,
            client_secret,
            hmac_access_id,
            hmac_secret,
        } => commands::auth::run(&client_id, &client_secret, &hmac_access_id, &hmac_secret),
        Commands::Build {
            parent_folder,
            bucket,
            images,
            lookup_attempts,
            lookup_delay_secs,
        } => {
            commands::build::run(BuildArgs {
                parent_folder,
                bucket,
                images,
                lookup_attempts,
                lookup_delay_secs,
            })
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
