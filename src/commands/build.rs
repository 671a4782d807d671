use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::api::auth;
use crate::api::client::GoogleClient;
use crate::api::storage::{StorageClient, UrlSigner};
use crate::credentials;
use crate::guide::{self, GuideOptions};
use crate::prompt::TerminalPrompter;
use crate::session::{LookupPolicy, Session};

pub struct BuildArgs {
    pub parent_folder: String,
    pub bucket: String,
    pub images: Option<PathBuf>,
    pub lookup_attempts: u32,
    pub lookup_delay_secs: u64,
}

pub async fn run(args: BuildArgs) -> Result<()> {
    // 1. Load credentials
    let creds = credentials::load_credentials()?;

    // 2. Authorize
    println!("Authorizing...");
    let token = auth::authorize(&creds).await?;
    println!("Authorized.");

    let client = GoogleClient::new(&token)?;
    let storage = StorageClient::new(
        client.clone(),
        &args.bucket,
        UrlSigner {
            access_id: creds.hmac_access_id.clone(),
            secret: creds.hmac_secret.clone(),
        },
    );
    let lookup = LookupPolicy {
        attempts: args.lookup_attempts,
        delay: Duration::from_secs(args.lookup_delay_secs),
    };
    let mut session = Session::new(client.clone(), client, storage, lookup);

    // 3. Build
    let options = GuideOptions {
        parent_folder: args.parent_folder,
        images: args.images,
    };
    let summary = guide::build_guide(&mut session, &mut TerminalPrompter, &options).await?;

    println!(
        "Guide '{}': presentation {} ({} pages) in folder {}.",
        summary.name, summary.presentation_id, summary.pages, summary.folder_id
    );

    Ok(())
}
