use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "guide-builder")]
#[command(about = "Build a slide-deck guide on Google Drive from a folder of images")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store Google OAuth client and Cloud Storage HMAC credentials
    Auth {
        /// OAuth client ID of the installed application
        #[arg(long)]
        client_id: String,

        /// OAuth client secret of the installed application
        #[arg(long)]
        client_secret: String,

        /// Cloud Storage HMAC access ID used to sign image URLs
        #[arg(long)]
        hmac_access_id: String,

        /// Cloud Storage HMAC secret
        #[arg(long)]
        hmac_secret: String,
    },

    /// Create a guide folder and presentation and fill it from local images
    Build {
        /// Drive folder the guide folder is created in
        #[arg(long, env = "GUIDE_PARENT_FOLDER", default_value = "Stream_Guides")]
        parent_folder: String,

        /// Bucket used to stage images while backgrounds are set
        #[arg(long, env = "GUIDE_BUCKET", default_value = "mbpimages")]
        bucket: String,

        /// Directory of slide images (prompted for when omitted)
        #[arg(long, env = "GUIDE_IMAGES")]
        images: Option<PathBuf>,

        /// How many times to list Drive before giving up on a folder name
        #[arg(long, env = "GUIDE_LOOKUP_ATTEMPTS", default_value_t = 5)]
        lookup_attempts: u32,

        /// Pause between lookup attempts, in seconds
        #[arg(long, env = "GUIDE_LOOKUP_DELAY_SECS", default_value_t = 2)]
        lookup_delay_secs: u64,
    },
}
