use anyhow::{Context, Result};
use std::env;

const SERVICE: &str = "guide-builder";

pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub hmac_access_id: String,
    pub hmac_secret: String,
    pub refresh_token: Option<String>,
}

fn set_entry(key: &str, value: &str) -> Result<()> {
    keyring::Entry::new(SERVICE, key)
        .with_context(|| format!("Failed to create keyring entry for {}", key))?
        .set_password(value)
        .with_context(|| format!("Failed to store {} in keyring", key))
}

fn get_entry(key: &str) -> Result<Option<String>> {
    let entry = keyring::Entry::new(SERVICE, key).context("Failed to access keyring")?;
    match entry.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {} from keyring", key)),
    }
}

pub fn store_credentials(
    client_id: &str,
    client_secret: &str,
    hmac_access_id: &str,
    hmac_secret: &str,
) -> Result<()> {
    set_entry("client_id", client_id)?;
    set_entry("client_secret", client_secret)?;
    set_entry("hmac_access_id", hmac_access_id)?;
    set_entry("hmac_secret", hmac_secret)?;
    Ok(())
}

/// Cache the refresh token issued by the consent flow.
pub fn store_refresh_token(refresh_token: &str) -> Result<()> {
    set_entry("refresh_token", refresh_token)
}

pub fn load_credentials() -> Result<Credentials> {
    let refresh_token = match env::var("GOOGLE_REFRESH_TOKEN") {
        Ok(token) => Some(token),
        Err(_) => get_entry("refresh_token")?,
    };

    // Try environment variables first (for CI)
    if let (Ok(client_id), Ok(client_secret), Ok(hmac_access_id), Ok(hmac_secret)) = (
        env::var("GOOGLE_CLIENT_ID"),
        env::var("GOOGLE_CLIENT_SECRET"),
        env::var("GCS_HMAC_ACCESS_ID"),
        env::var("GCS_HMAC_SECRET"),
    ) {
        return Ok(Credentials {
            client_id,
            client_secret,
            hmac_access_id,
            hmac_secret,
            refresh_token,
        });
    }

    // Fall back to keyring
    let client_id = get_entry("client_id")?.context(
        "No credentials found. Run `guide-builder auth` first or set GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET, GCS_HMAC_ACCESS_ID, GCS_HMAC_SECRET environment variables.",
    )?;
    let client_secret = get_entry("client_secret")?.context("client_secret not found in keyring")?;
    let hmac_access_id =
        get_entry("hmac_access_id")?.context("hmac_access_id not found in keyring")?;
    let hmac_secret = get_entry("hmac_secret")?.context("hmac_secret not found in keyring")?;

    Ok(Credentials {
        client_id,
        client_secret,
        hmac_access_id,
        hmac_secret,
        refresh_token,
    })
}
