use anyhow::Result;

use crate::credentials;

pub fn run(
    client_id: &str,
    client_secret: &str,
    hmac_access_id: &str,
    hmac_secret: &str,
) -> Result<()> {
    credentials::store_credentials(client_id, client_secret, hmac_access_id, hmac_secret)?;
    println!("Credentials stored successfully.");
    Ok(())
}
