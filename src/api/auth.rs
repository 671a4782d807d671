//! OAuth for an installed application: refresh a cached token, or run the
//! browser consent flow once against a loopback redirect.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::credentials::{self, Credentials};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/presentations",
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/devstorage.write_only",
];

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

/// Return an access token, running the consent flow if no refresh token is cached.
pub async fn authorize(creds: &Credentials) -> Result<String> {
    let http = Client::builder()
        .timeout(Duration::from_secs(300))
        .build()
        .context("Failed to create HTTP client")?;

    if let Some(refresh_token) = creds.refresh_token.as_deref() {
        log::debug!("Refreshing cached OAuth token");
        match refresh(&http, creds, refresh_token).await {
            Ok(token) => return Ok(token),
            Err(e) => log::warn!("Cached token refresh failed, re-authorizing: {:#}", e),
        }
    }

    consent(&http, creds).await
}

async fn refresh(http: &Client, creds: &Credentials, refresh_token: &str) -> Result<String> {
    let resp = http
        .post(TOKEN_URL)
        .form(&[
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await
        .context("Failed to reach Google for token refresh")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("Token refresh failed (HTTP {}): {}", status, body);
    }

    let token: TokenResponse = resp
        .json()
        .await
        .context("Failed to parse token refresh response")?;

    Ok(token.access_token)
}

async fn consent(http: &Client, creds: &Credentials) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind loopback listener for OAuth redirect")?;
    let port = listener
        .local_addr()
        .context("Failed to read loopback address")?
        .port();
    let redirect_uri = format!("http://127.0.0.1:{}", port);
    let state = format!("{:016x}", rand::random::<u64>());

    let url = consent_url(&creds.client_id, &redirect_uri, &state)?;
    println!("Open this URL in your browser to authorize access:\n\n  {}\n", url);

    let code = wait_for_code(&listener, &state).await?;

    let resp = http
        .post(TOKEN_URL)
        .form(&[
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .context("Failed to reach Google for code exchange")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("Authorization code exchange failed (HTTP {}): {}", status, body);
    }

    let token: TokenResponse = resp
        .json()
        .await
        .context("Failed to parse code exchange response")?;

    match token.refresh_token.as_deref() {
        Some(refresh_token) => credentials::store_refresh_token(refresh_token)?,
        None => log::warn!("No refresh token issued; consent will be asked again next run"),
    }

    Ok(token.access_token)
}

fn consent_url(client_id: &str, redirect_uri: &str, state: &str) -> Result<Url> {
    let scope = SCOPES.join(" ");
    Url::parse_with_params(
        AUTH_URL,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .context("Failed to build consent URL")
}

const REDIRECT_OK: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\nAuthorization complete. You can close this tab.\r\n";
const REDIRECT_FAILED: &[u8] = b"HTTP/1.1 400 Bad Request\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\nAuthorization failed. Check the terminal.\r\n";
const NOT_FOUND: &[u8] =
    b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

/// Accept loopback connections until one carries the code (or a denial).
///
/// Preconnects that send nothing and unrelated requests such as
/// `/favicon.ico` are answered and skipped.
async fn wait_for_code(listener: &TcpListener, state: &str) -> Result<String> {
    loop {
        let (stream, _) = listener
            .accept()
            .await
            .context("Failed to accept OAuth redirect")?;

        let mut reader = BufReader::new(stream);
        let request_line = match read_request_head(&mut reader).await {
            Ok(line) => line,
            Err(e) => {
                log::debug!("Dropping loopback connection: {}", e);
                continue;
            }
        };
        if request_line.trim().is_empty() {
            log::debug!("Ignoring empty loopback connection");
            continue;
        }

        let mut stream = reader.into_inner();
        match parse_redirect(&request_line, state) {
            Ok(Some(code)) => {
                stream.write_all(REDIRECT_OK).await.ok();
                return Ok(code);
            }
            Ok(None) => {
                log::debug!("Ignoring loopback request: {}", request_line.trim());
                stream.write_all(NOT_FOUND).await.ok();
            }
            Err(e) => {
                stream.write_all(REDIRECT_FAILED).await.ok();
                return Err(e);
            }
        }
    }
}

/// Read the request line, then drain headers up to the blank line.
async fn read_request_head(reader: &mut BufReader<TcpStream>) -> Result<String> {
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Ok(request_line);
    }

    let mut header = String::new();
    for _ in 0..100 {
        header.clear();
        let n = reader.read_line(&mut header).await?;
        if n == 0 || header.trim().is_empty() {
            break;
        }
    }
    Ok(request_line)
}

/// Pull the authorization code out of a redirect request line.
///
/// `None` means the request is not the redirect we are waiting for.
fn parse_redirect(request_line: &str, expected_state: &str) -> Result<Option<String>> {
    let Some(target) = request_line.split_whitespace().nth(1) else {
        return Ok(None);
    };
    let Ok(url) = Url::parse(&format!("http://127.0.0.1{}", target)) else {
        return Ok(None);
    };

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => bail!("Authorization was denied: {}", value),
            _ => {}
        }
    }

    if code.is_some() && state.as_deref() != Some(expected_state) {
        log::warn!("OAuth state mismatch; ignoring redirect");
        return Ok(None);
    }
    Ok(code)
}
