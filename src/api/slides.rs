use anyhow::{Context, Result, bail};

use crate::api::DeckEditor;
use crate::api::client::GoogleClient;
use crate::models::slides::{BatchUpdateRequest, BatchUpdateResponse, Presentation, Request};

const SLIDES_URL: &str = "https://slides.googleapis.com/v1/presentations";

impl DeckEditor for GoogleClient {
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation> {
        let url = format!("{}/{}", SLIDES_URL, presentation_id);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("fields", "slides.objectId")])
            .send()
            .await
            .with_context(|| format!("Failed to fetch presentation {}", presentation_id))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "Failed to fetch presentation {} (HTTP {}): {}",
                presentation_id,
                status,
                body
            );
        }

        resp.json()
            .await
            .context("Failed to parse presentation response")
    }

    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: &[Request],
    ) -> Result<BatchUpdateResponse> {
        let url = format!("{}/{}:batchUpdate", SLIDES_URL, presentation_id);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&BatchUpdateRequest { requests })
            .send()
            .await
            .with_context(|| format!("Failed to update presentation {}", presentation_id))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "Failed to update presentation {} (HTTP {}): {}",
                presentation_id,
                status,
                body
            );
        }

        resp.json()
            .await
            .context("Failed to parse batch update response")
    }
}
