use super::util::{http_client, with_retry};
use crate::core::career::{DetailLookup, PlayerDetail};
use crate::core::stats::PlayerId;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, error, instrument};

/// Player landing pages from the NHL web API.
pub struct NhlPlayerProvider {
    base_url: String,
    client: reqwest::Client,
}

impl NhlPlayerProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }
}

#[async_trait]
impl DetailLookup for NhlPlayerProvider {
    #[instrument(name = "NhlPlayerLanding", skip(self), fields(player_id = %player_id))]
    async fn fetch_detail(&self, player_id: PlayerId) -> Result<PlayerDetail> {
        let url = format!("{}/player/{}/landing", self.base_url, player_id);
        debug!("Requesting player landing from {}", url);

        let response = with_retry(|| async { self.client.get(&url).send().await }, 3, 500)
            .await
            .with_context(|| format!("Failed to send request for player: {player_id}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Landing request for player {} returned {}",
                player_id,
                response.status()
            ));
        }

        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for player: {player_id}"))?;

        match serde_json::from_str::<PlayerDetail>(&response_text) {
            Ok(detail) => Ok(detail),
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse player landing response"
                );
                Err(e).context("Failed to parse player landing response")
            }
        }
    }
}
