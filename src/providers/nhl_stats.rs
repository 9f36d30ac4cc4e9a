use super::util::{http_client, with_retry};
use crate::core::stats::{PowerPlayRow, RealtimeRow, StatFeed, SummaryRow};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct ReportResponse<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Skater reports from the NHL stats REST API.
pub struct NhlStatsProvider {
    base_url: String,
    client: reqwest::Client,
}

impl NhlStatsProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }

    fn report_url(&self, report: &str, season: &str) -> String {
        format!(
            "{}/skater/{}?isAggregate=false&isGame=false&start=0&limit=-1&cayenneExp=gameTypeId=2%20and%20seasonId={}",
            self.base_url, report, season
        )
    }

    #[instrument(name = "NhlStatsReport", skip(self), fields(report = %report, season = %season))]
    async fn fetch_report<T: DeserializeOwned>(&self, report: &str, season: &str) -> Result<Vec<T>> {
        let url = self.report_url(report, season);
        debug!("Requesting report from {}", url);

        let response = with_retry(|| async { self.client.get(&url).send().await }, 3, 500)
            .await
            .with_context(|| format!("Failed to request {report} report"))?
            .error_for_status()
            .with_context(|| format!("{report} report returned an error status"))?;

        let body: ReportResponse<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {report} report"))?;
        debug!(rows = body.data.len(), "Received report");
        Ok(body.data)
    }
}

#[async_trait]
impl StatFeed for NhlStatsProvider {
    async fn summary(&self, season: &str) -> Result<Vec<SummaryRow>> {
        self.fetch_report("summary", season).await
    }

    async fn realtime(&self, season: &str) -> Result<Vec<RealtimeRow>> {
        self.fetch_report("realtime", season).await
    }

    async fn powerplay(&self, season: &str) -> Result<Vec<PowerPlayRow>> {
        self.fetch_report("powerplay", season).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEASON: &str = "20252026";

    async fn create_mock_server(report: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/skater/{report}")))
            .and(query_param("cayenneExp", "gameTypeId=2 and seasonId=20252026"))
            .and(query_param("limit", "-1"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_fetch_summary() {
        let body = r#"{
            "data": [
                {"playerId": 8478402, "skaterFullName": "Connor McDavid", "teamAbbrevs": "EDM",
                 "positionCode": "C", "gamesPlayed": 20, "goals": 9, "assists": 21, "points": 30,
                 "plusMinus": 6, "shootsCatches": "L"},
                {"playerId": 8480069, "skaterFullName": "Cale Makar", "teamAbbrevs": "COL",
                 "positionCode": "D", "gamesPlayed": 19, "goals": 5, "assists": 15, "points": 20,
                 "plusMinus": 11}
            ],
            "total": 2
        }"#;
        let server = create_mock_server("summary", 200, body).await;
        let provider = NhlStatsProvider::new(&server.uri()).unwrap();

        let rows = provider.summary(SEASON).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player_id, 8478402);
        assert_eq!(rows[0].skater_full_name, "Connor McDavid");
        assert_eq!(rows[0].points, 30);
        assert_eq!(rows[1].position_code, "D");
        assert_eq!(rows[1].plus_minus, 11);
    }

    #[tokio::test]
    async fn test_fetch_realtime_and_powerplay() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/skater/realtime"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data": [{"playerId": 1, "blockedShots": 12, "takeaways": 4, "giveaways": 9}]}"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/skater/powerplay"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"data": [{"playerId": 1, "ppPoints": 7}]}"#),
            )
            .mount(&server)
            .await;
        let provider = NhlStatsProvider::new(&server.uri()).unwrap();

        let realtime = provider.realtime(SEASON).await.unwrap();
        assert_eq!(realtime[0].blocked_shots, 12);
        assert_eq!(realtime[0].giveaways, 9);

        let powerplay = provider.powerplay(SEASON).await.unwrap();
        assert_eq!(powerplay[0].pp_points, 7);
    }

    #[tokio::test]
    async fn test_error_status_is_an_error() {
        let server = create_mock_server("summary", 503, "unavailable").await;
        let provider = NhlStatsProvider::new(&server.uri()).unwrap();
        assert!(provider.summary(SEASON).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_data_array_is_empty() {
        let server = create_mock_server("summary", 200, r#"{"total": 0}"#).await;
        let provider = NhlStatsProvider::new(&server.uri()).unwrap();
        assert!(provider.summary(SEASON).await.unwrap().is_empty());
    }
}
