//! HTTP client for the clustering service.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use catalog::{FilterState, HistoricalEvent};
use chrono::NaiveDate;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::cluster::{AnnotatedCluster, Cluster, DEFAULT_RADIUS_SCALE};
use crate::error::ClientError;
use crate::protocol::{ClusterEnvelope, ClusterQuery, EventsPayload};

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const CLUSTERS_PATH: &str = "clusters/hierarchical";
pub const POINT_LOOKUP_PATH: &str = "events/lat-lon-date";

/// Source of cluster data for the interaction controller.
///
/// Methods return boxed futures for dyn-compatibility, so tests and offline
/// tools can swap in their own source.
pub trait ClusterSource: Send + Sync {
    /// Clusters for `filter`, annotated against `filter.viewport`.
    fn fetch(&self, filter: &FilterState)
    -> BoxFuture<'_, Result<Vec<AnnotatedCluster>, ClientError>>;

    /// Events at (or near) a coordinate on a given date.
    fn events_at(
        &self,
        lat: f64,
        lon: f64,
        date: NaiveDate,
    ) -> BoxFuture<'_, Result<Vec<HistoricalEvent>, ClientError>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:5000/api`.
    pub base_url: String,
    pub timeout: Duration,
    pub radius_scale: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout: Duration::from_secs(10),
            radius_scale: DEFAULT_RADIUS_SCALE,
        }
    }
}

pub struct ClusterClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ClusterClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Init)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn read_json<T: DeserializeOwned>(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }
        let bytes = resp.bytes().await.map_err(|e| ClientError::Network {
            endpoint: endpoint.to_string(),
            source: e,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Malformed {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    async fn fetch_clusters(
        &self,
        filter: FilterState,
    ) -> Result<Vec<AnnotatedCluster>, ClientError> {
        let endpoint = self.endpoint(CLUSTERS_PATH);
        let query = ClusterQuery::from_filter(&filter);
        debug!(%endpoint, max_level = query.max_level, "requesting clusters");

        let resp = self
            .http
            .post(&endpoint)
            .json(&query)
            .send()
            .await
            .map_err(|e| ClientError::Network {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        let envelope: ClusterEnvelope = Self::read_json(&endpoint, resp).await?;
        if let Some(status) = envelope.status.as_deref()
            && status != "success"
        {
            warn!(%endpoint, status, "cluster response carried a non-success status");
            return Err(ClientError::Malformed {
                endpoint,
                reason: format!("service reported status {status:?}"),
            });
        }

        let clusters = envelope
            .data
            .into_iter()
            .map(|raw| {
                let cluster = Cluster::from_raw(raw).map_err(|reason| ClientError::Malformed {
                    endpoint: endpoint.clone(),
                    reason,
                })?;
                Ok(AnnotatedCluster {
                    geometry: cluster.geometry(&query.viewport, self.config.radius_scale),
                    cluster,
                })
            })
            .collect::<Result<Vec<_>, ClientError>>()?;
        debug!(%endpoint, clusters = clusters.len(), "clusters received");
        Ok(clusters)
    }

    async fn fetch_events_at(
        &self,
        lat: f64,
        lon: f64,
        date: NaiveDate,
    ) -> Result<Vec<HistoricalEvent>, ClientError> {
        let endpoint = self.endpoint(POINT_LOOKUP_PATH);
        let url = Url::parse_with_params(
            &endpoint,
            [
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("date", date.format("%Y-%m-%d").to_string()),
            ],
        )
        .map_err(|e| ClientError::Malformed {
            endpoint: endpoint.clone(),
            reason: format!("invalid endpoint url: {e}"),
        })?;
        debug!(%url, "point lookup");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Network {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        let payload: EventsPayload = Self::read_json(&endpoint, resp).await?;
        payload
            .into_raw()
            .into_iter()
            .map(|raw| {
                raw.into_event().map_err(|reason| ClientError::Malformed {
                    endpoint: endpoint.clone(),
                    reason,
                })
            })
            .collect()
    }
}

impl ClusterSource for ClusterClient {
    fn fetch(
        &self,
        filter: &FilterState,
    ) -> BoxFuture<'_, Result<Vec<AnnotatedCluster>, ClientError>> {
        let filter = filter.clone();
        Box::pin(self.fetch_clusters(filter))
    }

    fn events_at(
        &self,
        lat: f64,
        lon: f64,
        date: NaiveDate,
    ) -> BoxFuture<'_, Result<Vec<HistoricalEvent>, ClientError>> {
        Box::pin(self.fetch_events_at(lat, lon, date))
    }
}
