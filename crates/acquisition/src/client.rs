//! Tile source contract and the process-API HTTP client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use mosaic_common::{BoundingBox, TimeSlot};

use crate::credentials::ProviderCredentials;
use crate::error::{AcquisitionError, AcquisitionResult};

/// Approximate meters per degree of latitude on the WGS84 ellipsoid.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// One tile acquisition: a sub-box of the grid for one time window.
#[derive(Debug, Clone)]
pub struct TileRequest {
    pub bbox: BoundingBox,
    pub slot: TimeSlot,
    /// Processing recipe identifier understood by the provider.
    pub recipe: String,
    /// Ground resolution in meters per pixel.
    pub resolution: f64,
}

/// The remote acquisition service, at its interface.
///
/// A fetched tile file carries bands+1 layers; the last layer is the 0/1
/// availability mask.
#[async_trait]
pub trait TileSource: Send + Sync {
    async fn fetch_tile(&self, request: &TileRequest, dest: &Path) -> AcquisitionResult<()>;
}

/// Pixel grid dimensions for a bounding box at a fixed ground resolution.
///
/// Longitude spans shrink with the cosine of latitude; both dimensions are
/// rounded to the nearest pixel, at least 1.
pub fn pixel_dimensions(bbox: &BoundingBox, resolution: f64) -> (usize, usize) {
    let mid_lat = (bbox.min_lat + bbox.max_lat) / 2.0;
    let width_m = bbox.width() * METERS_PER_DEGREE * mid_lat.to_radians().cos();
    let height_m = bbox.height() * METERS_PER_DEGREE;
    (
        (width_m / resolution).round().max(1.0) as usize,
        (height_m / resolution).round().max(1.0) as usize,
    )
}

/// HTTP client for the provider's process API.
///
/// Authenticates with OAuth2 client credentials; the bearer token is cached
/// and refreshed once on a 401.
pub struct ProcessApiClient {
    http: Client,
    api_url: String,
    credentials: ProviderCredentials,
    token: Mutex<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ProcessApiClient {
    pub fn new(
        api_url: impl Into<String>,
        credentials: ProviderCredentials,
    ) -> AcquisitionResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(600))
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            credentials,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> AcquisitionResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let response = self
            .http
            .post(format!("{}/oauth/token", self.api_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AcquisitionError::Auth(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        *cached = Some(token.access_token.clone());
        debug!("obtained new access token");
        Ok(token.access_token)
    }

    async fn invalidate_token(&self) {
        self.token.lock().await.take();
    }
}

/// The JSON process request for one tile.
fn request_body(request: &TileRequest) -> serde_json::Value {
    let (width, height) = pixel_dimensions(&request.bbox, request.resolution);
    let bbox = &request.bbox;
    serde_json::json!({
        "input": {
            "bounds": {
                "bbox": [bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat],
                "crs": "EPSG:4326",
            },
            "data": [{
                "recipe": request.recipe,
                "timeRange": {
                    "from": format!("{}T00:00:00Z", request.slot.start),
                    "to": format!("{}T00:00:00Z", request.slot.end),
                },
            }],
        },
        "output": {
            "width": width,
            "height": height,
            "format": "image/tiff",
        },
    })
}

#[async_trait]
impl TileSource for ProcessApiClient {
    #[instrument(skip(self, request), fields(recipe = %request.recipe, slot = %request.slot))]
    async fn fetch_tile(&self, request: &TileRequest, dest: &Path) -> AcquisitionResult<()> {
        let body = request_body(request);

        let mut token = self.access_token().await?;
        let mut response = self
            .http
            .post(format!("{}/process", self.api_url))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        // Expired token: refresh once and replay.
        if response.status() == StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
            token = self.access_token().await?;
            response = self
                .http
                .post(format!("{}/process", self.api_url))
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AcquisitionError::TileStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        debug!(path = %dest.display(), bytes = bytes.len(), "tile written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_pixel_dimensions_at_equator() {
        let bbox = BoundingBox::new(0.0, -0.05, 0.1, 0.05);
        let (width, height) = pixel_dimensions(&bbox, 10.0);
        // 0.1 degrees is about 11132 m at the equator
        assert_eq!(height, 1113);
        assert_eq!(width, 1113);
    }

    #[test]
    fn test_pixel_dimensions_never_zero() {
        let bbox = BoundingBox::new(0.0, 0.0, 1e-6, 1e-6);
        let (width, height) = pixel_dimensions(&bbox, 10.0);
        assert_eq!((width, height), (1, 1));
    }

    #[test]
    fn test_request_body_fields() {
        let slot = TimeSlot::new(
            NaiveDate::from_ymd_opt(2020, 10, 5).unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 7).unwrap(),
        )
        .unwrap();
        let request = TileRequest {
            bbox: BoundingBox::new(46.00, -16.15, 46.05, -16.01),
            slot,
            recipe: "optical-l1c".to_string(),
            resolution: 10.0,
        };

        let body = request_body(&request);
        assert_eq!(body["input"]["bounds"]["crs"], "EPSG:4326");
        assert_eq!(body["input"]["data"][0]["recipe"], "optical-l1c");
        assert_eq!(
            body["input"]["data"][0]["timeRange"]["from"],
            "2020-10-05T00:00:00Z"
        );
        assert_eq!(body["output"]["format"], "image/tiff");
    }
}
