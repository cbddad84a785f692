use crate::app_config::AppConfig;
use crate::device::error::CommandRejected;
use crate::device::stream_settings::StreamSettings;
use crate::device::wire::{
    CameraStatus, ControlRangeRequest, ControlRangeResponse, FocusMode, FocusRequest, GainRequest, MessageResponse, StreamSettingsRequest,
};
use crate::domain::ControlName;
use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder, header};
use thiserror::Error;
use tracing::{debug, instrument};

pub fn new_client(config: &AppConfig) -> Result<Client, DeviceClientError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

    let client = Client::builder()
        .default_headers(headers)
        .timeout(config.device().request_timeout())
        .build()?;
    Ok(client)
}

#[derive(Error, Debug)]
pub enum DeviceClientError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
}

/// Typed access to the camera's control API.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    client: Client,
    url: String,
}

impl DeviceClient {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        DeviceClient {
            client,
            url: config.device().url().trim_end_matches('/').to_string(),
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(format!("{}{}", self.url, path))
    }

    #[instrument(skip(self))]
    pub async fn get_control_range(&self, name: ControlName) -> Result<ControlRangeResponse, CommandRejected> {
        let response = self
            .post("/api/camera/get_control_range")
            .json(&ControlRangeRequest { control_name: name.as_str() })
            .send()
            .await?;

        // The device explains unknown controls in the body of a 4xx/5xx response
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<ControlRangeResponse>(&body) {
            Ok(range) => Ok(range),
            Err(_) if !status.is_success() => Err(CommandRejected::Status { status, body }),
            Err(e) => Err(CommandRejected::Decode(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn set_focus(&self, position: f64) -> Result<(), CommandRejected> {
        let request = FocusRequest {
            mode: FocusMode::Manual,
            position,
        };
        send_command(self.post("/api/camera/set_focus").json(&request)).await.map(|_| ())
    }

    #[instrument(skip(self))]
    pub async fn set_gain(&self, gain: f64) -> Result<(), CommandRejected> {
        send_command(self.post("/api/camera/set_gain").json(&GainRequest { gain })).await.map(|_| ())
    }

    #[instrument(skip(self))]
    pub async fn trigger_autofocus(&self) -> Result<String, CommandRejected> {
        let response = send_command(self.post("/api/camera/trigger_af")).await?;
        Ok(response.message.unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn zoom(&self, level: f64) -> Result<(), CommandRejected> {
        send_command(self.post("/api/camera/zoom").query(&[("level", level)])).await.map(|_| ())
    }

    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<(), CommandRejected> {
        send_command(self.post("/api/camera/start")).await.map(|_| ())
    }

    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<(), CommandRejected> {
        send_command(self.post("/api/camera/stop")).await.map(|_| ())
    }

    #[instrument(skip(self))]
    pub async fn status(&self) -> Result<CameraStatus, CommandRejected> {
        let response = self.client.get(format!("{}/api/camera/status", self.url)).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<CameraStatus>().await?)
    }

    #[instrument(skip(self))]
    pub async fn configure_stream(&self, settings: StreamSettings) -> Result<(), CommandRejected> {
        let request = StreamSettingsRequest {
            width: settings.width(),
            height: settings.height(),
            fps: settings.fps(),
        };
        send_command(self.post("/api/camera/set").json(&request)).await.map(|_| ())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CommandRejected> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CommandRejected::Status { status, body })
}

async fn send_command(request: RequestBuilder) -> Result<MessageResponse, CommandRejected> {
    let response = ensure_success(request.send().await?).await?;
    let body = response.text().await?;
    // Some endpoints answer with an empty or non-JSON body
    let message = serde_json::from_str::<MessageResponse>(&body).unwrap_or_default();
    debug!(body = body.trim(), "Device response");

    match message.success {
        Some(false) => Err(CommandRejected::Unsuccessful {
            message: message.message.unwrap_or_else(|| "no message".to_string()),
        }),
        _ => Ok(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn client_for(server: &mockito::Server) -> Result<DeviceClient, DeviceClientError> {
        let config = AppConfigBuilder::new().device_url(server.url()).build();
        Ok(DeviceClient::new(new_client(&config)?, &config))
    }

    #[tokio::test]
    async fn get_control_range_posts_the_control_name() -> Result<(), Box<dyn std::error::Error>> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/camera/get_control_range")
            .match_body(Matcher::Json(json!({ "control_name": "ExposureTime" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(include_str!("../../tests/resources/exposure_range_response.json"))
            .create_async()
            .await;

        let response = client_for(&server).await?.get_control_range(ControlName::ExposureTime).await?;

        mock.assert_async().await;
        assert!(response.success);
        assert_eq!((response.min, response.max, response.current), (Some(100.0), Some(10_000_000.0), Some(500_000.0)));
        Ok(())
    }

    #[tokio::test]
    async fn get_control_range_reads_failure_bodies() -> Result<(), Box<dyn std::error::Error>> {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/camera/get_control_range")
            .with_status(404)
            .with_body(r#"{"success": false, "message": "Control 'LensPosition' not found"}"#)
            .create_async()
            .await;

        let response = client_for(&server).await?.get_control_range(ControlName::LensPosition).await?;

        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Control 'LensPosition' not found"));
        Ok(())
    }

    #[tokio::test]
    async fn set_focus_sends_a_manual_position() -> Result<(), Box<dyn std::error::Error>> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/camera/set_focus")
            .match_body(Matcher::Json(json!({ "mode": "manual", "position": 2.5 })))
            .with_status(200)
            .with_body(r#"{"success": true, "message": "Focus set to manual / 2.500"}"#)
            .create_async()
            .await;

        client_for(&server).await?.set_focus(2.5).await?;

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn zoom_passes_the_level_as_query_parameter() -> Result<(), Box<dyn std::error::Error>> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/camera/zoom")
            .match_query(Matcher::UrlEncoded("level".to_string(), "1.1".to_string()))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        client_for(&server).await?.zoom(1.1).await?;

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/camera/zoom")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let result = client_for(&server).await?.zoom(2.0).await;

        match result {
            Err(CommandRejected::Status { status, body }) => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected a status rejection, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn success_false_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/camera/set_gain")
            .with_status(200)
            .with_body(r#"{"success": false, "message": "Gain must be between 1.0 and 64.0"}"#)
            .create_async()
            .await;

        let result = client_for(&server).await?.set_gain(80.0).await;

        assert!(matches!(result, Err(CommandRejected::Unsuccessful { message }) if message == "Gain must be between 1.0 and 64.0"));
        Ok(())
    }

    #[tokio::test]
    async fn trigger_autofocus_returns_the_device_message() -> Result<(), Box<dyn std::error::Error>> {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/camera/trigger_af")
            .with_status(200)
            .with_body(r#"{"success": true, "message": "Auto focus triggered"}"#)
            .create_async()
            .await;

        let message = client_for(&server).await?.trigger_autofocus().await?;

        assert_eq!(message, "Auto focus triggered");
        Ok(())
    }

    #[tokio::test]
    async fn status_is_deserialized() -> Result<(), Box<dyn std::error::Error>> {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/camera/status")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(include_str!("../../tests/resources/status_response.json"))
            .create_async()
            .await;

        let status = client_for(&server).await?.status().await?;

        assert_eq!(
            status,
            CameraStatus {
                started: true,
                resolution: Some((1152, 648)),
                available: true,
                message: None,
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn configure_stream_posts_the_settings() -> Result<(), Box<dyn std::error::Error>> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/camera/set")
            .match_body(Matcher::Json(json!({ "width": 1280, "height": 720, "fps": 30 })))
            .with_status(200)
            .with_body(r#"{"success": true, "message": "Camera settings updated"}"#)
            .create_async()
            .await;

        client_for(&server).await?.configure_stream(StreamSettings::new(1280, 720, 30)?).await?;

        mock.assert_async().await;
        Ok(())
    }
}
