use crate::device::{CommandRejected, DeviceClient};
use crate::domain::{ControlName, ControlRange, InvalidRange};
use futures::future::join_all;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Fetches a control's range from the device and rescales it into UI units.
#[derive(Debug, Clone)]
pub struct ControlRangeLoader {
    client: DeviceClient,
}

impl ControlRangeLoader {
    pub fn new(client: DeviceClient) -> Self {
        ControlRangeLoader { client }
    }

    /// Issues exactly one request. Nothing is retried.
    #[instrument(skip(self), fields(control = %control_name))]
    pub async fn load(&self, control_name: ControlName) -> Result<ControlRange, LoadError> {
        info!("🎚️ Loading control range '{}'...", control_name);

        let result = self.fetch(control_name).await.map_err(|cause| LoadError { control_name, cause });
        match &result {
            Ok(range) => info!("🎚️ Loading control range '{}'... OK, {}", control_name, range),
            Err(e) => warn!("⚠️ Loading control range '{}'... failed, {}", control_name, e.cause),
        }

        result
    }

    /// Loads every known control concurrently, one request each.
    pub async fn load_all(&self) -> Vec<Result<ControlRange, LoadError>> {
        join_all(ControlName::ALL.into_iter().map(|name| self.load(name))).await
    }

    async fn fetch(&self, control_name: ControlName) -> Result<ControlRange, LoadCause> {
        let response = self.client.get_control_range(control_name).await?;

        if !response.success {
            return Err(LoadCause::Unsuccessful {
                message: response.message.unwrap_or_else(|| "no message".to_string()),
            });
        }

        match (response.min, response.max, response.current) {
            (Some(min), Some(max), Some(current)) => Ok(ControlRange::from_hardware(control_name, min, max, current)?),
            _ => Err(LoadCause::Incomplete),
        }
    }
}

#[derive(Error, Debug)]
#[error("could not load control range for '{control_name}': {cause}")]
pub struct LoadError {
    pub control_name: ControlName,
    #[source]
    pub cause: LoadCause,
}

#[derive(Error, Debug)]
pub enum LoadCause {
    #[error(transparent)]
    Request(#[from] CommandRejected),
    #[error("device reported failure: {message}")]
    Unsuccessful { message: String },
    #[error("response is missing min, max or current")]
    Incomplete,
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use crate::device::new_client;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_log::test;

    fn loader_for(server: &mockito::Server) -> ControlRangeLoader {
        let config = AppConfigBuilder::new().device_url(server.url()).build();
        let client = new_client(&config).expect("client");
        ControlRangeLoader::new(DeviceClient::new(client, &config))
    }

    #[test(tokio::test)]
    async fn load_converts_exposure_into_milliseconds() -> Result<(), LoadError> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/camera/get_control_range")
            .match_body(Matcher::Json(json!({ "control_name": "ExposureTime" })))
            .with_status(200)
            .with_body(include_str!("../tests/resources/exposure_range_response.json"))
            .expect(1)
            .create_async()
            .await;

        let range = loader_for(&server).load(ControlName::ExposureTime).await?;

        mock.assert_async().await;
        assert_eq!(range.name(), ControlName::ExposureTime);
        assert_eq!((range.display_min(), range.display_max(), range.display_current()), (0.0, 5000.0, 500.0));
        Ok(())
    }

    #[test(tokio::test)]
    async fn load_reports_unsuccessful_responses() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/camera/get_control_range")
            .with_status(503)
            .with_body(r#"{"success": false, "message": "Camera not available"}"#)
            .create_async()
            .await;

        let error = loader_for(&server).load(ControlName::AnalogueGain).await.unwrap_err();

        assert_eq!(error.control_name, ControlName::AnalogueGain);
        assert!(matches!(error.cause, LoadCause::Unsuccessful { message } if message == "Camera not available"));
    }

    #[test(tokio::test)]
    async fn load_reports_transport_failures() {
        let config = AppConfigBuilder::new().device_url("http://127.0.0.1:1".to_string()).build();
        let loader = ControlRangeLoader::new(DeviceClient::new(new_client(&config).expect("client"), &config));

        let error = loader.load(ControlName::LensPosition).await.unwrap_err();

        assert!(matches!(error.cause, LoadCause::Request(CommandRejected::Transport(_))));
    }

    #[test(tokio::test)]
    async fn load_rejects_inconsistent_ranges() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/camera/get_control_range")
            .with_status(200)
            .with_body(r#"{"success": true, "min": 10.0, "max": 1.0, "current": 5.0}"#)
            .create_async()
            .await;

        let error = loader_for(&server).load(ControlName::LensPosition).await.unwrap_err();

        assert!(matches!(error.cause, LoadCause::InvalidRange(_)));
    }

    #[test(tokio::test)]
    async fn load_all_keeps_failures_independent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/camera/get_control_range")
            .match_body(Matcher::Json(json!({ "control_name": "LensPosition" })))
            .with_status(200)
            .with_body(include_str!("../tests/resources/lens_position_range_response.json"))
            .create_async()
            .await;
        server
            .mock("POST", "/api/camera/get_control_range")
            .match_body(Matcher::Json(json!({ "control_name": "ExposureTime" })))
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;
        server
            .mock("POST", "/api/camera/get_control_range")
            .match_body(Matcher::Json(json!({ "control_name": "AnalogueGain" })))
            .with_status(200)
            .with_body(include_str!("../tests/resources/gain_range_response.json"))
            .create_async()
            .await;

        let results = loader_for(&server).load_all().await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(&results[1], Err(LoadError { control_name: ControlName::ExposureTime, .. })));
        assert_eq!(results[2].as_ref().map(|range| range.display_current()).ok(), Some(200.0));
    }
}
