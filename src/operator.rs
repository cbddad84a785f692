use crate::console::CameraConsole;
use crate::device::{SettingsError, StreamSettings};
use crate::domain::control_range::UnknownControl;
use crate::domain::units::to_display_gain;
use crate::domain::ControlName;
use crate::headless_surface::HeadlessSurface;
use crate::zoom::{FeedbackIndicator, FeedbackKind, FeedbackPhase};
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

// Typical wheel notch
const SCROLL_DELTA: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub enum OperatorCommand {
    Scroll(f64),
    Focus(f64),
    /// Analog gain in hardware units, e.g. 2.5
    Gain(f64),
    Autofocus,
    Wake,
    Sleep,
    Status,
    Reload(ControlName),
    Stream(StreamSettings),
    Ranges,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{0}' expects an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
    #[error(transparent)]
    UnknownControl(#[from] UnknownControl),
    #[error(transparent)]
    InvalidSettings(#[from] SettingsError),
}

impl FromStr for OperatorCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().ok_or(ParseCommandError::Empty)?;

        match command.to_ascii_lowercase().as_str() {
            "scroll" => match words.next() {
                Some("up") => Ok(OperatorCommand::Scroll(-SCROLL_DELTA)),
                Some("down") => Ok(OperatorCommand::Scroll(SCROLL_DELTA)),
                Some(other) => Err(ParseCommandError::Unknown(format!("scroll {other}"))),
                None => Err(ParseCommandError::MissingArgument("scroll")),
            },
            "focus" => Ok(OperatorCommand::Focus(finite(words.next(), "focus")?)),
            "gain" => Ok(OperatorCommand::Gain(finite(words.next(), "gain")?)),
            "af" => Ok(OperatorCommand::Autofocus),
            "wake" => Ok(OperatorCommand::Wake),
            "sleep" => Ok(OperatorCommand::Sleep),
            "status" => Ok(OperatorCommand::Status),
            "reload" => {
                let name = words.next().ok_or(ParseCommandError::MissingArgument("reload"))?;
                Ok(OperatorCommand::Reload(name.parse()?))
            }
            "stream" => {
                let width = number(words.next(), "stream")?;
                let height = number(words.next(), "stream")?;
                let fps = number(words.next(), "stream")?;
                Ok(OperatorCommand::Stream(StreamSettings::new(width, height, fps)?))
            }
            "ranges" => Ok(OperatorCommand::Ranges),
            "quit" | "exit" => Ok(OperatorCommand::Quit),
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}

fn number<T: FromStr>(word: Option<&str>, command: &'static str) -> Result<T, ParseCommandError> {
    let word = word.ok_or(ParseCommandError::MissingArgument(command))?;
    word.parse().map_err(|_| ParseCommandError::InvalidNumber(word.to_string()))
}

// `f64` parses "NaN" and "inf", neither is a control value
fn finite(word: Option<&str>, command: &'static str) -> Result<f64, ParseCommandError> {
    let value: f64 = number(word, command)?;
    if !value.is_finite() {
        return Err(ParseCommandError::InvalidNumber(word.unwrap_or_default().to_string()));
    }
    Ok(value)
}

/// Logs every toast the indicator shows until the indicator is gone.
pub fn report_feedback(feedback: &FeedbackIndicator) -> JoinHandle<()> {
    let mut toasts = feedback.subscribe();
    tokio::spawn(async move {
        while toasts.changed().await.is_ok() {
            let Some(toast) = toasts.borrow_and_update().clone() else {
                continue;
            };
            if toast.phase() != FeedbackPhase::Visible {
                continue;
            }

            match toast.kind() {
                FeedbackKind::Zoom(_) => info!("💬 {}", toast.text()),
                FeedbackKind::Error => warn!("💬 {}", toast.text()),
            }
        }
    })
}

/// Reads operator commands line by line until `quit` or end of input.
#[instrument(skip_all)]
pub async fn run<R>(console: &mut CameraConsole, surface: &HeadlessSurface, input: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<OperatorCommand>() {
            Ok(OperatorCommand::Quit) => break,
            Ok(command) => execute(console, surface, command).await,
            Err(e) => warn!("⚠️ {}", e),
        }
    }

    info!("👋 Operator session ended");
    Ok(())
}

async fn execute(console: &mut CameraConsole, surface: &HeadlessSurface, command: OperatorCommand) {
    match command {
        OperatorCommand::Scroll(delta_y) => {
            let disposition = surface.scroll(delta_y);
            info!(?disposition, "🔍 Zoom level {:.1}", console.zoom().level());
        }
        OperatorCommand::Focus(position) => {
            console.set_focus(position);
        }
        OperatorCommand::Gain(gain) => {
            console.set_gain(to_display_gain(gain));
        }
        OperatorCommand::Autofocus => {
            // Failures are logged by the console
            let _ = console.trigger_autofocus().await;
        }
        OperatorCommand::Wake => {
            console.wake();
        }
        OperatorCommand::Sleep => {
            console.sleep();
        }
        OperatorCommand::Status => {
            match console.status().await {
                Ok(status) => info!(
                    started = status.started,
                    available = status.available,
                    resolution = ?status.resolution,
                    message = ?status.message,
                    "📷 Camera is {:?}",
                    console.power_state()
                ),
                Err(e) => warn!("⚠️ Unable to read camera status: {}", e),
            }

            info!(listening = console.zoom_listeners_attached(), "🔍 Zoom level {:.1}", console.zoom().level());
            for control in [console.focus(), console.gain()].into_iter().flatten() {
                let snapshot = control.snapshot();
                info!(status = ?snapshot.status, confirmed = snapshot.confirmed, "🎚️ {} is {}", control.name(), snapshot.value);
            }
        }
        OperatorCommand::Reload(name) => {
            // Failures are logged by the loader and leave the control as it was
            if console.reload(name).await.is_err() {
                if let Some(range) = console.range(name) {
                    info!("🎚️ Keeping {}", range);
                }
            }
        }
        OperatorCommand::Stream(settings) => match console.configure_stream(settings).await {
            Ok(()) => info!("📷 Stream set to {}x{} @ {} fps", settings.width(), settings.height(), settings.fps()),
            Err(e) => warn!("⚠️ Unable to configure the stream: {}", e),
        },
        OperatorCommand::Ranges => {
            for range in console.ranges() {
                info!("🎚️ {}", range);
            }
        }
        OperatorCommand::Quit => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use crate::device::{DeviceClient, new_client};
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::Arc;
    use std::time::Duration;

    #[rstest]
    #[case("scroll up", OperatorCommand::Scroll(-100.0))]
    #[case("scroll down", OperatorCommand::Scroll(100.0))]
    #[case("focus 2.5", OperatorCommand::Focus(2.5))]
    #[case("GAIN 4", OperatorCommand::Gain(4.0))]
    #[case("af", OperatorCommand::Autofocus)]
    #[case("  wake  ", OperatorCommand::Wake)]
    #[case("reload ExposureTime", OperatorCommand::Reload(ControlName::ExposureTime))]
    #[case("stream 1280 720 30", OperatorCommand::Stream(StreamSettings::new(1280, 720, 30).unwrap()))]
    #[case("exit", OperatorCommand::Quit)]
    fn parses_commands(#[case] input: &str, #[case] expected: OperatorCommand) {
        assert_eq!(input.parse::<OperatorCommand>(), Ok(expected));
    }

    #[rstest]
    #[case("", ParseCommandError::Empty)]
    #[case("focus", ParseCommandError::MissingArgument("focus"))]
    #[case("focus near", ParseCommandError::InvalidNumber("near".to_string()))]
    #[case("focus NaN", ParseCommandError::InvalidNumber("NaN".to_string()))]
    #[case("gain inf", ParseCommandError::InvalidNumber("inf".to_string()))]
    #[case("gain -infinity", ParseCommandError::InvalidNumber("-infinity".to_string()))]
    #[case("scroll sideways", ParseCommandError::Unknown("scroll sideways".to_string()))]
    #[case("reload Brightness", ParseCommandError::UnknownControl(UnknownControl("Brightness".to_string())))]
    #[case("stream 1280 720 120", ParseCommandError::InvalidSettings(SettingsError::FpsTooHigh(120)))]
    #[case("reboot", ParseCommandError::Unknown("reboot".to_string()))]
    fn rejects_invalid_commands(#[case] input: &str, #[case] expected: ParseCommandError) {
        assert_eq!(input.parse::<OperatorCommand>(), Err(expected));
    }

    #[test_log::test(tokio::test)]
    async fn run_executes_commands_until_quit() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/camera/zoom")
            .match_query(Matcher::UrlEncoded("level".to_string(), "1.1".to_string()))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let config = AppConfigBuilder::new().device_url(server.url()).build();
        let client = DeviceClient::new(new_client(&config).expect("client"), &config);
        let surface = Arc::new(HeadlessSurface::new());
        let mut console = CameraConsole::new(&config, client, surface.clone());
        let attached = console.start().await.expect("attachment").await.unwrap();
        assert!(attached);

        run(&mut console, &surface, "scroll up\nbogus\nquit\nscroll up\n".as_bytes()).await.unwrap();

        assert_eq!(console.zoom().level(), 1.1);
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn feedback_reporting_ends_with_the_indicator() {
        let feedback = FeedbackIndicator::new(Duration::from_millis(2000), Duration::from_millis(300));
        let reporter = report_feedback(&feedback);

        feedback.show(FeedbackKind::Zoom(1.1));
        feedback.show(FeedbackKind::Error);
        drop(feedback);

        tokio::time::timeout(Duration::from_secs(5), reporter).await.expect("reporter ends").unwrap();
    }
}
