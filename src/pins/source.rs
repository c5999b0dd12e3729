//! Pin state collection from the `pinctrl` tool and the GPIO controller.

use crate::error::{PinoutError, Result};
use crate::pins::device::{locate_controllable_device, open_device, ControllableDevice};
use crate::pins::parser::{parse_all, unknown_states};
use crate::pins::topology::{DebugState, GPIO_COUNT};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Candidate GPIO controllers, in priority order.
pub const DEVICE_CANDIDATES: [&str; 2] = ["/dev/gpiochip4", "/dev/gpiochip0"];

/// Default pin query program.
pub const QUERY_PROGRAM: &str = "pinctrl";

/// Configuration for [`PinctrlSource`].
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Program invoked as `<program> get 0-<n>`
    pub program: String,
    /// Number of GPIO lines to query
    pub line_count: usize,
    /// Controllers probed for consumer names
    pub device_candidates: Vec<PathBuf>,
    /// Upper bound on a single query, unbounded when `None`
    pub query_timeout: Option<Duration>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            program: QUERY_PROGRAM.to_string(),
            line_count: GPIO_COUNT,
            device_candidates: DEVICE_CANDIDATES.iter().map(PathBuf::from).collect(),
            query_timeout: None,
        }
    }
}

impl SourceConfig {
    /// Set the query program.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the query timeout.
    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Set the device candidates.
    pub fn with_device_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.device_candidates = candidates;
        self
    }
}

/// Trait for anything that can produce one batch of pin states per cycle.
pub trait PinStateSource {
    /// Read the debug state of every GPIO line, indexed by GPIO number.
    ///
    /// A missing query tool is not an error: every line is reported as
    /// unknown instead.
    fn read_states(&mut self) -> impl std::future::Future<Output = Result<Vec<DebugState>>> + Send;
}

/// Pin states from `pinctrl get`, with consumers from the GPIO controller.
pub struct PinctrlSource {
    config: SourceConfig,
    device: Option<Box<dyn ControllableDevice>>,
}

impl PinctrlSource {
    /// Probe for a GPIO controller and create the source.
    pub fn new(config: SourceConfig) -> Self {
        let device = match locate_controllable_device(&config.device_candidates) {
            Some(path) => open_device(&path),
            None => {
                warn!("No GPIO character device found, consumer names will be empty");
                None
            }
        };
        Self::with_device(config, device)
    }

    /// Create a source around an already opened controller.
    pub fn with_device(config: SourceConfig, device: Option<Box<dyn ControllableDevice>>) -> Self {
        if let Some(device) = &device {
            debug!("Reading line consumers via {}", device.backend());
        }
        Self { config, device }
    }

    /// Run the query tool and return its output lines.
    pub async fn query_raw_pin_text(&self) -> Result<Vec<String>> {
        let range = format!("0-{}", self.config.line_count.saturating_sub(1));
        let mut command = Command::new(&self.config.program);
        command
            .arg("get")
            .arg(&range)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = match self.config.query_timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    PinoutError::adapter_error(format!(
                        "{} did not finish within {:?}",
                        self.config.program, limit
                    ))
                })?,
            None => command.output().await,
        };

        let output = output.map_err(|e| match e.kind() {
            ErrorKind::NotFound => PinoutError::ToolUnavailable(self.config.program.clone()),
            _ => PinoutError::adapter_error(format!(
                "Failed to run {}: {}",
                self.config.program, e
            )),
        })?;

        if !output.status.success() {
            warn!("{} exited with {}", self.config.program, output.status);
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| PinoutError::malformed_line(String::from_utf8_lossy(e.as_bytes())))?;
        Ok(text.lines().map(str::to_string).collect())
    }

    /// Map GPIO index to consumer name for lines below the GPIO count.
    pub fn list_line_consumers(&self) -> Result<HashMap<usize, String>> {
        let Some(device) = &self.device else {
            return Ok(HashMap::new());
        };
        Ok(device
            .enumerate_lines()?
            .into_iter()
            .filter(|line| line.offset < self.config.line_count)
            .map(|line| (line.offset, line.consumer))
            .collect())
    }
}

impl PinStateSource for PinctrlSource {
    async fn read_states(&mut self) -> Result<Vec<DebugState>> {
        let consumers = self.list_line_consumers().unwrap_or_else(|err| {
            warn!("Failed to list line consumers: {}", err);
            HashMap::new()
        });

        match self.query_raw_pin_text().await {
            Ok(lines) => parse_all(&lines, &consumers, self.config.line_count),
            Err(PinoutError::ToolUnavailable(program)) => {
                debug!("{} not found, reporting unknown pin states", program);
                Ok(unknown_states(self.config.line_count))
            }
            Err(err) => Err(err),
        }
    }
}
