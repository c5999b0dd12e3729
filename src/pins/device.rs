//! GPIO controller handles used to look up line consumers.
//!
//! Two back-ends expose the same [`ControllableDevice`] interface: the GPIO
//! character device ioctls (with the `gpio` feature) and the kernel debugfs
//! listing. [`open_device`] probes them once and the rest of the crate only
//! sees the trait object.

use crate::error::{PinoutError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Location of the kernel's textual GPIO listing.
pub const DEBUGFS_GPIO: &str = "/sys/kernel/debug/gpio";

/// A line exposed by a GPIO controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInfo {
    pub offset: usize,
    /// Empty when the line is unclaimed
    pub consumer: String,
}

/// A GPIO controller whose lines can be enumerated.
pub trait ControllableDevice: Send + Sync {
    /// Short name of the back-end, for logging.
    fn backend(&self) -> &'static str;

    /// List every line on the controller with its current consumer.
    fn enumerate_lines(&self) -> Result<Vec<LineInfo>>;
}

/// Return the first candidate path that is a character device.
pub fn locate_controllable_device<P: AsRef<Path>>(candidates: &[P]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|path| is_char_device(path))
        .map(Path::to_path_buf)
}

#[cfg(unix)]
fn is_char_device(path: &Path) -> bool {
    use std::os::unix::fs::FileTypeExt;
    fs::metadata(path)
        .map(|meta| meta.file_type().is_char_device())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_char_device(_path: &Path) -> bool {
    false
}

/// Open a controller, picking the first back-end that works on this system.
///
/// Returns `None` when no back-end can read the device; consumer names then
/// stay empty.
pub fn open_device(path: &Path) -> Option<Box<dyn ControllableDevice>> {
    #[cfg(feature = "gpio")]
    {
        match cdev::CdevChip::open(path) {
            Ok(chip) => {
                debug!("Using GPIO character device interface for {}", path.display());
                return Some(Box::new(chip));
            }
            Err(err) => debug!("Character device interface unavailable: {}", err),
        }
    }

    match DebugfsChip::open(path, DEBUGFS_GPIO) {
        Ok(chip) => {
            debug!("Using debugfs GPIO listing for {}", path.display());
            Some(Box::new(chip))
        }
        Err(err) => {
            warn!(
                "Cannot read line consumers for {}, continuing without them: {}",
                path.display(),
                err
            );
            None
        }
    }
}

#[cfg(feature = "gpio")]
mod cdev {
    use super::*;
    use gpio_cdev::Chip;

    /// Controller accessed through the GPIO character device ioctls.
    pub struct CdevChip {
        chip: Chip,
    }

    impl CdevChip {
        pub fn open(path: &Path) -> Result<Self> {
            let chip = Chip::new(path).map_err(|e| {
                PinoutError::device_error(format!("Failed to open {}: {}", path.display(), e))
            })?;
            Ok(Self { chip })
        }
    }

    impl ControllableDevice for CdevChip {
        fn backend(&self) -> &'static str {
            "cdev"
        }

        fn enumerate_lines(&self) -> Result<Vec<LineInfo>> {
            self.chip
                .lines()
                .map(|line| {
                    let info = line.info().map_err(|e| {
                        PinoutError::device_error(format!(
                            "Failed to read line {}: {}",
                            line.offset(),
                            e
                        ))
                    })?;
                    Ok(LineInfo {
                        offset: line.offset() as usize,
                        consumer: info.consumer().unwrap_or_default().to_string(),
                    })
                })
                .collect()
        }
    }
}

lazy_static! {
    static ref CHIP_HEADER: Regex =
        Regex::new(r"^(gpiochip\d+): GPIOs (\d+)-\d+").expect("chip header pattern is a valid regex");
    static ref LINE_ENTRY: Regex = Regex::new(r"^\s*gpio-(\d+)\s+\(([^|)]*)(?:\|([^)]*))?\)")
        .expect("line entry pattern is a valid regex");
}

/// Controller read from the debugfs text listing.
pub struct DebugfsChip {
    chip_name: String,
    listing: PathBuf,
}

impl DebugfsChip {
    pub fn open(device: &Path, listing: impl Into<PathBuf>) -> Result<Self> {
        // Compatibility nodes such as /dev/gpiochip4 may link to the real chip.
        let resolved = fs::canonicalize(device).unwrap_or_else(|_| device.to_path_buf());
        let chip_name = resolved
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                PinoutError::device_error(format!("Not a GPIO chip path: {}", device.display()))
            })?
            .to_string();
        let listing = listing.into();

        // Probe now so a missing or unreadable listing disqualifies this back-end.
        let text = fs::read_to_string(&listing)?;
        if !text
            .lines()
            .filter_map(|line| CHIP_HEADER.captures(line))
            .any(|caps| caps[1] == chip_name)
        {
            return Err(PinoutError::device_error(format!(
                "{} is not listed in {}",
                chip_name,
                listing.display()
            )));
        }

        Ok(Self { chip_name, listing })
    }
}

impl ControllableDevice for DebugfsChip {
    fn backend(&self) -> &'static str {
        "debugfs"
    }

    fn enumerate_lines(&self) -> Result<Vec<LineInfo>> {
        let text = fs::read_to_string(&self.listing)?;
        Ok(parse_debugfs_listing(&text, &self.chip_name))
    }
}

/// Extract the lines of one chip from a debugfs GPIO listing.
///
/// Offsets are relative to the chip's base GPIO number.
pub fn parse_debugfs_listing(text: &str, chip_name: &str) -> Vec<LineInfo> {
    let mut base = None;
    let mut lines = Vec::new();

    for line in text.lines() {
        if let Some(caps) = CHIP_HEADER.captures(line) {
            base = (&caps[1] == chip_name)
                .then(|| caps[2].parse::<usize>().ok())
                .flatten();
            continue;
        }
        let Some(base) = base else { continue };
        let Some(caps) = LINE_ENTRY.captures(line) else { continue };
        let Ok(number) = caps[1].parse::<usize>() else { continue };
        let Some(offset) = number.checked_sub(base) else { continue };

        lines.push(LineInfo {
            offset,
            consumer: caps
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default(),
        });
    }

    lines
}
