//! Display configuration.

use crate::error::{PinoutError, Result};
use crate::pins::Field;
use regex::{Regex, RegexBuilder};

/// Default live refresh rate in frames per second.
pub const DEFAULT_FPS: u32 = 60;

/// A compiled `--find` pattern.
///
/// A field matches when the pattern matches as a case-insensitive regex, or
/// as a glob where `*` stands for any run of characters.
#[derive(Debug, Clone)]
pub struct Highlight {
    pattern: String,
    regex: Option<Regex>,
    glob: Option<Regex>,
}

impl Highlight {
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let regex = case_insensitive(&pattern);
        let glob = pattern.contains('*').then(|| {
            let translated = pattern
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*");
            case_insensitive(&translated)
        });

        match (regex, glob) {
            (Err(err), None | Some(Err(_))) => Err(PinoutError::InvalidPattern {
                pattern,
                reason: err.to_string(),
            }),
            (regex, glob) => Ok(Self {
                pattern,
                regex: regex.ok(),
                glob: glob.and_then(|glob| glob.ok()),
            }),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.iter().chain(self.glob.iter()).any(|re| re.is_match(text))
    }
}

fn case_insensitive(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Configuration for one invocation of the diagram.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Interface label columns, in the order requested
    pub labels: Vec<Field>,
    /// Show physical pin numbers
    pub show_pins: bool,
    /// Show the GPIO / power / ground column
    pub show_gpio: bool,
    /// Show the six debug columns
    pub show_debug: bool,
    /// Use the light panel theme
    pub light_mode: bool,
    /// Fields to highlight
    pub highlight: Option<Highlight>,
    /// Keep redrawing until interrupted
    pub live: bool,
    /// Poll rate in live mode
    pub fps: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            show_pins: false,
            show_gpio: true,
            show_debug: false,
            light_mode: false,
            highlight: None,
            live: false,
            fps: DEFAULT_FPS,
        }
    }
}

impl DisplayConfig {
    /// Set the interface label columns by name.
    pub fn with_labels<I, S>(mut self, labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.labels = labels
            .into_iter()
            .map(|label| Field::interface(label.as_ref()))
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// Show every interface label column.
    pub fn with_all_labels(mut self) -> Self {
        self.labels = Field::INTERFACES.to_vec();
        self
    }

    pub fn with_pins(mut self, show: bool) -> Self {
        self.show_pins = show;
        self
    }

    pub fn with_gpio(mut self, show: bool) -> Self {
        self.show_gpio = show;
        self
    }

    pub fn with_debug(mut self, show: bool) -> Self {
        self.show_debug = show;
        self
    }

    pub fn with_light_mode(mut self, light: bool) -> Self {
        self.light_mode = light;
        self
    }

    /// Compile and set the highlight pattern.
    pub fn with_highlight(mut self, pattern: Option<&str>) -> Result<Self> {
        self.highlight = pattern.map(Highlight::new).transpose()?;
        Ok(self)
    }

    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Set the live refresh rate, at least one frame per second.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    /// Columns shown for each pin, outermost first as seen on the left side.
    ///
    /// The right side uses the same list in reverse.
    pub fn visible_fields(&self) -> Vec<Field> {
        let mut shown = self.labels.clone();
        if self.show_debug {
            shown.extend(Field::DEBUG);
        }
        shown.reverse();
        if self.show_gpio {
            shown.push(Field::Gpio);
        }
        if self.show_pins {
            shown.push(Field::Pins);
        }
        shown
    }

    /// Whether a field's text matches the highlight pattern.
    pub fn highlights(&self, text: &str) -> bool {
        self.highlight
            .as_ref()
            .is_some_and(|highlight| highlight.is_match(text))
    }
}
