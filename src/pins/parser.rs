//! Parser for `pinctrl get` output.
//!
//! Each line has the fixed shape
//! `<index>: <mode> <drive> <pull> | <level> // [prefix/]GPIO<index> = <name>`,
//! for example `  2: ip -- pu | hi // GPIO2 = -`.

use crate::error::{PinoutError, Result};
use crate::pins::topology::{DebugState, UNKNOWN};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

lazy_static! {
    static ref PINCTRL_LINE: Regex = Regex::new(
        r"^\s?(\d+): (a\d|\?\?|ip|op|gp|no) (dl|dh|--|  ) (pn|pd|pu|--) \| (lo|hi|--) // (?:\w+/)?GPIO(\d+) = (\w+|-)$"
    )
    .expect("pinctrl grammar is a valid regex");
    static ref ALT_MODE: Regex = Regex::new(r"^a\d").expect("alt mode pattern is a valid regex");
}

/// One parsed line of query output, with codes exactly as printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLineRecord {
    pub index: usize,
    pub mode: String,
    pub drive: String,
    pub pull: String,
    pub level: String,
    /// GPIO number named in the `// GPIOn` trailer
    pub reference: usize,
    /// Name after `=`, `None` when printed as `-`
    pub alt_name: Option<String>,
}

impl RawLineRecord {
    /// Apply display normalization and attach the line's consumer.
    pub fn into_debug_state(self, consumer: &str) -> DebugState {
        let alt_func = if ALT_MODE.is_match(&self.mode) {
            self.alt_name.unwrap_or_else(|| "-".to_string())
        } else {
            String::new()
        };
        DebugState {
            consumer: consumer.to_string(),
            alt_func,
            mode: normalize(self.mode, "no"),
            drive: normalize(self.drive, "  "),
            pull: normalize(self.pull, "pn"),
            state: self.level,
        }
    }
}

fn normalize(code: String, blank: &str) -> String {
    if code == blank {
        UNKNOWN.to_string()
    } else {
        code
    }
}

impl fmt::Display for RawLineRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>2}: {} {} {} | {} // GPIO{} = {}",
            self.index,
            self.mode,
            self.drive,
            self.pull,
            self.level,
            self.reference,
            self.alt_name.as_deref().unwrap_or("-")
        )
    }
}

/// Parse a single line, checking that both GPIO indices agree.
///
/// Leading spaces are treated as index padding.
pub fn parse_line(text: &str) -> Result<RawLineRecord> {
    let caps = PINCTRL_LINE
        .captures(text.trim_start_matches(' '))
        .ok_or_else(|| PinoutError::malformed_line(text))?;

    let number = |group: usize| -> Result<usize> {
        caps[group]
            .parse()
            .map_err(|_| PinoutError::malformed_line(text))
    };
    let index = number(1)?;
    let reference = number(6)?;
    if index != reference {
        return Err(PinoutError::IndexMismatch {
            expected: index,
            found: reference,
        });
    }

    let alt_name = match &caps[7] {
        "-" => None,
        name => Some(name.to_string()),
    };

    Ok(RawLineRecord {
        index,
        mode: caps[2].to_string(),
        drive: caps[3].to_string(),
        pull: caps[4].to_string(),
        level: caps[5].to_string(),
        reference,
        alt_name,
    })
}

/// Parse a whole batch into states indexed by GPIO number.
///
/// Line `n` must describe GPIO `n` and exactly `line_count` lines must be
/// present. Any failure rejects the entire batch.
pub fn parse_all<S: AsRef<str>>(
    lines: &[S],
    consumers: &HashMap<usize, String>,
    line_count: usize,
) -> Result<Vec<DebugState>> {
    if lines.len() != line_count {
        return Err(PinoutError::LineCount {
            expected: line_count,
            actual: lines.len(),
        });
    }

    lines
        .iter()
        .enumerate()
        .map(|(position, line)| {
            let record = parse_line(line.as_ref())?;
            if record.index != position {
                return Err(PinoutError::IndexMismatch {
                    expected: position,
                    found: record.index,
                });
            }
            let consumer = consumers.get(&position).map(String::as_str).unwrap_or("");
            Ok(record.into_debug_state(consumer))
        })
        .collect()
}

/// States used for every line when the query tool is unavailable.
pub fn unknown_states(line_count: usize) -> Vec<DebugState> {
    vec![DebugState::unknown(); line_count]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_line() {
        let record = parse_line("  2: ip -- pu | hi // GPIO2 = -").unwrap();
        assert_eq!(record.index, 2);
        assert_eq!(record.reference, 2);
        assert_eq!(record.alt_name, None);

        let state = record.into_debug_state("");
        assert_eq!(
            state,
            DebugState {
                consumer: String::new(),
                alt_func: String::new(),
                mode: "ip".into(),
                drive: "--".into(),
                pull: "pu".into(),
                state: "hi".into(),
            }
        );
    }

    #[test]
    fn test_parse_alt_function() {
        let record = parse_line(" 14: a4    pn | hi // GPIO14 = TXD0").unwrap();
        assert_eq!(record.drive, "  ");
        let state = record.into_debug_state("");
        assert_eq!(state.mode, "a4");
        assert_eq!(state.alt_func, "TXD0");
        assert_eq!(state.drive, "--");
        assert_eq!(state.pull, "--");
    }

    #[test]
    fn test_alt_name_ignored_outside_alt_mode() {
        let record = parse_line("17: op dh pd | hi // GPIO17 = output").unwrap();
        let state = record.into_debug_state("gpio-led");
        assert_eq!(state.alt_func, "");
        assert_eq!(state.consumer, "gpio-led");
        assert_eq!(state.drive, "dh");
    }

    #[test]
    fn test_parse_prefixed_reference() {
        let record = parse_line("27: no    pd | -- // PIN27/GPIO27 = none").unwrap();
        let state = record.into_debug_state("");
        assert_eq!(state.mode, "--");
        assert_eq!(state.state, "--");
    }

    #[test]
    fn test_rejects_malformed_lines() {
        for line in [
            "",
            "2: xx -- pu | hi // GPIO2 = -",
            "2: ip -- pu | hi // GPIO2",
            "2:  ip -- pu | hi // GPIO2 = -",
            "2: ip -- pu | hi //  GPIO2 = -",
            "\t\t2: ip -- pu | hi // GPIO2 = -",
            "\n 2: ip -- pu | hi // GPIO2 = -",
            "2: ip -- pu | mid // GPIO2 = -",
            "2: ip -- pu | hi // GPIO2 = - trailing",
        ] {
            assert!(
                matches!(parse_line(line), Err(PinoutError::MalformedLine { .. })),
                "expected {line:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_index_mismatch() {
        let err = parse_line("1: ip -- pu | hi // GPIO2 = -").unwrap_err();
        assert!(matches!(
            err,
            PinoutError::IndexMismatch { expected: 1, found: 2 }
        ));
    }

    #[test]
    fn test_display_reproduces_grammar() {
        for line in [
            " 0: a0    pu | hi // GPIO0 = SDA0",
            " 9: ip    pd | lo // GPIO9 = -",
            "21: op dl pn | -- // PIN40/GPIO21 = output",
        ] {
            let record = parse_line(line).unwrap();
            let reparsed = parse_line(&record.to_string()).unwrap();
            assert_eq!(reparsed.index, record.index);
            assert_eq!(reparsed.mode, record.mode);
            assert_eq!(reparsed.drive, record.drive);
            assert_eq!(reparsed.pull, record.pull);
            assert_eq!(reparsed.level, record.level);
        }
    }

    #[test]
    fn test_parse_all_orders_and_attaches_consumers() {
        let lines: Vec<String> = (0..3)
            .map(|n| format!("{n:>2}: ip    pu | hi // GPIO{n} = -"))
            .collect();
        let consumers = HashMap::from([(1, "spi0 CS0".to_string())]);

        let states = parse_all(&lines, &consumers, 3).unwrap();
        assert_eq!(states.len(), 3);
        assert_eq!(states[0].consumer, "");
        assert_eq!(states[1].consumer, "spi0 CS0");
    }

    #[test]
    fn test_parse_all_is_all_or_nothing() {
        let lines = [
            " 0: ip    pu | hi // GPIO0 = -",
            " 2: ip    pu | hi // GPIO2 = -",
        ];
        let err = parse_all(&lines, &HashMap::new(), 2).unwrap_err();
        assert!(matches!(err, PinoutError::IndexMismatch { expected: 1, found: 2 }));

        let err = parse_all(&lines[..1], &HashMap::new(), 2).unwrap_err();
        assert!(matches!(err, PinoutError::LineCount { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_unknown_states() {
        let states = unknown_states(28);
        assert_eq!(states.len(), 28);
        assert!(states.iter().all(|state| *state == DebugState::unknown()));
    }
}
