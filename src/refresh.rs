//! The refresh loop: poll pin states, merge them, redraw on change.

use crate::error::Result;
use crate::pins::{apply_states, PinStateSource, PinTable};
use crate::render::{compose, print_frame, DisplayConfig, LiveView, Renderer, Theme};
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How the diagram is kept on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Render once and return
    Static,
    /// Poll every `period`, redrawing on change, until interrupted
    Live { period: Duration },
}

impl RefreshMode {
    pub fn from_config(config: &DisplayConfig) -> Self {
        if config.live {
            RefreshMode::Live {
                period: Duration::from_secs_f64(1.0 / f64::from(config.fps.max(1))),
            }
        } else {
            RefreshMode::Static
        }
    }
}

/// Owns the pin table and the source that feeds it.
pub struct Refresher<S> {
    source: S,
    table: PinTable,
}

impl<S: PinStateSource> Refresher<S> {
    /// Create a refresher over the standard header with empty debug state.
    pub fn new(source: S) -> Self {
        Self::with_table(source, PinTable::raspberry_pi())
    }

    pub fn with_table(source: S, table: PinTable) -> Self {
        Self { source, table }
    }

    pub fn table(&self) -> &PinTable {
        &self.table
    }

    /// Run one cycle and report whether any pin changed.
    ///
    /// On error the table is left exactly as it was.
    pub async fn tick(&mut self) -> Result<bool> {
        let states = self.source.read_states().await?;
        Ok(apply_states(&mut self.table, &states))
    }

    fn render(&self, config: &DisplayConfig, theme: &Theme, renderer: Renderer) -> Vec<String> {
        renderer.render(&compose(&self.table, config, theme))
    }

    /// Draw the diagram according to `config`.
    ///
    /// In live mode this keeps polling until `shutdown` resolves, then draws
    /// one last frame without the exit hint and returns `Ok(())`.
    pub async fn run<W, F>(
        &mut self,
        config: &DisplayConfig,
        theme: &Theme,
        renderer: Renderer,
        mut out: W,
        shutdown: F,
    ) -> Result<()>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        let period = match RefreshMode::from_config(config) {
            RefreshMode::Static => {
                self.tick().await?;
                return print_frame(&mut out, &self.render(config, theme, renderer));
            }
            RefreshMode::Live { period } => period,
        };

        match self.tick().await {
            Ok(_) => {}
            Err(err) if err.is_transient() => warn!("Initial pin state read failed: {}", err),
            Err(err) => return Err(err),
        }

        let mut view = LiveView::new(out)?;
        view.draw(&self.render(config, theme, renderer))?;
        info!("Live view started at {:?} per poll", period);

        tokio::pin!(shutdown);
        loop {
            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                outcome = self.tick() => outcome,
            };

            match outcome {
                Ok(true) => {
                    debug!("Pin state changed, redrawing");
                    view.draw(&self.render(config, theme, renderer))?;
                }
                Ok(false) => {}
                Err(err) => warn!("Skipping refresh: {}", err),
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(period) => {}
            }
        }

        info!("Interrupted, drawing final frame");
        let last = config.clone().with_live(false);
        view.draw(&self.render(&last, theme, renderer))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PinoutError;
    use crate::pins::{parse_all, DebugState, GPIO_COUNT};
    use std::collections::{HashMap, VecDeque};

    fn pinctrl_lines(level: &str) -> Vec<String> {
        (0..GPIO_COUNT)
            .map(|n| format!("{n:>2}: ip    pd | {level} // GPIO{n} = -"))
            .collect()
    }

    /// Replays canned `pinctrl` outputs, repeating the last one forever.
    struct Scripted {
        outputs: VecDeque<Vec<String>>,
        reads: usize,
    }

    impl Scripted {
        fn new(outputs: Vec<Vec<String>>) -> Self {
            Self { outputs: outputs.into(), reads: 0 }
        }
    }

    impl PinStateSource for Scripted {
        async fn read_states(&mut self) -> Result<Vec<DebugState>> {
            self.reads += 1;
            let lines = if self.outputs.len() > 1 {
                self.outputs.pop_front().unwrap_or_default()
            } else {
                self.outputs.front().cloned().unwrap_or_default()
            };
            parse_all(&lines, &HashMap::new(), GPIO_COUNT)
        }
    }

    /// Plays back a fixed sequence of read results, then a steady batch.
    struct Flaky {
        script: VecDeque<Result<Vec<DebugState>>>,
        steady: Vec<DebugState>,
        reads: usize,
    }

    impl Flaky {
        fn new(script: Vec<Result<Vec<DebugState>>>, steady: Vec<DebugState>) -> Self {
            Self { script: script.into(), steady, reads: 0 }
        }
    }

    impl PinStateSource for Flaky {
        async fn read_states(&mut self) -> Result<Vec<DebugState>> {
            self.reads += 1;
            self.script.pop_front().unwrap_or_else(|| Ok(self.steady.clone()))
        }
    }

    fn states(level: &str) -> Vec<DebugState> {
        parse_all(&pinctrl_lines(level), &HashMap::new(), GPIO_COUNT).unwrap()
    }

    #[test]
    fn test_refresh_mode() {
        assert_eq!(RefreshMode::from_config(&DisplayConfig::default()), RefreshMode::Static);
        assert_eq!(
            RefreshMode::from_config(&DisplayConfig::default().with_live(true).with_fps(4)),
            RefreshMode::Live { period: Duration::from_millis(250) }
        );
    }

    #[tokio::test]
    async fn test_identical_ticks_report_no_change() {
        let mut refresher = Refresher::new(Scripted::new(vec![pinctrl_lines("lo")]));
        assert!(refresher.tick().await.unwrap());
        assert!(!refresher.tick().await.unwrap());
    }

    #[tokio::test]
    async fn test_bad_batch_keeps_previous_table() {
        let mut bad = pinctrl_lines("hi");
        bad[1] = " 1: ip    pd | hi // GPIO2 = -".to_string();
        let mut refresher = Refresher::new(Scripted::new(vec![pinctrl_lines("lo"), bad]));

        assert!(refresher.tick().await.unwrap());
        let before = refresher.table().clone();

        let err = refresher.tick().await.unwrap_err();
        assert!(matches!(err, PinoutError::IndexMismatch { .. }));
        assert!(err.is_transient());
        assert_eq!(refresher.table(), &before);
    }

    #[tokio::test]
    async fn test_static_run_prints_once() {
        let mut refresher = Refresher::new(Scripted::new(vec![pinctrl_lines("hi")]));
        let mut out = Vec::new();
        refresher
            .run(
                &DisplayConfig::default().with_debug(true),
                &Theme::default(),
                Renderer::new(false),
                &mut out,
                std::future::pending(),
            )
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(refresher.source.reads, 1);
        assert!(text.contains("GPIO 17"));
        assert!(!text.contains("Ctrl+C"));
    }

    #[tokio::test]
    async fn test_static_run_fails_on_bad_output() {
        let mut refresher = Refresher::new(Scripted::new(vec![vec!["garbage".to_string()]]));
        let result = refresher
            .run(
                &DisplayConfig::default(),
                &Theme::default(),
                Renderer::new(false),
                Vec::new(),
                std::future::pending(),
            )
            .await;
        assert!(matches!(result, Err(PinoutError::LineCount { .. })));
    }

    #[tokio::test]
    async fn test_live_run_redraws_only_on_change() {
        let mut refresher = Refresher::new(Scripted::new(vec![
            pinctrl_lines("lo"),
            pinctrl_lines("lo"),
            pinctrl_lines("hi"),
        ]));
        let config = DisplayConfig::default().with_live(true).with_fps(500);
        let mut out = Vec::new();

        refresher
            .run(
                &config,
                &Theme::default(),
                Renderer::new(false),
                &mut out,
                tokio::time::sleep(Duration::from_millis(100)),
            )
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let clear = "\u{1b}[J";
        // Initial frame, one redraw when the level flips, final frame.
        assert_eq!(text.matches(clear).count(), 3);
        assert!(refresher.source.reads > 3);

        let (live, last) = text.rsplit_once(clear).unwrap();
        assert!(live.contains("Ctrl+C to exit!"));
        assert!(!last.contains("Ctrl+C to exit!"));
        assert!(refresher.table().pin(3).unwrap().debug.is_high());
    }

    #[tokio::test]
    async fn test_live_run_survives_failed_ticks() {
        let mut refresher = Refresher::new(Flaky::new(
            vec![
                Ok(states("lo")),
                Err(PinoutError::malformed_line("garbage")),
                Err(PinoutError::adapter_error("spawn denied")),
            ],
            states("lo"),
        ));
        let config = DisplayConfig::default().with_live(true).with_fps(500);
        let mut out = Vec::new();

        refresher
            .run(
                &config,
                &Theme::default(),
                Renderer::new(false),
                &mut out,
                tokio::time::sleep(Duration::from_millis(100)),
            )
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        // Initial frame and final frame only; failed ticks keep the frame on screen.
        assert_eq!(text.matches("\u{1b}[J").count(), 2);
        assert!(refresher.source.reads > 3);
        assert_eq!(refresher.table().pin(3).unwrap().debug.state, "lo");
    }

    #[tokio::test]
    async fn test_live_run_fails_before_drawing_on_adapter_error() {
        let mut refresher = Refresher::new(Flaky::new(
            vec![Err(PinoutError::adapter_error("spawn denied"))],
            states("lo"),
        ));
        let config = DisplayConfig::default().with_live(true);
        let mut out = Vec::new();

        let result = refresher
            .run(
                &config,
                &Theme::default(),
                Renderer::new(false),
                &mut out,
                std::future::pending(),
            )
            .await;

        assert!(matches!(result, Err(PinoutError::Adapter(_))));
        assert!(out.is_empty());
        assert_eq!(refresher.source.reads, 1);
    }

    #[tokio::test]
    async fn test_live_run_starts_after_transient_first_tick() {
        let mut refresher = Refresher::new(Flaky::new(
            vec![Err(PinoutError::LineCount { expected: GPIO_COUNT, actual: 0 })],
            states("hi"),
        ));
        let config = DisplayConfig::default().with_live(true).with_fps(500);
        let mut out = Vec::new();

        refresher
            .run(
                &config,
                &Theme::default(),
                Renderer::new(false),
                &mut out,
                tokio::time::sleep(Duration::from_millis(50)),
            )
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        // Empty frame, redraw once states arrive, final frame.
        assert_eq!(text.matches("\u{1b}[J").count(), 3);
        assert!(refresher.table().pin(3).unwrap().debug.is_high());
    }
}
