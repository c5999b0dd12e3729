//! Pinout Pi - Raspberry Pi GPIO Header Diagram Binary
//!
//! Prints the 40-pin header, optionally with live pin state, to the terminal.

use anyhow::Context;
use clap::Parser;
use pinout_pi::{
    DisplayConfig, Field, PinctrlSource, Refresher, Renderer, SourceConfig, Theme, DEFAULT_FPS,
};
use std::io::{self, IsTerminal};
use tracing::{error, info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const EXAMPLES: &str = "\
Examples:
  pinout_pi i2c                       show GPIO and I2C labels
  pinout_pi                           basic GPIO pinout
  pinout_pi --all --find \"I2C1\"       highlight any \"I2C1\" labels
  pinout_pi --all --find \"SPI* SCLK\"  highlight any SPI clock pins
  pinout_pi --debug --live            watch pin state change

web:   https://pinout.xyz";

#[derive(Parser)]
#[command(name = "pinout_pi")]
#[command(about = "🥧 Pinout Pi - GPIO pinout and pin function guide for the Raspberry Pi")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Austin Couch")]
#[command(after_help = EXAMPLES)]
struct Cli {
    /// Interface labels to show: i2c, spi
    #[arg(value_name = "INTERFACE", value_parser = Field::interface)]
    interfaces: Vec<Field>,

    /// Show physical pin numbers
    #[arg(long)]
    pins: bool,

    /// Show every interface label
    #[arg(long, conflicts_with = "interfaces")]
    all: bool,

    /// Hide the GPIO column
    #[arg(long)]
    hide_gpio: bool,

    /// Show GPIO mode, drive, pull, level and consumer
    #[arg(long)]
    debug: bool,

    /// Light theme
    #[arg(long)]
    light: bool,

    /// Keep redrawing as pin state changes, until Ctrl+C
    #[arg(long)]
    live: bool,

    /// Highlight pins matching TEXT (case-insensitive regex, `*` works as a wildcard)
    #[arg(long, value_name = "TEXT")]
    find: Option<String>,

    /// Live mode polls per second
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Print the pin table as JSON and exit
    #[arg(long, conflicts_with = "live")]
    json: bool,

    /// Disable colours even on a terminal
    #[arg(long)]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    log_debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = parse_cli();

    // Initialize tracing/logging
    init_logging(&cli)?;

    let config = build_config(&cli)?;
    let mut refresher = Refresher::new(PinctrlSource::new(SourceConfig::default()));

    if cli.json {
        return json_command(&mut refresher).await;
    }

    let renderer = Renderer::new(!cli.no_color && io::stdout().is_terminal());
    info!(
        "Rendering {} diagram",
        if config.live { "live" } else { "static" }
    );

    refresher
        .run(&config, &Theme::default(), renderer, io::stdout(), shutdown_signal())
        .await
        .context("Failed to render pinout")?;

    Ok(())
}

/// Parse arguments; usage errors exit 1, `--help`/`--version` exit 0.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.log_debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    // Logs go to stderr so they never tear the diagram on stdout.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<DisplayConfig> {
    let mut config =
        DisplayConfig::default().with_labels(cli.interfaces.iter().map(|field| field.name()))?;
    if cli.all {
        config = config.with_all_labels();
    }

    let config = config
        .with_pins(cli.pins)
        .with_gpio(!cli.hide_gpio)
        .with_debug(cli.debug)
        .with_light_mode(cli.light)
        .with_live(cli.live)
        .with_fps(cli.fps)
        .with_highlight(cli.find.as_deref())?;

    Ok(config)
}

async fn json_command(refresher: &mut Refresher<PinctrlSource>) -> anyhow::Result<()> {
    refresher
        .tick()
        .await
        .context("Failed to read pin state")?;
    let json = serde_json::to_string_pretty(refresher.table())?;
    println!("{}", json);
    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
}
