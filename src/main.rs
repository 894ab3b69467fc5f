use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use term_balloon::config::{ConfigError, ToolbarConfig};
use term_balloon::demo::DemoEditor;
use term_balloon::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_balloon::drivers::{InputDriver, OutputDriver};
use term_balloon::event_loop::EventLoop;
use term_balloon::tracing_sub;

/// Upper bound on how long the loop sleeps with nothing scheduled.
const IDLE_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(
    name = "term-balloon",
    version = env!("CARGO_PKG_VERSION"),
    about = "Select text and watch the balloon toolbar follow it"
)]
struct Cli {
    /// Quiet period after the last selection change.
    #[arg(long, value_name = "MS", default_value_t = 200)]
    selection_debounce_ms: u64,

    /// Settle window before a show/hide decision is applied.
    #[arg(long, value_name = "MS", default_value_t = 200)]
    toggle_debounce_ms: u64,

    /// Write logs here. Nothing is logged without it, the UI owns the terminal.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Document text.
    #[arg(
        long,
        default_value = "Select part of this line to see the balloon toolbar."
    )]
    text: String,
}

impl TryFrom<&Cli> for ToolbarConfig {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        ToolbarConfig::from_millis(cli.selection_debounce_ms, cli.toggle_debounce_ms)
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = ToolbarConfig::try_from(&cli)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    if let Some(path) = cli.log_file.as_deref() {
        tracing_sub::init_default(Some(path))?;
    }

    let mut output = ConsoleOutputDriver::new()?;
    let mut editor = DemoEditor::new(&cli.text, config, output.viewport()?, Instant::now());
    output.enter()?;
    let mut input = ConsoleInputDriver::new();
    input.set_mouse_capture(true)?;

    let mut event_loop = EventLoop::new(input, IDLE_INTERVAL);
    let result = event_loop.run(|_, event| {
        let now = Instant::now();
        let flow = match event {
            Some(event) => editor.handle_event(&event, now),
            None => editor.tick(now),
        }
        .map_err(io::Error::other)?;
        output.draw(|mut frame| editor.render(&mut frame))?;
        Ok(flow)
    });

    output.exit()?;
    result
}
