//! braille-display-sim: drives the display manager from the terminal.
//!
//! Each input line replaces the content on a simulated display, and frames
//! are printed as Unicode braille. Lines starting with `:` are commands:
//! `:left`, `:right`, `:route N`, `:cursor N`, `:table computer|none`, `:quit`.
//!
//! Usage: `braille-display-sim [config.json]`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use braille_display_manager::{
    BrailleInputEvent, ComputerBrailleTranslator, ConnectionState, Content, DisplayConfig,
    DisplayListener, DisplayManager, InputCommand, PanStrategy, SimulatedDisplay, Translator,
};

/// Prints what a screen reader would act on.
struct PrintingListener;

impl DisplayListener for PrintingListener {
    fn on_mapped_input_event(&mut self, event: BrailleInputEvent, content: &Content) {
        let target: String = content.text().chars().skip(event.argument).take(1).collect();
        println!("  -> {:?} at text offset {} ({:?})", event.command, event.argument, target);
    }

    fn on_pan_left_overflow(&mut self, content: &Content) {
        println!("  -> start of content {} reached", content.id());
    }

    fn on_pan_right_overflow(&mut self, content: &Content) {
        println!("  -> end of content {} reached", content.id());
    }

    fn on_connection_state_changed(&mut self, state: ConnectionState) {
        println!("  -> display {:?}", state);
    }
}

enum Command {
    Text(String),
    Left,
    Right,
    Route(usize),
    Cursor(usize),
    Table(Option<Arc<dyn Translator>>),
    Quit,
}

fn parse_command(line: &str) -> Result<Command> {
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Command::Text(line.to_string()));
    };
    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let argument = words.next();

    let number = |argument: Option<&str>| -> Result<usize> {
        argument
            .context("missing argument")?
            .parse()
            .with_context(|| format!("bad number for :{}", name))
    };

    Ok(match name {
        "left" => Command::Left,
        "right" => Command::Right,
        "route" => Command::Route(number(argument)?),
        "cursor" => Command::Cursor(number(argument)?),
        "table" => match argument {
            Some("computer") => Command::Table(Some(Arc::new(ComputerBrailleTranslator::new()))),
            Some("none") => Command::Table(None),
            other => bail!("unknown table {:?}", other.unwrap_or_default()),
        },
        "quit" => Command::Quit,
        other => bail!("unknown command :{}", other),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = DisplayConfig::load_or_default(config_path.as_deref())
        .context("Failed to load display config")?;

    info!("Simulated display with {} cells", config.simulated_cells);

    let display = SimulatedDisplay::new(config.simulated_cells)
        .on_frame(|frame| println!("{} |{}|", frame.to_unicode(), frame.text));
    let manager = DisplayManager::start(
        &config,
        Box::new(display),
        Some(Arc::new(ComputerBrailleTranslator::new())),
        PrintingListener,
    );
    let sink = manager.event_sink();

    let mut text = String::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                warn!("{:#}", e);
                continue;
            }
        };
        match command {
            Command::Text(new_text) => {
                text = new_text;
                manager.set_content(Content::new(text.clone()))?;
            }
            Command::Left => manager.pan_left()?,
            Command::Right => manager.pan_right()?,
            Command::Route(cell) => {
                sink.input_event(BrailleInputEvent::new(InputCommand::Route, cell))?
            }
            Command::Cursor(offset) => {
                let content = Content::builder(text.clone())
                    .selection(offset, offset)
                    .pan_strategy(PanStrategy::Cursor)
                    .build();
                manager.set_content(content)?;
            }
            Command::Table(translator) => manager.set_translator(translator)?,
            Command::Quit => break,
        }
    }

    manager.shutdown().await;
    Ok(())
}
