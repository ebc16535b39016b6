mod checklist;
mod config;
mod logging;
mod storage;
mod store;
mod ui;

use clap::Parser;
use config::Config;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::error;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use storage::{FileStorage, MemoryStorage, Storage};
use store::Store;
use ui::App;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    // Storage setup; a malformed slot aborts here, before the terminal is touched.
    let storage: Box<dyn Storage> = if config.ephemeral {
        Box::new(MemoryStorage::default())
    } else {
        Box::new(FileStorage::new(config.data_dir()))
    };
    let _logger = if config.ephemeral {
        None
    } else {
        Some(logging::init(&config.log_level, &config.data_dir())?)
    };
    let store = Store::open(storage, config.slot.as_str())?;
    let mut app = App::new(store);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!("{}", err);
        return Err(err.into());
    }
    Ok(())
}
