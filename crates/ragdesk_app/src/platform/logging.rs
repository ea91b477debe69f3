//! Platform logging initialization for ragdesk.
//!
//! Writes logs to `./ragdesk.log` in the current working directory.

use std::path::Path;

use log::LevelFilter;
use ragdesk_logging::LogDestination;

const LOG_FILE: &str = "./ragdesk.log";

/// Terminal output shares the screen with the chat, so the file is the
/// usual destination.
pub fn initialize(destination: LogDestination) {
    ragdesk_logging::initialize(destination, LevelFilter::Info, Path::new(LOG_FILE));
}
