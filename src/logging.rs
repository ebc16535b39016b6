use flexi_logger::{Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use std::path::Path;

const LOG_FILE_BASENAME: &str = "checklists";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Starts file logging under `dir`. The terminal belongs to the UI, so nothing goes to stderr.
///
/// Keep the returned handle alive until exit; dropping it flushes and stops the logger.
pub fn init(level: &str, dir: &Path) -> Result<LoggerHandle, FlexiLoggerError> {
    let handle = Logger::try_with_str(level)?
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    info!(
        "checklists {} starting, logging to {}",
        env!("CARGO_PKG_VERSION"),
        dir.display()
    );
    Ok(handle)
}
