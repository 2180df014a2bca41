use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to read collaboration log {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write export {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
