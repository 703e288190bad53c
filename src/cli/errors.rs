use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Nothing to do: pass --co-pol/--cross-pol, --input with --target-crs, or --items")]
    NothingToDo,

    #[error("{failed} of {total} item(s) failed")]
    BatchFailed { failed: usize, total: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Processing(#[from] sarbrowse::Error),
}
