use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Cruise Elroy only knows levels 0, 1 and 2. Anything else is a caller bug.
    #[error("invalid Cruise Elroy level: {0}")]
    InvalidElroyLevel(i8),
    #[error("invalid level table: {0}")]
    InvalidLevelTable(String),
    #[error("maze parse error at line {line}: {reason}")]
    MazeParse { line: usize, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
