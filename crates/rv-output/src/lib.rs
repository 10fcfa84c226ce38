//! rv-output: mini-step buffering and indexed summary file output.
//!
//! A run produces a specification file (the ordered vector identities,
//! JSON) and a binary parameter stream of framed records. The writer
//! buffers mini-steps between flushes and reuses buffer slots instead of
//! reallocating per step.

pub mod reader;
pub mod stream;
pub mod types;

pub use reader::{read_ministeps, read_records, read_specification, Record};
pub use stream::SummaryWriter;
pub use types::{MiniStep, ParamSpec, SummarySpecification};

pub type OutputResult<T> = Result<T, OutputError>;

#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed record: {message}")]
    InvalidRecord { message: String },
}
