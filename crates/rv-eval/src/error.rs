use thiserror::Error;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Error, Debug)]
pub enum EvalError {
    /// Caller contract breach: steps must arrive with non-decreasing
    /// elapsed time. Usually an incorrect restart time.
    #[error(
        "Elapsed time ({incoming} s) must not precede previous elapsed time \
         ({current} s). Incorrect restart time?"
    )]
    NonMonotonicTime { incoming: f64, current: f64 },

    #[error("Numeric error: {0}")]
    Core(#[from] rv_core::CoreError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] rv_schedule::ScheduleError),

    #[error("Output error: {0}")]
    Output(#[from] rv_output::OutputError),
}
