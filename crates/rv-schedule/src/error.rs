use thiserror::Error;

pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Unknown well: {name}")]
    UnknownWell { name: String },

    #[error("Unknown group: {name}")]
    UnknownGroup { name: String },

    #[error("Group {name} mixes well children and group children")]
    MixedGroup { name: String },

    #[error("Schedule has no steps")]
    Empty,
}
