use thiserror::Error;
use tracery_parser::ParseError;

pub type WriteResult<T> = Result<T, WriteError>;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Overlapping edits: {first_start}..{first_end} and {second_start}..{second_end}")]
    OverlappingEdits {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    #[error("Edit span {start}..{end} is out of bounds for source of length {len}")]
    EditOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Stream configuration is malformed: {message}")]
    InvalidStreamConfig { message: String },

    #[error("Component \"{component_name}\" has no known source file")]
    UnknownComponent { component_name: String },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
