use thiserror::Error;

pub type GiftwiseResult<T> = Result<T, GiftwiseError>;

/// Which entity axis an out-of-range index addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexAxis {
    User,
    Item,
}

impl std::fmt::Display for IndexAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexAxis::User => write!(f, "user"),
            IndexAxis::Item => write!(f, "item"),
        }
    }
}

#[derive(Error, Debug)]
pub enum GiftwiseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Empty training set: at least one rating observation is required")]
    EmptyTrainingSet,

    #[error("Index out of range: {axis} index {index} exceeds bound {bound}")]
    IndexOutOfRange {
        axis: IndexAxis,
        index: usize,
        bound: usize,
    },
}
