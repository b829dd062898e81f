use thiserror::Error;

pub type MjmlResult<T> = Result<T, MjmlError>;

#[derive(Error, Debug, Clone)]
pub enum MjmlError {
    #[error("Unterminated tag starting at byte {offset}")]
    UnterminatedTag { offset: usize },

    #[error("Unterminated comment starting at byte {offset}")]
    UnterminatedComment { offset: usize },

    #[error("Unterminated attribute value in <{tag}> at byte {offset}")]
    UnterminatedAttribute { tag: String, offset: usize },

    #[error("Maximum nesting depth ({max_depth}) exceeded")]
    MaxNestingDepthExceeded { max_depth: usize },

    #[error("Empty input: nothing to encode")]
    EmptyInput,
}
