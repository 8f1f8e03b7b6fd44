use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Quote contains non-positive values for: {}", .0.join(", "))]
    InvalidQuote(Vec<String>),

    #[error("Unrecognized direction '{0}', expected 'up' or 'down'")]
    InvalidDirection(String),
}
