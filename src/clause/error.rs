use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClauseError {
    /// The caller supplied no fields to update or filter on.
    #[error("No data")]
    MissingData,

    /// The translation table supplied by calling code is absent or does not
    /// line up with the requested fields.
    #[error("Invalid field translations: {0}")]
    InvalidTranslations(&'static str),
}

impl ClauseError {
    /// True when the error is a defect in the calling code rather than in the input.
    pub fn is_internal(&self) -> bool {
        matches!(self, ClauseError::InvalidTranslations(_))
    }
}
