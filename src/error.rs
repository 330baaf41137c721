use thiserror::Error;

pub type ScoringResult<T> = std::result::Result<T, ScoringError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("match {match_number} is level and has no deciding penalties recorded")]
    IncompleteResult { match_number: u32 },

    #[error("unknown stage: {0}")]
    UnknownStage(String),

    #[error("invalid next match reference: {0}")]
    InvalidNextMatch(String),

    #[error("match {0} has no next match to advance the winner into")]
    MissingNextMatch(u32),

    #[error("match {0} not found")]
    MatchNotFound(u32),

    #[error("member {0} not found")]
    MemberNotFound(u32),

    #[error("match {0} has no recorded score")]
    UnplayedMatch(u32),
}
