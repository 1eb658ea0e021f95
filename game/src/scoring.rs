use std::fmt;

use crate::question::QuestionContext;
use crate::team::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSign {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreError {
    /// The team's displayed score does not parse as an integer. Surfaced
    /// as a blocking alert; the operation aborts with nothing mutated.
    NotANumber,
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::NotANumber => f.write_str(
                "Error! The score for this team is not a number. \
                 You need to edit the score and change it to a number.",
            ),
        }
    }
}

/// The magnitude a +/- action applies: the open question's current value
/// (halved if its hint was consumed), else the first grid cell's points.
///
/// The fallback reads the *first* cell rather than anything smarter; that
/// matches the shipped behavior and is kept as-is even though it looks
/// unintentional for manual scoring on boards with mixed first rows.
pub fn magnitude(active: Option<&QuestionContext>, fallback_points: i64) -> i64 {
    active
        .map(QuestionContext::scoring_value)
        .unwrap_or(fallback_points)
}

/// Applies a signed delta to `team` and returns it. The team's displayed
/// score must parse; otherwise nothing is mutated.
pub fn adjust(
    team: &mut Team,
    sign: ScoreSign,
    active: Option<&QuestionContext>,
    fallback_points: i64,
) -> Result<i64, ScoreError> {
    let current = team.points()?;
    let mut delta = magnitude(active, fallback_points);
    if sign == ScoreSign::Minus {
        delta = -delta;
    }
    team.set_points(current + delta);
    Ok(delta)
}
