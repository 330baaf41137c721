use crate::model::Score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutcomeFlags {
    pub home_goals_exact: bool,
    pub away_goals_exact: bool,
    pub result_match: bool,
    pub perfect: bool,
}

/// Compare one recorded score against one predicted score.
pub fn classify(actual: Score, predicted: Score) -> OutcomeFlags {
    let home_goals_exact = actual.home == predicted.home;
    let away_goals_exact = actual.away == predicted.away;

    let actual_diff = i64::from(actual.home) - i64::from(actual.away);
    let predicted_diff = i64::from(predicted.home) - i64::from(predicted.away);
    // A draw has a zero difference, so the product test alone misses draw-for-draw.
    let result_match =
        actual_diff * predicted_diff > 0 || (actual.is_draw() && predicted.is_draw());

    OutcomeFlags {
        home_goals_exact,
        away_goals_exact,
        result_match,
        perfect: home_goals_exact && away_goals_exact,
    }
}
