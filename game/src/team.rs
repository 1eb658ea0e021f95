use serde::{Deserialize, Serialize};

use crate::scoring::ScoreError;

/// A scoring team. Points are kept as the displayed text because the
/// operator can edit the field to anything; scoring validates on use
/// instead of clamping on entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: usize,
    pub name: String,
    pub points_text: String,
    pub visible: bool,
}

impl Team {
    fn nth(id: usize) -> Self {
        Self {
            id,
            name: format!("Team {}", id + 1),
            points_text: "0".to_string(),
            visible: true,
        }
    }

    pub fn points(&self) -> Result<i64, ScoreError> {
        self.points_text
            .trim()
            .parse()
            .map_err(|_| ScoreError::NotANumber)
    }

    pub fn set_points(&mut self, points: i64) {
        self.points_text = points.to_string();
    }
}

/// The team roster. Teams are only ever hidden when the count shrinks,
/// never destroyed, so re-growing the count brings their state back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    teams: Vec<Team>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the first `count` teams, cloning new ones from the template
    /// defaults as needed and hiding the rest.
    pub fn resize(&mut self, count: usize) {
        while self.teams.len() < count {
            self.teams.push(Team::nth(self.teams.len()));
        }
        for (i, team) in self.teams.iter_mut().enumerate() {
            team.visible = i < count;
        }
    }

    /// Resets the visible teams to "Team N" / 0 (a reset keeps hidden
    /// teams untouched, matching the hide-don't-destroy rule).
    pub fn reset_visible(&mut self) {
        for team in self.teams.iter_mut().filter(|t| t.visible) {
            *team = Team::nth(team.id);
        }
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.teams.iter().filter(|t| t.visible).count()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, id: usize) -> Option<&Team> {
        self.teams.get(id)
    }

    pub fn team_mut(&mut self, id: usize) -> Option<&mut Team> {
        self.teams.get_mut(id)
    }

    /// 1-based selection used by the digit shortcuts; only visible teams
    /// are selectable.
    pub fn selectable(&self, number: usize) -> Option<usize> {
        if number == 0 {
            return None;
        }
        let id = number - 1;
        self.teams.get(id).filter(|t| t.visible).map(|t| t.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_grows_with_defaults_and_hides_on_shrink() {
        let mut roster = Roster::new();
        roster.resize(3);
        assert_eq!(roster.visible_count(), 3);
        assert_eq!(roster.team(2).unwrap().name, "Team 3");

        roster.team_mut(2).unwrap().name = "The Champs".to_string();
        roster.resize(2);
        assert_eq!(roster.visible_count(), 2);
        // Hidden, not destroyed.
        assert_eq!(roster.len(), 3);

        roster.resize(3);
        assert_eq!(roster.team(2).unwrap().name, "The Champs");
    }

    #[test]
    fn points_parse_validates_on_use() {
        let mut roster = Roster::new();
        roster.resize(1);
        assert_eq!(roster.team(0).unwrap().points(), Ok(0));

        roster.team_mut(0).unwrap().points_text = "oops".to_string();
        assert_eq!(roster.team(0).unwrap().points(), Err(ScoreError::NotANumber));
    }

    #[test]
    fn selection_is_one_based_and_skips_hidden() {
        let mut roster = Roster::new();
        roster.resize(3);
        roster.resize(2);
        assert_eq!(roster.selectable(1), Some(0));
        assert_eq!(roster.selectable(2), Some(1));
        assert_eq!(roster.selectable(3), None);
        assert_eq!(roster.selectable(0), None);
    }
}
