//! Rule table introspection for editors and autocompletion.
//!
//! Every lookup takes user-facing strings and answers `None` for names the
//! table does not know.

use super::id::{Action, BoneId, Direction};
use super::names::Locale;

impl BoneId {
    /// Actions in first-appearance order of the bone's rules
    pub fn actions(self) -> Vec<Action> {
        let mut actions = Vec::new();
        for rule in self.def().rules {
            if !actions.contains(&rule.action) {
                actions.push(rule.action);
            }
        }
        actions
    }

    /// Directions legal for one action, in table order
    pub fn directions(self, action: Action) -> Vec<Direction> {
        self.def()
            .rules
            .iter()
            .filter(|rule| rule.action == action)
            .map(|rule| rule.direction)
            .collect()
    }
}

/// Canonical keys of every bone, in table order
pub fn list_bones() -> Vec<&'static str> {
    BoneId::ALL.iter().map(|bone| bone.key()).collect()
}

pub fn list_actions(bone: &str) -> Option<Vec<&'static str>> {
    let bone = BoneId::from_display_name(bone)?;
    Some(bone.actions().into_iter().map(Action::as_str).collect())
}

pub fn list_directions(bone: &str, action: &str) -> Option<Vec<&'static str>> {
    let bone = BoneId::from_display_name(bone)?;
    let action = Action::from_keyword(action)?;
    let directions = bone.directions(action);
    if directions.is_empty() {
        return None;
    }
    Some(directions.into_iter().map(Direction::as_str).collect())
}

/// Inclusive limit for a triple
pub fn degree_limit(bone: &str, action: &str, direction: &str) -> Option<f32> {
    let bone = BoneId::from_display_name(bone)?;
    let rule = bone.rule(
        Action::from_keyword(action)?,
        Direction::from_keyword(direction)?,
    )?;
    Some(rule.limit)
}

pub fn display_name(bone: &str, locale: Locale) -> Option<&'static str> {
    BoneId::from_display_name(bone).map(|bone| bone.display_name(locale))
}
