//! Single `bone action direction amount` statements.

use crate::bone::id::{Action, BoneId, Direction};
use crate::bone::rules::ActionRule;
use crate::error::MplError;
use crate::math::axis_angle;
use glam::{Quat, Vec3};
use std::fmt;
use std::str::FromStr;

/// A validated pose statement.
/// `degrees` holds a distance in model units for `move`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statement {
    pub bone: BoneId,
    pub action: Action,
    pub direction: Direction,
    pub degrees: f32,
}

impl Statement {
    /// Build a statement, checking the triple and the amount against the rule table
    pub fn new(
        bone: BoneId,
        action: Action,
        direction: Direction,
        degrees: f32,
    ) -> Result<Self, MplError> {
        if bone.directions(action).is_empty() {
            return Err(MplError::UnknownAction {
                bone: bone.key().to_string(),
                action: action.as_str().to_string(),
            });
        }
        let rule = bone
            .rule(action, direction)
            .ok_or_else(|| MplError::UnknownDirection {
                bone: bone.key().to_string(),
                action: action.as_str().to_string(),
                direction: direction.as_str().to_string(),
            })?;
        check_amount(bone, rule, degrees, || degrees.to_string())?;
        Ok(Self {
            bone,
            action,
            direction,
            degrees,
        })
    }

    /// Rule this statement was validated against
    pub fn rule(&self) -> Option<&'static ActionRule> {
        self.bone.rule(self.action, self.direction)
    }

    /// Rotation contributed by this statement; identity for `move`
    pub fn rotation(&self) -> Result<Quat, MplError> {
        if !self.action.is_rotation() {
            return Ok(Quat::IDENTITY);
        }
        let rule = self.rule().ok_or_else(|| self.invariant("rule missing"))?;
        axis_angle(rule.axis, self.degrees).ok_or_else(|| self.invariant("zero rotation axis"))
    }

    /// Offset contributed by this statement; zero for rotations
    pub fn translation(&self) -> Result<Vec3, MplError> {
        if self.action.is_rotation() {
            return Ok(Vec3::ZERO);
        }
        let rule = self.rule().ok_or_else(|| self.invariant("rule missing"))?;
        let axis = rule
            .axis
            .try_normalize()
            .ok_or_else(|| self.invariant("zero translation axis"))?;
        Ok(axis * self.degrees)
    }

    fn invariant(&self, reason: &str) -> MplError {
        MplError::InternalInvariant {
            reason: format!("{}: {}", self, reason),
        }
    }
}

fn check_amount(
    bone: BoneId,
    rule: &ActionRule,
    degrees: f32,
    value: impl FnOnce() -> String,
) -> Result<(), MplError> {
    if degrees.is_finite() && (0.0..=rule.limit).contains(&degrees) {
        return Ok(());
    }
    Err(MplError::DegreeRange {
        bone: bone.key().to_string(),
        action: rule.action.as_str().to_string(),
        direction: rule.direction.as_str().to_string(),
        value: value(),
        limit: rule.limit,
    })
}

impl FromStr for Statement {
    type Err = MplError;

    /// Parse exactly four whitespace-separated, case-insensitive tokens.
    /// Checks run bone, action, direction, amount; the first failure wins.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let [bone, action, direction, amount] = tokens.as_slice() else {
            return Err(MplError::syntax(format!(
                "expected 'bone action direction degrees', found {} token(s)",
                tokens.len()
            )));
        };

        let bone: BoneId = bone.parse()?;
        let action = Action::from_keyword(action)
            .filter(|action| !bone.directions(*action).is_empty())
            .ok_or_else(|| MplError::UnknownAction {
                bone: bone.key().to_string(),
                action: action.to_ascii_lowercase(),
            })?;
        let rule = Direction::from_keyword(direction)
            .and_then(|direction| bone.rule(action, direction))
            .ok_or_else(|| MplError::UnknownDirection {
                bone: bone.key().to_string(),
                action: action.as_str().to_string(),
                direction: direction.to_ascii_lowercase(),
            })?;

        let degrees = amount.parse::<f32>().unwrap_or(f32::NAN);
        check_amount(bone, rule, degrees, || amount.to_string())?;

        Ok(Self {
            bone,
            action,
            direction: rule.direction,
            degrees,
        })
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.bone,
            self.action.as_str(),
            self.direction.as_str(),
            self.degrees
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::RotationExt;

    #[test]
    fn test_parse_is_case_insensitive() {
        let statement: Statement = "Head TURN Left 30".parse().unwrap();
        assert_eq!(statement.bone, BoneId::Head);
        assert_eq!(statement.action, Action::Turn);
        assert_eq!(statement.direction, Direction::Left);
        assert_eq!(statement.degrees, 30.0);
        assert_eq!(statement.to_string(), "head turn left 30");
    }

    #[test]
    fn test_validation_order() {
        let err = "foot_l bend forward 10".parse::<Statement>().unwrap_err();
        assert_eq!(err.kind(), "UnknownBone");

        let err = "elbow_l turn left 10".parse::<Statement>().unwrap_err();
        assert_eq!(err.kind(), "UnknownAction");

        let err = "knee_l bend forward 999".parse::<Statement>().unwrap_err();
        assert_eq!(err.kind(), "UnknownDirection");

        let err = "head move up 5".parse::<Statement>().unwrap_err();
        assert_eq!(err.kind(), "UnknownAction");
    }

    #[test]
    fn test_amount_checks() {
        let err = "head turn left 91".parse::<Statement>().unwrap_err();
        assert!(matches!(err, MplError::DegreeRange { limit, .. } if limit == 90.0));

        let err = "head turn left -5".parse::<Statement>().unwrap_err();
        assert_eq!(err.kind(), "DegreeRange");

        let err = "head turn left lots".parse::<Statement>().unwrap_err();
        assert_eq!(err.kind(), "DegreeRange");

        let err = "head turn left NaN".parse::<Statement>().unwrap_err();
        assert_eq!(err.kind(), "DegreeRange");

        assert!("head turn left 90".parse::<Statement>().is_ok());
    }

    #[test]
    fn test_wrong_token_count() {
        let err = "head turn left".parse::<Statement>().unwrap_err();
        assert_eq!(err.kind(), "Syntax");
        let err = "head turn left 30 now".parse::<Statement>().unwrap_err();
        assert_eq!(err.kind(), "Syntax");
    }

    #[test]
    fn test_rotation_uses_rule_axis() {
        let statement: Statement = "head turn left 30".parse().unwrap();
        let expected = Quat::from_axis_angle(Vec3::NEG_Y, 30f32.to_radians());
        assert!(statement.rotation().unwrap().rotation_distance(&expected) < 1e-6);
        assert_eq!(statement.translation().unwrap(), Vec3::ZERO);
    }

    #[test]
    fn test_move_translates_without_rotating() {
        let statement: Statement = "center move up 5".parse().unwrap();
        assert_eq!(statement.rotation().unwrap(), Quat::IDENTITY);
        assert!(statement.translation().unwrap().distance(Vec3::new(0.0, 5.0, 0.0)) < 1e-6);

        let err = "center move up 25".parse::<Statement>().unwrap_err();
        assert_eq!(err.kind(), "DegreeRange");
    }

    #[test]
    fn test_new_checks_the_table() {
        assert!(Statement::new(BoneId::Neck, Action::Bend, Direction::Forward, 45.0).is_ok());
        let err = Statement::new(BoneId::Neck, Action::Bend, Direction::Up, 5.0).unwrap_err();
        assert_eq!(err.kind(), "UnknownDirection");
    }
}
