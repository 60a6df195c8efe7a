use super::id::{Action, BoneId, Direction};
use glam::Vec3;

/// Axis and inclusive limit for one (bone, action, direction) triple.
/// Rotation limits are degrees; `Move` limits are model units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionRule {
    pub action: Action,
    pub direction: Direction,
    /// Not necessarily normalized, never zero
    pub axis: Vec3,
    pub limit: f32,
}

/// Static bone definition: canonical key, display names and legal actions
#[derive(Debug, Clone, Copy)]
pub struct BoneDef {
    pub id: BoneId,
    /// Canonical DSL key, e.g. `arm_twist_l`
    pub key: &'static str,
    pub name_en: &'static str,
    /// MMD bone name, written into VMD records
    pub name_ja: &'static str,
    /// Rules in fixed enumeration order
    pub rules: &'static [ActionRule],
}

const fn rule(
    action: Action,
    direction: Direction,
    x: f32,
    y: f32,
    z: f32,
    limit: f32,
) -> ActionRule {
    ActionRule {
        action,
        direction,
        axis: Vec3::new(x, y, z),
        limit,
    }
}

const fn bone(
    id: BoneId,
    key: &'static str,
    name_en: &'static str,
    name_ja: &'static str,
    rules: &'static [ActionRule],
) -> BoneDef {
    BoneDef {
        id,
        key,
        name_en,
        name_ja,
        rules,
    }
}

use Action::{Bend, Move, Sway, Turn};
use Direction::{Backward, Down, Forward, Left, Right, Up};

// --- Trunk ---

/// Spine-style joint: pitch about X, yaw about Y, roll about Z
const fn trunk(forward: f32, backward: f32, turn: f32, sway: f32) -> [ActionRule; 6] {
    [
        rule(Bend, Forward, -1.0, 0.0, 0.0, forward),
        rule(Bend, Backward, 1.0, 0.0, 0.0, backward),
        rule(Turn, Left, 0.0, -1.0, 0.0, turn),
        rule(Turn, Right, 0.0, 1.0, 0.0, turn),
        rule(Sway, Left, 0.0, 0.0, -1.0, sway),
        rule(Sway, Right, 0.0, 0.0, 1.0, sway),
    ]
}

/// Trunk rotations plus translation along the model axes
const fn movable(rotations: [ActionRule; 6], horizontal: f32, vertical: f32) -> [ActionRule; 12] {
    let [a, b, c, d, e, f] = rotations;
    [
        a,
        b,
        c,
        d,
        e,
        f,
        rule(Move, Forward, 0.0, 0.0, -1.0, horizontal),
        rule(Move, Backward, 0.0, 0.0, 1.0, horizontal),
        rule(Move, Left, 1.0, 0.0, 0.0, horizontal),
        rule(Move, Right, -1.0, 0.0, 0.0, horizontal),
        rule(Move, Up, 0.0, 1.0, 0.0, vertical),
        rule(Move, Down, 0.0, -1.0, 0.0, vertical),
    ]
}

const BASE: [ActionRule; 12] = movable(trunk(90.0, 90.0, 180.0, 180.0), 100.0, 100.0);
const CENTER: [ActionRule; 12] = movable(trunk(180.0, 180.0, 180.0, 180.0), 30.0, 20.0);
const UPPER_BODY: [ActionRule; 6] = trunk(45.0, 45.0, 45.0, 45.0);
const WAIST: [ActionRule; 6] = trunk(90.0, 90.0, 45.0, 30.0);
const NECK: [ActionRule; 6] = trunk(45.0, 60.0, 75.0, 30.0);
const HEAD: [ActionRule; 6] = trunk(60.0, 90.0, 90.0, 30.0);

// --- Arms ---

const SHOULDER_L: [ActionRule; 4] = [
    rule(Bend, Forward, 0.0, 0.0, -1.0, 90.0),
    rule(Bend, Backward, 0.0, 0.0, 1.0, 90.0),
    rule(Sway, Left, 0.0, -1.0, 0.0, 90.0),
    rule(Sway, Right, 0.0, 1.0, 0.0, 90.0),
];
const SHOULDER_R: [ActionRule; 4] = [
    rule(Bend, Forward, 0.0, 0.0, 1.0, 90.0),
    rule(Bend, Backward, 0.0, 0.0, -1.0, 90.0),
    rule(Sway, Left, 0.0, 1.0, 0.0, 90.0),
    rule(Sway, Right, 0.0, -1.0, 0.0, 90.0),
];
const ARM_R: [ActionRule; 4] = [
    rule(Bend, Forward, 0.0, 0.0, 1.0, 45.0),
    rule(Bend, Backward, 0.0, 0.0, -1.0, 180.0),
    rule(Sway, Left, 0.0, -1.0, 0.0, 90.0),
    rule(Sway, Right, 0.0, 1.0, 0.0, 90.0),
];
const TWIST: [ActionRule; 2] = [
    rule(Turn, Left, 0.0, -1.0, 0.0, 90.0),
    rule(Turn, Right, 0.0, 1.0, 0.0, 90.0),
];
const ELBOW_L: [ActionRule; 1] = [rule(Bend, Forward, 1.0, 1.0, 0.0, 135.0)];
const ELBOW_R: [ActionRule; 1] = [rule(Bend, Forward, 1.0, -1.0, 0.0, 135.0)];
const WRIST_L: [ActionRule; 4] = [
    rule(Bend, Forward, 0.0, 0.0, -1.0, 60.0),
    rule(Bend, Backward, 1.0, 0.0, -1.0, 30.0),
    rule(Sway, Left, -1.0, 1.0, 0.0, 15.0),
    rule(Sway, Right, 1.0, 1.0, 0.0, 15.0),
];
const WRIST_R: [ActionRule; 4] = [
    rule(Bend, Forward, 0.0, 0.0, 1.0, 60.0),
    rule(Bend, Backward, -1.0, 0.0, -1.0, 30.0),
    rule(Sway, Left, -1.0, -1.0, 0.0, 15.0),
    rule(Sway, Right, 1.0, -1.0, 0.0, 15.0),
];

// --- Legs ---

const fn leg(sway_left: f32, sway_right: f32) -> [ActionRule; 6] {
    [
        rule(Bend, Forward, 1.0, 0.0, 0.0, 90.0),
        rule(Bend, Backward, -1.0, 0.0, 0.0, 90.0),
        rule(Turn, Left, 0.0, -1.0, 0.0, 90.0),
        rule(Turn, Right, 0.0, 1.0, 0.0, 90.0),
        rule(Sway, Left, 0.0, 0.0, 1.0, sway_left),
        rule(Sway, Right, 0.0, 0.0, -1.0, sway_right),
    ]
}

const LEG_L: [ActionRule; 6] = leg(180.0, 30.0);
const LEG_R: [ActionRule; 6] = leg(30.0, 180.0);
const KNEE: [ActionRule; 1] = [rule(Bend, Backward, -1.0, 0.0, 0.0, 135.0)];
const ANKLE: [ActionRule; 6] = [
    rule(Bend, Forward, -1.0, 0.0, 0.0, 60.0),
    rule(Bend, Backward, 1.0, 0.0, 0.0, 60.0),
    rule(Turn, Left, 0.0, -1.0, 0.0, 90.0),
    rule(Turn, Right, 0.0, 1.0, 0.0, 90.0),
    rule(Sway, Left, 0.0, 0.0, 1.0, 30.0),
    rule(Sway, Right, 0.0, 0.0, -1.0, 30.0),
];
const TOE: [ActionRule; 2] = [
    rule(Bend, Forward, -1.0, 0.0, 0.0, 30.0),
    rule(Bend, Backward, 1.0, 0.0, 0.0, 30.0),
];

// --- Hands ---

const THUMB_L: [ActionRule; 2] = [
    rule(Bend, Forward, -1.0, -1.0, 0.0, 90.0),
    rule(Bend, Backward, 1.0, 1.0, 0.0, 15.0),
];
const THUMB_ROOT_R: [ActionRule; 4] = [
    rule(Bend, Forward, -1.0, 1.0, 0.0, 90.0),
    rule(Bend, Backward, 1.0, -1.0, 0.0, 15.0),
    rule(Sway, Left, 0.0, 0.0, 1.0, 45.0),
    rule(Sway, Right, 0.0, 0.0, -1.0, 45.0),
];
const THUMB_R: [ActionRule; 2] = [
    rule(Bend, Forward, -1.0, 1.0, 0.0, 90.0),
    rule(Bend, Backward, 1.0, -1.0, 0.0, 15.0),
];
const FINGER_ROOT_L: [ActionRule; 4] = [
    rule(Bend, Forward, 0.0, 0.0, -1.0, 90.0),
    rule(Bend, Backward, 0.0, 0.0, 1.0, 15.0),
    rule(Sway, Left, 0.0, 0.0, 1.0, 45.0),
    rule(Sway, Right, 0.0, 0.0, -1.0, 45.0),
];
const FINGER_L: [ActionRule; 2] = [
    rule(Bend, Forward, 0.0, 0.0, -1.0, 90.0),
    rule(Bend, Backward, 0.0, 0.0, 1.0, 15.0),
];

const fn finger_root_r(sway: f32) -> [ActionRule; 4] {
    [
        rule(Bend, Forward, 0.0, 0.0, 1.0, 90.0),
        rule(Bend, Backward, 0.0, 0.0, -1.0, 15.0),
        rule(Sway, Left, 1.0, 0.0, 0.0, sway),
        rule(Sway, Right, -1.0, 0.0, 0.0, sway),
    ]
}

const INDEX_ROOT_R: [ActionRule; 4] = finger_root_r(15.0);
const FINGER_ROOT_R: [ActionRule; 4] = finger_root_r(45.0);
const FINGER_R: [ActionRule; 2] = [
    rule(Bend, Forward, 0.0, 0.0, 1.0, 90.0),
    rule(Bend, Backward, 0.0, 0.0, -1.0, 15.0),
];

/// The rule table, indexed by `BoneId::index()`.
pub static BONE_DEFS: [BoneDef; BoneId::COUNT] = [
    bone(BoneId::Base, "base", "Base", "全ての親", &BASE),
    bone(BoneId::Center, "center", "Center", "センター", &CENTER),
    bone(BoneId::UpperBody, "upper_body", "Upper Body", "上半身", &UPPER_BODY),
    bone(BoneId::UpperBody2, "upper_body2", "Upper Body 2", "上半身2", &UPPER_BODY),
    bone(BoneId::LowerBody, "lower_body", "Lower Body", "下半身", &UPPER_BODY),
    bone(BoneId::Waist, "waist", "Waist", "腰", &WAIST),
    bone(BoneId::Neck, "neck", "Neck", "首", &NECK),
    bone(BoneId::Head, "head", "Head", "頭", &HEAD),
    bone(BoneId::ShoulderL, "shoulder_l", "Left Shoulder", "左肩", &SHOULDER_L),
    bone(BoneId::ShoulderR, "shoulder_r", "Right Shoulder", "右肩", &SHOULDER_R),
    bone(BoneId::ArmL, "arm_l", "Left Arm", "左腕", &SHOULDER_L),
    bone(BoneId::ArmR, "arm_r", "Right Arm", "右腕", &ARM_R),
    bone(BoneId::ArmTwistL, "arm_twist_l", "Left Arm Twist", "左腕捩", &TWIST),
    bone(BoneId::ArmTwistR, "arm_twist_r", "Right Arm Twist", "右腕捩", &TWIST),
    bone(BoneId::ElbowL, "elbow_l", "Left Elbow", "左ひじ", &ELBOW_L),
    bone(BoneId::ElbowR, "elbow_r", "Right Elbow", "右ひじ", &ELBOW_R),
    bone(BoneId::WristL, "wrist_l", "Left Wrist", "左手首", &WRIST_L),
    bone(BoneId::WristR, "wrist_r", "Right Wrist", "右手首", &WRIST_R),
    bone(BoneId::WristTwistL, "wrist_twist_l", "Left Wrist Twist", "左手捩", &TWIST),
    bone(BoneId::WristTwistR, "wrist_twist_r", "Right Wrist Twist", "右手捩", &TWIST),
    bone(BoneId::LegL, "leg_l", "Left Leg", "左足", &LEG_L),
    bone(BoneId::LegR, "leg_r", "Right Leg", "右足", &LEG_R),
    bone(BoneId::KneeL, "knee_l", "Left Knee", "左ひざ", &KNEE),
    bone(BoneId::KneeR, "knee_r", "Right Knee", "右ひざ", &KNEE),
    bone(BoneId::AnkleL, "ankle_l", "Left Ankle", "左足首", &ANKLE),
    bone(BoneId::AnkleR, "ankle_r", "Right Ankle", "右足首", &ANKLE),
    bone(BoneId::ToeL, "toe_l", "Left Toe", "左足先EX", &TOE),
    bone(BoneId::ToeR, "toe_r", "Right Toe", "右足先EX", &TOE),
    bone(BoneId::Thumb0L, "thumb_0_l", "Left Thumb 0", "左親指０", &THUMB_L),
    bone(BoneId::Thumb1L, "thumb_1_l", "Left Thumb 1", "左親指１", &THUMB_L),
    bone(BoneId::Thumb2L, "thumb_2_l", "Left Thumb 2", "左親指２", &THUMB_L),
    bone(BoneId::Index0L, "index_0_l", "Left Index 1", "左人指１", &FINGER_ROOT_L),
    bone(BoneId::Index1L, "index_1_l", "Left Index 2", "左人指２", &FINGER_L),
    bone(BoneId::Index2L, "index_2_l", "Left Index 3", "左人指３", &FINGER_L),
    bone(BoneId::Middle0L, "middle_0_l", "Left Middle 1", "左中指１", &FINGER_ROOT_L),
    bone(BoneId::Middle1L, "middle_1_l", "Left Middle 2", "左中指２", &FINGER_L),
    bone(BoneId::Middle2L, "middle_2_l", "Left Middle 3", "左中指３", &FINGER_L),
    bone(BoneId::Ring0L, "ring_0_l", "Left Ring 1", "左薬指１", &FINGER_ROOT_L),
    bone(BoneId::Ring1L, "ring_1_l", "Left Ring 2", "左薬指２", &FINGER_L),
    bone(BoneId::Ring2L, "ring_2_l", "Left Ring 3", "左薬指３", &FINGER_L),
    bone(BoneId::Pinky0L, "pinky_0_l", "Left Pinky 1", "左小指１", &FINGER_ROOT_L),
    bone(BoneId::Pinky1L, "pinky_1_l", "Left Pinky 2", "左小指２", &FINGER_L),
    bone(BoneId::Pinky2L, "pinky_2_l", "Left Pinky 3", "左小指３", &FINGER_L),
    bone(BoneId::Thumb0R, "thumb_0_r", "Right Thumb 0", "右親指０", &THUMB_ROOT_R),
    bone(BoneId::Thumb1R, "thumb_1_r", "Right Thumb 1", "右親指１", &THUMB_R),
    bone(BoneId::Thumb2R, "thumb_2_r", "Right Thumb 2", "右親指２", &THUMB_R),
    bone(BoneId::Index0R, "index_0_r", "Right Index 1", "右人指１", &INDEX_ROOT_R),
    bone(BoneId::Index1R, "index_1_r", "Right Index 2", "右人指２", &FINGER_R),
    bone(BoneId::Index2R, "index_2_r", "Right Index 3", "右人指３", &FINGER_R),
    bone(BoneId::Middle0R, "middle_0_r", "Right Middle 1", "右中指１", &FINGER_ROOT_R),
    bone(BoneId::Middle1R, "middle_1_r", "Right Middle 2", "右中指２", &FINGER_R),
    bone(BoneId::Middle2R, "middle_2_r", "Right Middle 3", "右中指３", &FINGER_R),
    bone(BoneId::Ring0R, "ring_0_r", "Right Ring 1", "右薬指１", &FINGER_ROOT_R),
    bone(BoneId::Ring1R, "ring_1_r", "Right Ring 2", "右薬指２", &FINGER_R),
    bone(BoneId::Ring2R, "ring_2_r", "Right Ring 3", "右薬指３", &FINGER_R),
    bone(BoneId::Pinky0R, "pinky_0_r", "Right Pinky 1", "右小指１", &FINGER_ROOT_R),
    bone(BoneId::Pinky1R, "pinky_1_r", "Right Pinky 2", "右小指２", &FINGER_R),
    bone(BoneId::Pinky2R, "pinky_2_r", "Right Pinky 3", "右小指３", &FINGER_R),
];

impl BoneId {
    /// Static definition for this bone
    #[inline]
    pub fn def(self) -> &'static BoneDef {
        &BONE_DEFS[self.index()]
    }

    /// Canonical DSL key
    #[inline]
    pub fn key(self) -> &'static str {
        self.def().key
    }

    /// Rule for an (action, direction) pair, `None` if the bone does not allow it
    pub fn rule(self, action: Action, direction: Direction) -> Option<&'static ActionRule> {
        self.def()
            .rules
            .iter()
            .find(|rule| rule.action == action && rule.direction == direction)
    }

    /// Rotation rules in enumeration order (translations excluded)
    pub fn rotation_rules(self) -> impl Iterator<Item = &'static ActionRule> {
        self.def().rules.iter().filter(|rule| rule.action.is_rotation())
    }

    /// Translation rules in enumeration order
    pub fn translation_rules(self) -> impl Iterator<Item = &'static ActionRule> {
        self.def()
            .rules
            .iter()
            .filter(|rule| !rule.action.is_rotation())
    }

    /// True if the bone accepts `move` statements
    pub fn is_movable(self) -> bool {
        self.translation_rules().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_id() {
        for (i, def) in BONE_DEFS.iter().enumerate() {
            assert_eq!(def.id.index(), i, "{} is out of place", def.key);
            assert_eq!(BoneId::ALL[i], def.id);
        }
    }

    #[test]
    fn test_head_rules_match_rig() {
        let turn_left = BoneId::Head.rule(Action::Turn, Direction::Left).unwrap();
        assert_eq!(turn_left.axis, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(turn_left.limit, 90.0);

        let bend_forward = BoneId::Head.rule(Action::Bend, Direction::Forward).unwrap();
        assert_eq!(bend_forward.limit, 60.0);
        assert!(BoneId::Head.rule(Action::Move, Direction::Up).is_none());
    }

    #[test]
    fn test_knee_only_bends_backward() {
        assert!(BoneId::KneeL.rule(Action::Bend, Direction::Forward).is_none());
        assert_eq!(BoneId::KneeL.rotation_rules().count(), 1);
    }

    #[test]
    fn test_only_root_bones_move() {
        let movable: Vec<BoneId> = BoneId::ALL
            .into_iter()
            .filter(|bone| bone.is_movable())
            .collect();
        assert_eq!(movable, vec![BoneId::Base, BoneId::Center]);
        assert_eq!(BoneId::Center.translation_rules().count(), 6);
    }

    #[test]
    fn test_rotation_rules_keep_table_order() {
        let order: Vec<(Action, Direction)> = BoneId::Base
            .rotation_rules()
            .map(|rule| (rule.action, rule.direction))
            .collect();
        assert_eq!(
            order,
            vec![
                (Action::Bend, Direction::Forward),
                (Action::Bend, Direction::Backward),
                (Action::Turn, Direction::Left),
                (Action::Turn, Direction::Right),
                (Action::Sway, Direction::Left),
                (Action::Sway, Direction::Right),
            ]
        );
    }
}
