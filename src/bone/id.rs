/// Unique identifier for each controllable bone of the humanoid rig.
/// Ordered trunk first, then limbs left before right, then fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BoneId {
    // Root and trunk
    Base = 0,
    Center = 1,
    UpperBody = 2,
    UpperBody2 = 3,
    LowerBody = 4,
    Waist = 5,
    Neck = 6,
    Head = 7,

    // Arms
    ShoulderL = 8,
    ShoulderR = 9,
    ArmL = 10,
    ArmR = 11,
    ArmTwistL = 12,
    ArmTwistR = 13,
    ElbowL = 14,
    ElbowR = 15,
    WristL = 16,
    WristR = 17,
    WristTwistL = 18,
    WristTwistR = 19,

    // Legs
    LegL = 20,
    LegR = 21,
    KneeL = 22,
    KneeR = 23,
    AnkleL = 24,
    AnkleR = 25,
    ToeL = 26,
    ToeR = 27,

    // Left hand
    Thumb0L = 28,
    Thumb1L = 29,
    Thumb2L = 30,
    Index0L = 31,
    Index1L = 32,
    Index2L = 33,
    Middle0L = 34,
    Middle1L = 35,
    Middle2L = 36,
    Ring0L = 37,
    Ring1L = 38,
    Ring2L = 39,
    Pinky0L = 40,
    Pinky1L = 41,
    Pinky2L = 42,

    // Right hand
    Thumb0R = 43,
    Thumb1R = 44,
    Thumb2R = 45,
    Index0R = 46,
    Index1R = 47,
    Index2R = 48,
    Middle0R = 49,
    Middle1R = 50,
    Middle2R = 51,
    Ring0R = 52,
    Ring1R = 53,
    Ring2R = 54,
    Pinky0R = 55,
    Pinky1R = 56,
    Pinky2R = 57,
}

impl BoneId {
    /// Total number of bones in the rule table
    pub const COUNT: usize = 58;

    /// Convert to array index
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// All bone IDs in table order
    pub const ALL: [BoneId; Self::COUNT] = [
        BoneId::Base,
        BoneId::Center,
        BoneId::UpperBody,
        BoneId::UpperBody2,
        BoneId::LowerBody,
        BoneId::Waist,
        BoneId::Neck,
        BoneId::Head,
        BoneId::ShoulderL,
        BoneId::ShoulderR,
        BoneId::ArmL,
        BoneId::ArmR,
        BoneId::ArmTwistL,
        BoneId::ArmTwistR,
        BoneId::ElbowL,
        BoneId::ElbowR,
        BoneId::WristL,
        BoneId::WristR,
        BoneId::WristTwistL,
        BoneId::WristTwistR,
        BoneId::LegL,
        BoneId::LegR,
        BoneId::KneeL,
        BoneId::KneeR,
        BoneId::AnkleL,
        BoneId::AnkleR,
        BoneId::ToeL,
        BoneId::ToeR,
        BoneId::Thumb0L,
        BoneId::Thumb1L,
        BoneId::Thumb2L,
        BoneId::Index0L,
        BoneId::Index1L,
        BoneId::Index2L,
        BoneId::Middle0L,
        BoneId::Middle1L,
        BoneId::Middle2L,
        BoneId::Ring0L,
        BoneId::Ring1L,
        BoneId::Ring2L,
        BoneId::Pinky0L,
        BoneId::Pinky1L,
        BoneId::Pinky2L,
        BoneId::Thumb0R,
        BoneId::Thumb1R,
        BoneId::Thumb2R,
        BoneId::Index0R,
        BoneId::Index1R,
        BoneId::Index2R,
        BoneId::Middle0R,
        BoneId::Middle1R,
        BoneId::Middle2R,
        BoneId::Ring0R,
        BoneId::Ring1R,
        BoneId::Ring2R,
        BoneId::Pinky0R,
        BoneId::Pinky1R,
        BoneId::Pinky2R,
    ];
}

/// Motion family of a statement.
/// `Move` is a translation; the others rotate the bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Bend,
    Turn,
    Sway,
    Move,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Bend, Action::Turn, Action::Sway, Action::Move];

    /// DSL keyword
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Bend => "bend",
            Action::Turn => "turn",
            Action::Sway => "sway",
            Action::Move => "move",
        }
    }

    /// Case-insensitive keyword lookup
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(word))
    }

    #[inline]
    pub const fn is_rotation(self) -> bool {
        !matches!(self, Action::Move)
    }
}

/// Sense of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// DSL keyword
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Case-insensitive keyword lookup
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.as_str().eq_ignore_ascii_case(word))
    }

    /// The direction that undoes this one
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}
