use super::id::BoneId;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

// ============================================================================
// Frame Stream
// ============================================================================

/// Default output rate, frames per second
pub const DEFAULT_FRAME_RATE: f32 = 60.0;

/// One bone's transform at a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneFrame {
    pub bone: BoneId,
    /// Offset from the bind position, zero for rotation-only bones
    #[serde(default)]
    pub position: Vec3,
    pub rotation: Quat,
}

/// Every bone set at one timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFrame {
    /// Seconds from the start of the stream
    pub time: f32,
    pub bones: Vec<BoneFrame>,
}

impl KeyFrame {
    /// Frame index at the given rate, `None` if it does not fit a `u32`
    pub fn frame_number(&self, frame_rate: f32) -> Option<u32> {
        let frame = (self.time * frame_rate).round();
        if frame.is_finite() && frame >= 0.0 && frame < u32::MAX as f32 {
            Some(frame as u32)
        } else {
            None
        }
    }
}

/// Compiled, time-ordered keyframes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStream {
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    pub keyframes: Vec<KeyFrame>,
}

fn default_frame_rate() -> f32 {
    DEFAULT_FRAME_RATE
}

impl Default for FrameStream {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            keyframes: Vec::new(),
        }
    }
}

impl FrameStream {
    pub fn new(frame_rate: f32, keyframes: Vec<KeyFrame>) -> Self {
        Self {
            frame_rate,
            keyframes,
        }
    }

    /// Timestamp of the last keyframe
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |kf| kf.time)
    }

    /// Total bone records across keyframes
    pub fn record_count(&self) -> usize {
        self.keyframes.iter().map(|kf| kf.bones.len()).sum()
    }

    /// Flattened `(time, frame)` records in stream order
    pub fn records(&self) -> impl Iterator<Item = (f32, &BoneFrame)> {
        self.keyframes
            .iter()
            .flat_map(|kf| kf.bones.iter().map(move |frame| (kf.time, frame)))
    }

    /// Export to JSON string
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
