//! MPL pose compiler - Wasm Core
//!
//! Compiles motion-pose scripts (`head turn left 30; ...`) into keyframed
//! bone rotations and VMD motion files, and decomposes rotations back into
//! statements.

use cfg_if::cfg_if;

pub mod animation;
pub mod bone;
pub mod compiler;
pub mod config;
pub mod decompile;
pub mod error;
mod math;
pub mod parser;
mod simplex;
pub mod statement;
pub mod vmd;

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub mod wasm;
        pub use wasm::{
            MplCompiler, get_actions, get_all_bones, get_degree_limit, get_directions,
            get_display_name, init,
        };
    }
}

pub use bone::{
    Action, BoneFrame, BoneId, BoneMask, Direction, FrameStream, KeyFrame, Locale, Pose,
    degree_limit, display_name, list_actions, list_bones, list_directions,
};
pub use compiler::{Compiler, compile, compile_to_vmd, decompile};
pub use config::{CompilerConfig, DecompileConfig};
pub use decompile::Decomposition;
pub use error::{CompileError, Diagnostic, EncodeError, Error, MplError};
pub use glam::{Quat, Vec3};
pub use math::RotationExt;
pub use parser::{PoseDecl, Program, Script};
pub use statement::Statement;
