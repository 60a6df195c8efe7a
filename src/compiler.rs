//! Entry points tying parser, synthesizer, decomposer and VMD writer together.

use crate::animation;
use crate::bone::{BoneFrame, BoneId, FrameStream};
use crate::config::{CompilerConfig, DecompileConfig};
use crate::decompile::{self, Decomposition};
use crate::error::{CompileError, Error};
use crate::parser::{self, PoseDecl, Script};
use crate::vmd;
use glam::Quat;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Stateless compiler; every call derives its result from the input text
/// and the static rule table alone.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn parse(&self, text: &str) -> Result<Script, CompileError> {
        parser::parse(text)
    }

    /// Compile a flat statement list or a full program into keyframes
    pub fn compile(&self, text: &str) -> Result<FrameStream, CompileError> {
        let script = self.parse(text)?;
        let stream = animation::resolve(&script, self.config.frame_rate)?;
        log::debug!(
            "Compiled {} keyframes ({} bone records)",
            stream.keyframes.len(),
            stream.record_count()
        );
        Ok(stream)
    }

    /// Compile straight to VMD bytes
    pub fn compile_to_vmd(&self, text: &str) -> Result<Vec<u8>, Error> {
        let stream = self.compile(text)?;
        Ok(vmd::encode(&stream, &self.config.model_name)?)
    }

    /// Compile to the JSON frame stream
    pub fn compile_to_json(&self, text: &str) -> Result<String, Error> {
        let stream = self.compile(text)?;
        Ok(stream.to_json_string()?)
    }

    /// Decompose with the configured tolerance
    pub fn decompile(&self, bone: BoneId, rotation: Quat) -> Decomposition {
        self.decompile_with(bone, rotation, &self.config.decompile)
    }

    /// Decompose with an explicit tolerance
    pub fn decompile_with_tolerance(&self, bone: BoneId, rotation: Quat, tolerance: f32) -> Decomposition {
        let config = self.config.decompile.clone().with_tolerance(tolerance);
        self.decompile_with(bone, rotation, &config)
    }

    fn decompile_with(&self, bone: BoneId, rotation: Quat, config: &DecompileConfig) -> Decomposition {
        match config.seed {
            Some(seed) => decompile::decompose(bone, rotation, config, &mut StdRng::seed_from_u64(seed)),
            None => decompile::decompose(bone, rotation, config, &mut rand::rng()),
        }
    }

    /// Decompose imported bone frames into a `@pose` block
    pub fn decompile_pose(&self, name: &str, frames: &[BoneFrame]) -> PoseDecl {
        let config = &self.config.decompile;
        match config.seed {
            Some(seed) => {
                decompile::decompose_pose(name, frames, config, &mut StdRng::seed_from_u64(seed))
            }
            None => decompile::decompose_pose(name, frames, config, &mut rand::rng()),
        }
    }
}

/// Compile with default settings
pub fn compile(text: &str) -> Result<FrameStream, CompileError> {
    Compiler::default().compile(text)
}

/// Compile to VMD bytes with default settings
pub fn compile_to_vmd(text: &str) -> Result<Vec<u8>, Error> {
    Compiler::default().compile_to_vmd(text)
}

/// Decompose with default settings and the given tolerance
pub fn decompile(bone: BoneId, rotation: Quat, tolerance: f32) -> Decomposition {
    Compiler::default().decompile_with_tolerance(bone, rotation, tolerance)
}
