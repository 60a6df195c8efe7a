//! Browser bindings

use crate::bone::{self, BoneFrame, BoneId, Locale};
use crate::compiler::Compiler;
use crate::config::CompilerConfig;
use crate::decompile::Decomposition;
use glam::Quat;
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Set up panic reporting and console logging; safe to call repeatedly
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

/// Decomposition as handed to JS
#[derive(Debug, Serialize)]
struct DecompileOutput {
    statements: Vec<String>,
    text: String,
    residual: f32,
}

impl From<&Decomposition> for DecompileOutput {
    fn from(result: &Decomposition) -> Self {
        Self {
            statements: result.statements.iter().map(ToString::to_string).collect(),
            text: result.to_string(),
            residual: result.residual,
        }
    }
}

#[wasm_bindgen]
pub struct MplCompiler {
    inner: Compiler,
}

#[wasm_bindgen]
impl MplCompiler {
    /// `config_json` is a `CompilerConfig` object; omitted fields take defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<MplCompiler, JsValue> {
        init();
        let config = match config_json.as_deref() {
            Some(json) if !json.trim().is_empty() => CompilerConfig::from_json(json).map_err(to_js)?,
            _ => CompilerConfig::default(),
        };
        Ok(Self {
            inner: Compiler::new(config),
        })
    }

    /// Compile script text to VMD bytes
    pub fn compile(&self, text: &str) -> Result<Vec<u8>, JsValue> {
        self.inner.compile_to_vmd(text).map_err(|err| {
            log::warn!("Compile failed: {}", err);
            to_js(err)
        })
    }

    /// Compile script text to a frame stream object
    #[wasm_bindgen(js_name = compileFrames)]
    pub fn compile_frames(&self, text: &str) -> Result<JsValue, JsValue> {
        let stream = self.inner.compile(text).map_err(to_js)?;
        serde_wasm_bindgen::to_value(&stream).map_err(to_js)
    }

    /// Decompose a quaternion into statements for `bone`.
    ///
    /// Returns `{ statements, text, residual }`; `tolerance` defaults to the
    /// configured one.
    pub fn decompile(
        &self,
        bone: &str,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
        tolerance: Option<f32>,
    ) -> Result<JsValue, JsValue> {
        let bone: BoneId = bone.parse().map_err(to_js)?;
        let rotation = Quat::from_xyzw(x, y, z, w);
        let result = match tolerance {
            Some(tolerance) => self.inner.decompile_with_tolerance(bone, rotation, tolerance),
            None => self.inner.decompile(bone, rotation),
        };
        serde_wasm_bindgen::to_value(&DecompileOutput::from(&result)).map_err(to_js)
    }

    /// Decompose an array of bone frames into a `@pose` block
    #[wasm_bindgen(js_name = decompilePose)]
    pub fn decompile_pose(&self, name: &str, frames: JsValue) -> Result<String, JsValue> {
        let frames: Vec<BoneFrame> = serde_wasm_bindgen::from_value(frames).map_err(to_js)?;
        Ok(self.inner.decompile_pose(name, &frames).to_string())
    }
}

#[wasm_bindgen(js_name = getAllBones)]
pub fn get_all_bones() -> Vec<String> {
    bone::list_bones().into_iter().map(String::from).collect()
}

/// Actions of `bone`, or `undefined` for an unknown bone
#[wasm_bindgen(js_name = getActions)]
pub fn get_actions(bone: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&bone::list_actions(bone)).map_err(to_js)
}

#[wasm_bindgen(js_name = getDirections)]
pub fn get_directions(bone: &str, action: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&bone::list_directions(bone, action)).map_err(to_js)
}

#[wasm_bindgen(js_name = getDegreeLimit)]
pub fn get_degree_limit(bone: &str, action: &str, direction: &str) -> Option<f32> {
    bone::degree_limit(bone, action, direction)
}

/// `locale` is `key`, `en` or `ja`
#[wasm_bindgen(js_name = getDisplayName)]
pub fn get_display_name(bone: &str, locale: &str) -> Option<String> {
    let locale = Locale::from_tag(locale)?;
    bone::display_name(bone, locale).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_compile_returns_vmd_bytes() {
        let compiler = MplCompiler::new(None).unwrap();
        let bytes = compiler.compile("head turn left 30").unwrap();
        assert_eq!(bytes.len(), 50 + 4 + 111 + 16);
    }

    #[wasm_bindgen_test]
    fn test_queries() {
        assert_eq!(get_all_bones().len(), BoneId::COUNT);
        assert_eq!(get_degree_limit("head", "turn", "left"), Some(90.0));
        assert_eq!(get_display_name("head", "ja").as_deref(), Some("頭"));
        assert!(get_actions("foot_l").unwrap().is_undefined());
    }

    #[wasm_bindgen_test]
    fn test_decompile_unknown_bone_is_error() {
        let compiler = MplCompiler::new(None).unwrap();
        assert!(compiler.decompile("foot_l", 0.0, 0.0, 0.0, 1.0, None).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decompile_reports_residual() {
        let compiler = MplCompiler::new(Some(r#"{"decompile": {"seed": 3}}"#.to_string())).unwrap();
        let q = Quat::from_rotation_y(-(30f32.to_radians()));
        let value = compiler.decompile("head", q.x, q.y, q.z, q.w, Some(1e-3)).unwrap();
        assert!(value.is_object());

        let result = compiler.inner.decompile_with_tolerance(BoneId::Head, q, 1e-3);
        let output = DecompileOutput::from(&result);
        assert_eq!(output.statements, vec!["head turn left 30"]);
        assert_eq!(output.text, "head turn left 30");
        assert!(output.residual <= 1e-3);
    }
}
