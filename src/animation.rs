use crate::bone::{BoneId, FrameStream, KeyFrame, Pose};
use crate::error::{CompileError, Diagnostic, MplError};
use crate::parser::{AnimationDecl, Program, Script};
use crate::statement::Statement;
use std::collections::HashMap;

/// Resolved poses of one program, by name
///
/// Built once per compile, read-only while timelines are resolved.
#[derive(Debug, Clone, Default)]
pub struct PoseLibrary {
    poses: HashMap<String, Pose>,
}

impl PoseLibrary {
    /// Synthesize every pose block
    pub fn resolve(program: &Program) -> Result<Self, CompileError> {
        let mut poses = HashMap::new();
        let mut diagnostics = Vec::new();

        for decl in &program.poses {
            match Pose::from_statements(&decl.statements) {
                Ok(pose) => {
                    poses.insert(decl.name.clone(), pose);
                }
                Err(error) => {
                    diagnostics.push(Diagnostic::new(decl.line, format!("@pose {}", decl.name), error))
                }
            }
        }

        if diagnostics.is_empty() {
            Ok(Self { poses })
        } else {
            Err(CompileError::new(diagnostics))
        }
    }

    pub fn get(&self, name: &str) -> Option<&Pose> {
        self.poses.get(name)
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

/// One animation resolved to `(time, pose)` pairs, times relative to its start
#[derive(Debug, Clone)]
pub struct Timeline {
    pub name: String,
    pub keys: Vec<(f32, Pose)>,
}

impl Timeline {
    /// Time of the last key
    pub fn duration(&self) -> f32 {
        self.keys.last().map_or(0.0, |(time, _)| *time)
    }
}

/// Union the poses named in one timeline entry.
/// Two poses setting the same bone is a `CombinationConflict`.
fn combine_poses(library: &PoseLibrary, names: &[String], program: &Program) -> Result<Pose, MplError> {
    let mut parts: Vec<(&str, &Pose)> = Vec::with_capacity(names.len());
    let mut combined = Pose::identity();

    for name in names {
        let pose = library.get(name).ok_or_else(|| MplError::UnknownReference {
            kind: if program.animation(name).is_some() {
                "pose (found an animation)"
            } else {
                "pose"
            },
            name: name.clone(),
        })?;

        combined = combined.combine(pose).map_err(|bone: BoneId| {
            let first = parts
                .iter()
                .find(|(_, part)| part.touched.contains(bone))
                .map_or("", |(first, _)| *first);
            MplError::CombinationConflict {
                bone: bone.key().to_string(),
                first: first.to_string(),
                second: name.clone(),
            }
        })?;
        parts.push((name, pose));
    }

    Ok(combined)
}

/// Resolve one animation block against the pose library
pub fn resolve_timeline(
    library: &PoseLibrary,
    animation: &AnimationDecl,
    program: &Program,
) -> Result<Timeline, CompileError> {
    let mut keys = Vec::with_capacity(animation.entries.len());
    let mut diagnostics = Vec::new();

    for entry in &animation.entries {
        match combine_poses(library, &entry.poses, program) {
            Ok(pose) => keys.push((entry.time, pose)),
            Err(error) => diagnostics.push(Diagnostic::new(
                entry.line,
                format!("{}: {}", entry.time, entry.poses.join(" & ")),
                error,
            )),
        }
    }

    if diagnostics.is_empty() {
        Ok(Timeline {
            name: animation.name.clone(),
            keys,
        })
    } else {
        Err(CompileError::new(diagnostics))
    }
}

/// Chain timelines end to start into keyframes.
///
/// Each timeline starts where the previous one's last key sits, and at least
/// one frame after the previous start. A key that lands on the previous
/// keyframe's time merges into it, later bones winning.
pub fn chain(timelines: &[&Timeline], frame_rate: f32) -> FrameStream {
    let mut merged: Vec<(f32, Pose)> = Vec::new();
    let mut cursor = 0.0f32;
    let min_advance = if frame_rate > 0.0 { 1.0 / frame_rate } else { 0.0 };

    for timeline in timelines {
        for (time, pose) in &timeline.keys {
            let at = cursor + time;
            match merged.last_mut() {
                Some((last, existing)) if (*last - at).abs() <= f32::EPSILON * at.max(1.0) => {
                    *existing = existing.clone().overlay(pose);
                }
                _ => merged.push((at, pose.clone())),
            }
        }
        cursor += timeline.duration().max(min_advance);
    }

    let keyframes = merged
        .into_iter()
        .map(|(time, pose)| KeyFrame {
            time,
            bones: pose.bone_frames(),
        })
        .collect();
    FrameStream::new(frame_rate, keyframes)
}

/// Resolve a whole program into a frame stream
pub fn resolve_program(program: &Program, frame_rate: f32) -> Result<FrameStream, CompileError> {
    let library = PoseLibrary::resolve(program)?;
    let mut diagnostics = Vec::new();

    let mut timelines: HashMap<&str, Timeline> = HashMap::new();
    for animation in &program.animations {
        match resolve_timeline(&library, animation, program) {
            Ok(timeline) => {
                timelines.insert(animation.name.as_str(), timeline);
            }
            Err(error) => diagnostics.extend(error.diagnostics),
        }
    }

    let Some(main) = &program.main else {
        diagnostics.push(Diagnostic::new(1, "", MplError::syntax("missing main block")));
        return Err(CompileError::new(diagnostics));
    };

    let mut selected = Vec::with_capacity(main.len());
    for entry in main {
        match timelines.get(entry.name.as_str()) {
            Some(timeline) => selected.push(timeline),
            None if program.animation(&entry.name).is_some() => {
                // Failed to resolve; already reported
            }
            None => diagnostics.push(Diagnostic::new(
                entry.line,
                entry.name.clone(),
                MplError::UnknownReference {
                    kind: if program.pose(&entry.name).is_some() {
                        "animation (found a pose)"
                    } else {
                        "animation"
                    },
                    name: entry.name.clone(),
                },
            )),
        }
    }

    if !diagnostics.is_empty() {
        diagnostics.sort_by_key(|d| d.line);
        return Err(CompileError::new(diagnostics));
    }

    let stream = chain(&selected, frame_rate);
    log::debug!(
        "Resolved {} poses and {} animations into {} keyframes",
        library.len(),
        timelines.len(),
        stream.keyframes.len()
    );
    Ok(stream)
}

/// A flat statement list is a single keyframe at time zero
pub fn resolve_statements(statements: &[Statement], frame_rate: f32) -> Result<FrameStream, CompileError> {
    if statements.is_empty() {
        return Ok(FrameStream::new(frame_rate, Vec::new()));
    }
    let pose = Pose::from_statements(statements)
        .map_err(|error| CompileError::single(1, "", error))?;
    Ok(FrameStream::new(
        frame_rate,
        vec![KeyFrame {
            time: 0.0,
            bones: pose.bone_frames(),
        }],
    ))
}

/// Resolve either script form
pub fn resolve(script: &Script, frame_rate: f32) -> Result<FrameStream, CompileError> {
    match script {
        Script::Statements(statements) => resolve_statements(statements, frame_rate),
        Script::Program(program) => resolve_program(program, frame_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn compile(text: &str) -> Result<FrameStream, CompileError> {
        let script = parse(text)?;
        resolve(&script, 60.0)
    }

    fn bones(keyframe: &KeyFrame) -> Vec<BoneId> {
        keyframe.bones.iter().map(|b| b.bone).collect()
    }

    #[test]
    fn test_flat_script_is_one_keyframe() {
        let stream = compile("head turn left 30; neck bend forward 10").unwrap();
        assert_eq!(stream.keyframes.len(), 1);
        assert_eq!(stream.keyframes[0].time, 0.0);
        assert_eq!(bones(&stream.keyframes[0]), vec![BoneId::Neck, BoneId::Head]);
        assert!(compile("").unwrap().keyframes.is_empty());
    }

    #[test]
    fn test_timeline_keyframes_in_order() {
        let stream = compile(
            "@pose a { head turn left 30; }
             @pose b { neck bend forward 10; }
             @pose c { arm_l sway left 20; }
             @animation move { 0.8: a; 0.9: b; 1.2: c; }
             main { move; }",
        )
        .unwrap();

        let times: Vec<f32> = stream.keyframes.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.8, 0.9, 1.2]);
        assert_eq!(bones(&stream.keyframes[0]), vec![BoneId::Head]);
        assert_eq!(bones(&stream.keyframes[1]), vec![BoneId::Neck]);
        assert_eq!(bones(&stream.keyframes[2]), vec![BoneId::ArmL]);
    }

    #[test]
    fn test_combination_unions_bones() {
        let stream = compile(
            "@pose a { head turn left 30; }
             @pose b { neck bend forward 10; }
             @animation both { 0: a & b; }
             main { both; }",
        )
        .unwrap();
        assert_eq!(bones(&stream.keyframes[0]), vec![BoneId::Neck, BoneId::Head]);
    }

    #[test]
    fn test_combination_conflict() {
        let err = compile(
            "@pose a { head turn left 30; }
             @pose b { head bend forward 10; }
             @animation both { 0: a & b; }
             main { both; }",
        )
        .unwrap_err();
        assert_eq!(
            err.first(),
            Some(&MplError::CombinationConflict {
                bone: "head".to_string(),
                first: "a".to_string(),
                second: "b".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_references() {
        let err = compile(
            "@pose a { head turn left 30; }
             @animation x { 0: missing; }
             main { x; a; nothing; }",
        )
        .unwrap_err();
        let kinds: Vec<&str> = err.errors().map(MplError::kind).collect();
        assert_eq!(kinds, vec!["UnknownReference"; 3]);
        assert!(err.to_string().contains("animation (found a pose)"));
    }

    #[test]
    fn test_missing_main() {
        let err = compile("@pose a { head turn left 30; }").unwrap_err();
        assert!(err.to_string().contains("missing main"));
    }

    #[test]
    fn test_zero_length_animation_keeps_its_frame() {
        let stream = compile(
            "@pose a { head turn left 30; }
             @pose b { neck bend forward 10; }
             @animation x { 0: a; }
             @animation y { 0: b; }
             main { x; y; }",
        )
        .unwrap();

        assert_eq!(stream.keyframes.len(), 2);
        assert_eq!(stream.keyframes[0].time, 0.0);
        assert!((stream.keyframes[1].time - 1.0 / 60.0).abs() < 1e-6);
        assert_eq!(bones(&stream.keyframes[0]), vec![BoneId::Head]);
        assert_eq!(bones(&stream.keyframes[1]), vec![BoneId::Neck]);
        assert_eq!(stream.keyframes[1].frame_number(60.0), Some(1));
    }

    #[test]
    fn test_main_chains_animations() {
        let stream = compile(
            "@pose a { head turn left 30; }
             @pose b { head turn right 30; }
             @pose c { neck bend forward 10; }
             @animation first { 0: a; 1: b; }
             @animation second { 0: c; 0.5: a; }
             main { first; second; first; }",
        )
        .unwrap();

        let times: Vec<f32> = stream.keyframes.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 1.5, 2.5]);

        // first ends at 1.0 where second starts: head from `b`, neck from `c`
        let boundary = &stream.keyframes[1];
        assert_eq!(bones(boundary), vec![BoneId::Neck, BoneId::Head]);

        // second ends at 1.5 where first restarts: `a` replaces `a`
        assert_eq!(bones(&stream.keyframes[2]), vec![BoneId::Head]);
        assert_eq!(stream.duration(), 2.5);
    }
}
