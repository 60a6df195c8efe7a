//! Inverse decomposition: target rotation back to pose statements.
//!
//! The search runs multi-start Nelder-Mead over the degree space of a bone's
//! rotation rules, then simplifies the winner so the emitted text stays short.
//! It never fails; callers get the closest statements found and the residual.

use crate::bone::clip::BoneFrame;
use crate::bone::id::BoneId;
use crate::bone::rules::ActionRule;
use crate::config::DecompileConfig;
use crate::math::{RotationExt, antiparallel, axis_angle, compose, round_to};
use crate::parser::PoseDecl;
use crate::simplex::{SimplexParams, SimplexResult, minimize};
use crate::statement::Statement;
use glam::{Quat, Vec3};
use rand::Rng;
use std::fmt;

/// Statements approximating one bone's rotation
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub bone: BoneId,
    /// In rule enumeration order
    pub statements: Vec<Statement>,
    /// `1 - |q·t|` between the statements' rotation and the target
    pub residual: f32,
}

impl Decomposition {
    /// Rotation the statements synthesize
    pub fn rotation(&self) -> Quat {
        synthesize(&self.statements)
    }

    pub fn is_exact(&self, tolerance: f32) -> bool {
        self.residual <= tolerance
    }
}

impl fmt::Display for Decomposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

/// Compose statement rotations in order; statements that fail to
/// synthesize contribute identity
fn synthesize(statements: &[Statement]) -> Quat {
    compose(
        statements
            .iter()
            .map(|statement| statement.rotation().unwrap_or(Quat::IDENTITY)),
    )
}

fn residual_of(statements: &[Statement], target: &Quat) -> f32 {
    synthesize(statements).rotation_distance(target)
}

/// Decompose `target` into rotation statements for `bone`
pub fn decompose<R: Rng + ?Sized>(
    bone: BoneId,
    target: Quat,
    config: &DecompileConfig,
    rng: &mut R,
) -> Decomposition {
    let length = target.length();
    if !length.is_finite() || length < 1e-6 {
        log::warn!("{}: cannot decompose degenerate rotation {:?}", bone, target);
        return Decomposition {
            bone,
            statements: Vec::new(),
            residual: 1.0,
        };
    }
    let target = target / length;

    let identity_distance = Quat::IDENTITY.rotation_distance(&target);
    if identity_distance <= config.tolerance {
        return Decomposition {
            bone,
            statements: Vec::new(),
            residual: identity_distance,
        };
    }

    let rules: Vec<&'static ActionRule> = bone.rotation_rules().collect();
    if let Some(single) = single_axis(bone, &rules, &target, config) {
        log::debug!("{}: single-axis match {}", bone, single);
        return single;
    }

    let degrees = search(&rules, &target, config, rng);
    let statements = to_statements(bone, &rules, &degrees, config.negligible_degrees);
    let statements = collapse_opposing(statements);
    let statements = prune_redundant(statements, &target, config.tolerance);
    let statements = round_statements(statements, config);

    let residual = residual_of(&statements, &target);
    if residual > config.tolerance {
        log::warn!(
            "{}: best decomposition misses target by {:.6} (tolerance {})",
            bone,
            residual,
            config.tolerance
        );
    } else {
        log::debug!("{}: decomposed with residual {:.6}", bone, residual);
    }

    Decomposition {
        bone,
        statements,
        residual,
    }
}

/// Answer a pure rotation about one legal axis with a single statement
fn single_axis(
    bone: BoneId,
    rules: &[&'static ActionRule],
    target: &Quat,
    config: &DecompileConfig,
) -> Option<Decomposition> {
    rules.iter().find_map(|rule| {
        let angle = target.angle_about(rule.axis)?;
        if angle <= config.negligible_degrees || angle > rule.limit + config.negligible_degrees {
            return None;
        }
        let statement = Statement {
            bone,
            action: rule.action,
            direction: rule.direction,
            degrees: round_to(angle, config.decimals).min(rule.limit),
        };
        let residual = residual_of(std::slice::from_ref(&statement), target);
        (residual <= config.tolerance).then(|| Decomposition {
            bone,
            statements: vec![statement],
            residual,
        })
    })
}

/// Starting points: zeros, random, half, alternating 30/70 percent of each limit.
/// Drawn up front so the result does not depend on execution order.
fn starting_points<R: Rng + ?Sized>(
    limits: &[f32],
    random_starts: usize,
    rng: &mut R,
) -> Vec<Vec<f32>> {
    let mut starts = vec![vec![0.0; limits.len()]];
    for _ in 0..random_starts {
        starts.push(limits.iter().map(|limit| rng.random::<f32>() * limit).collect());
    }
    starts.push(limits.iter().map(|limit| 0.5 * limit).collect());
    starts.push(
        limits
            .iter()
            .enumerate()
            .map(|(i, limit)| (if i % 2 == 0 { 0.3 } else { 0.7 }) * limit)
            .collect(),
    );
    starts
}

/// Multi-start Nelder-Mead; returns clamped degrees per rule
fn search<R: Rng + ?Sized>(
    rules: &[&'static ActionRule],
    target: &Quat,
    config: &DecompileConfig,
    rng: &mut R,
) -> Vec<f32> {
    let limits: Vec<f32> = rules.iter().map(|rule| rule.limit).collect();
    let steps: Vec<f32> = limits.iter().map(|limit| config.initial_step * limit).collect();
    let params = SimplexParams {
        max_iterations: config.max_iterations,
        tolerance: config.tolerance,
        ..SimplexParams::default()
    };
    let negligible = config.negligible_degrees;

    let objective = |degrees: &[f32]| -> f32 {
        let rotation = compose(rules.iter().zip(degrees).filter_map(|(rule, d)| {
            let d = d.clamp(0.0, rule.limit);
            if d > negligible {
                axis_angle(rule.axis, d)
            } else {
                None
            }
        }));
        rotation.rotation_distance(target)
    };

    let starts = starting_points(&limits, config.random_starts, rng);
    let results = run_starts(&objective, &starts, &steps, &params, config.parallel);

    // First strictly better result wins, so ties resolve in start order
    let mut best: Option<SimplexResult> = None;
    for result in results {
        log::debug!(
            "restart finished at {:.6} after {} iterations",
            result.value,
            result.iterations
        );
        if best
            .as_ref()
            .map_or(true, |current| result.value < current.value)
        {
            best = Some(result);
        }
    }

    best.map(|result| {
        result
            .point
            .iter()
            .zip(&limits)
            .map(|(d, limit)| d.clamp(0.0, *limit))
            .collect()
    })
    .unwrap_or_else(|| vec![0.0; limits.len()])
}

fn run_starts<F>(
    objective: &F,
    starts: &[Vec<f32>],
    steps: &[f32],
    params: &SimplexParams,
    parallel: bool,
) -> Vec<SimplexResult>
where
    F: Fn(&[f32]) -> f32 + Sync,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        if parallel && starts.len() > 1 {
            return std::thread::scope(|scope| {
                let handles: Vec<_> = starts
                    .iter()
                    .map(|start| scope.spawn(move || minimize(objective, start, steps, params)))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                    })
                    .collect()
            });
        }
    }
    #[cfg(target_arch = "wasm32")]
    let _ = parallel;

    starts
        .iter()
        .map(|start| minimize(objective, start, steps, params))
        .collect()
}

fn to_statements(
    bone: BoneId,
    rules: &[&'static ActionRule],
    degrees: &[f32],
    negligible: f32,
) -> Vec<Statement> {
    rules
        .iter()
        .zip(degrees)
        .filter(|(_, d)| **d > negligible)
        .map(|(rule, d)| Statement {
            bone,
            action: rule.action,
            direction: rule.direction,
            degrees: *d,
        })
        .collect()
}

/// Merge adjacent opposite-direction statements of one action into their net.
/// Only pairs on exactly opposite axes merge, which keeps the rotation unchanged.
pub fn collapse_opposing(statements: Vec<Statement>) -> Vec<Statement> {
    let mut out: Vec<Statement> = Vec::with_capacity(statements.len());
    for statement in statements {
        let merged = match out.last() {
            Some(prev) if opposes(prev, &statement) => {
                let net = prev.degrees - statement.degrees;
                Some(if net >= 0.0 {
                    Statement {
                        degrees: net,
                        ..*prev
                    }
                } else {
                    Statement {
                        degrees: -net,
                        ..statement
                    }
                })
            }
            _ => None,
        };
        match merged {
            Some(net) => {
                out.pop();
                if net.degrees > 0.0 {
                    out.push(net);
                }
            }
            None => out.push(statement),
        }
    }
    out
}

fn opposes(a: &Statement, b: &Statement) -> bool {
    if a.bone != b.bone || a.action != b.action || a.direction.opposite() != b.direction {
        return false;
    }
    match (a.rule(), b.rule()) {
        (Some(ra), Some(rb)) => antiparallel(ra.axis, rb.axis),
        _ => false,
    }
}

/// Greedily drop the smallest statements while the residual stays within tolerance
pub fn prune_redundant(statements: Vec<Statement>, target: &Quat, tolerance: f32) -> Vec<Statement> {
    let mut current = statements;
    if residual_of(&current, target) > tolerance {
        return current;
    }

    let mut order: Vec<usize> = (0..current.len()).collect();
    order.sort_by(|&a, &b| current[a].degrees.total_cmp(&current[b].degrees));

    let mut keep = vec![true; current.len()];
    for i in order {
        keep[i] = false;
        let candidate: Vec<Statement> = current
            .iter()
            .zip(&keep)
            .filter(|(_, k)| **k)
            .map(|(s, _)| *s)
            .collect();
        if residual_of(&candidate, target) > tolerance {
            keep[i] = true;
        }
    }

    let mut index = 0;
    current.retain(|_| {
        let kept = keep[index];
        index += 1;
        kept
    });
    current
}

fn round_statements(statements: Vec<Statement>, config: &DecompileConfig) -> Vec<Statement> {
    statements
        .into_iter()
        .filter_map(|statement| {
            let limit = statement.rule().map_or(0.0, |rule| rule.limit);
            let degrees = round_to(statement.degrees, config.decimals).clamp(0.0, limit);
            (degrees > config.negligible_degrees).then_some(Statement {
                degrees,
                ..statement
            })
        })
        .collect()
}

/// `move` statements reproducing a position offset on a movable bone.
/// Each axis component is clamped to its rule limit.
pub fn decompose_translation(bone: BoneId, offset: Vec3, config: &DecompileConfig) -> Vec<Statement> {
    bone.translation_rules()
        .filter_map(|rule| {
            let axis = rule.axis.try_normalize()?;
            let amount = round_to(offset.dot(axis), config.decimals).min(rule.limit);
            (amount > config.negligible_degrees).then_some(Statement {
                bone,
                action: rule.action,
                direction: rule.direction,
                degrees: amount,
            })
        })
        .collect()
}

/// Zero-amount statement on the bone's first rule; synthesizes identity
/// but still marks the bone as set
fn rest_statement(bone: BoneId) -> Option<Statement> {
    bone.def().rules.first().map(|rule| Statement {
        bone,
        action: rule.action,
        direction: rule.direction,
        degrees: 0.0,
    })
}

/// Decompose imported bone frames into a named pose block.
///
/// A frame at rest still gets a zero statement, so the block re-sets every
/// bone it was given and is never empty when `frames` is not.
pub fn decompose_pose<R: Rng + ?Sized>(
    name: &str,
    frames: &[BoneFrame],
    config: &DecompileConfig,
    rng: &mut R,
) -> PoseDecl {
    let mut statements = Vec::new();
    for frame in frames {
        let before = statements.len();
        statements.extend(decompose_translation(frame.bone, frame.position, config));
        statements.extend(decompose(frame.bone, frame.rotation, config, rng).statements);
        if statements.len() == before {
            statements.extend(rest_statement(frame.bone));
        }
    }
    PoseDecl {
        name: name.to_string(),
        line: 0,
        statements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bone::id::{Action, Direction};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config() -> DecompileConfig {
        DecompileConfig::default().with_seed(7)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn pose_rotation(text: &str) -> Quat {
        let statements: Vec<Statement> = text
            .split(';')
            .map(|s| s.parse().expect("valid statement"))
            .collect();
        synthesize(&statements)
    }

    #[test]
    fn test_identity_decomposes_to_nothing() {
        let result = decompose(BoneId::Head, Quat::IDENTITY, &config(), &mut rng());
        assert!(result.statements.is_empty());
        assert_eq!(result.residual, 0.0);
        assert_eq!(result.to_string(), "");
    }

    #[test]
    fn test_single_statement_round_trip() {
        let target = pose_rotation("head turn left 30");
        let result = decompose(BoneId::Head, target, &config(), &mut rng());
        assert_eq!(result.statements.len(), 1);
        assert_eq!(result.to_string(), "head turn left 30");
        assert!(result.residual <= 1e-4);
    }

    #[test]
    fn test_sign_flipped_target_decomposes_the_same() {
        let target = pose_rotation("neck bend forward 20");
        let a = decompose(BoneId::Neck, target, &config(), &mut rng());
        let b = decompose(BoneId::Neck, -target, &config(), &mut rng());
        assert_eq!(a.statements, b.statements);
    }

    #[test]
    fn test_two_axis_target_within_tolerance() {
        let target = pose_rotation("head turn left 30; head bend backward 20");
        let result = decompose(BoneId::Head, target, &config(), &mut rng());
        assert!(
            result.residual <= 1e-3,
            "residual {} for {}",
            result.residual,
            result
        );
        let resynthesized = result.rotation();
        assert!(resynthesized.rotation_distance(&target) <= 1e-3);
    }

    #[test]
    fn test_unreachable_target_reports_residual() {
        // Knees only bend one way
        let target = axis_angle(Vec3::Y, 90.0).unwrap();
        let result = decompose(BoneId::KneeL, target, &config(), &mut rng());
        assert!(result.residual > 1e-2);
        for statement in &result.statements {
            let limit = statement.rule().unwrap().limit;
            assert!((0.0..=limit).contains(&statement.degrees));
        }
    }

    #[test]
    fn test_degenerate_target() {
        let result = decompose(BoneId::Head, Quat::from_xyzw(0.0, 0.0, 0.0, 0.0), &config(), &mut rng());
        assert!(result.statements.is_empty());
        assert_eq!(result.residual, 1.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let target = pose_rotation("waist bend forward 25; waist sway left 12");
        let sequential = decompose(BoneId::Waist, target, &config(), &mut rng());
        let parallel_config = DecompileConfig {
            parallel: true,
            ..config()
        };
        let parallel = decompose(BoneId::Waist, target, &parallel_config, &mut rng());
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_same_seed_same_output() {
        let target = pose_rotation("upper_body turn right 15; upper_body sway left 10");
        let a = decompose(BoneId::UpperBody, target, &config(), &mut rng());
        let b = decompose(BoneId::UpperBody, target, &config(), &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_collapse_opposing_pairs() {
        let bend = |direction, degrees| Statement {
            bone: BoneId::Head,
            action: Action::Bend,
            direction,
            degrees,
        };
        let collapsed = collapse_opposing(vec![bend(Direction::Forward, 10.0), bend(Direction::Backward, 25.0)]);
        assert_eq!(collapsed, vec![bend(Direction::Backward, 15.0)]);

        let cancelled = collapse_opposing(vec![bend(Direction::Forward, 10.0), bend(Direction::Backward, 10.0)]);
        assert!(cancelled.is_empty());
    }

    #[test]
    fn test_collapse_skips_non_opposite_axes() {
        // Wrist bend axes are not mirror images
        let wrist = |direction, degrees| Statement {
            bone: BoneId::WristL,
            action: Action::Bend,
            direction,
            degrees,
        };
        let statements = vec![wrist(Direction::Forward, 10.0), wrist(Direction::Backward, 5.0)];
        assert_eq!(collapse_opposing(statements.clone()), statements);
    }

    #[test]
    fn test_prune_drops_tiny_statements() {
        let target = pose_rotation("head turn left 30");
        let statements = vec![
            Statement {
                bone: BoneId::Head,
                action: Action::Turn,
                direction: Direction::Left,
                degrees: 30.0,
            },
            Statement {
                bone: BoneId::Head,
                action: Action::Sway,
                direction: Direction::Left,
                degrees: 0.02,
            },
        ];
        let pruned = prune_redundant(statements, &target, 1e-4);
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].action, Action::Turn);
    }

    #[test]
    fn test_translation_decomposition() {
        let statements = decompose_translation(BoneId::Center, Vec3::new(-2.0, 5.0, 0.0), &config());
        let text: Vec<String> = statements.iter().map(ToString::to_string).collect();
        assert_eq!(text, vec!["center move right 2", "center move up 5"]);
        assert!(decompose_translation(BoneId::Head, Vec3::ONE, &config()).is_empty());
    }

    #[test]
    fn test_pose_decomposition_renders_block() {
        let frames = vec![
            BoneFrame {
                bone: BoneId::Head,
                position: Vec3::ZERO,
                rotation: pose_rotation("head turn left 30"),
            },
            BoneFrame {
                bone: BoneId::Center,
                position: Vec3::new(0.0, 3.0, 0.0),
                rotation: Quat::IDENTITY,
            },
        ];
        let pose = decompose_pose("look", &frames, &config(), &mut rng());
        assert_eq!(
            pose.to_string(),
            "@pose look {\n    head turn left 30;\n    center move up 3;\n}"
        );
    }

    #[test]
    fn test_rest_frames_keep_a_zero_statement() {
        let frames = vec![
            BoneFrame {
                bone: BoneId::Head,
                position: Vec3::ZERO,
                rotation: Quat::IDENTITY,
            },
            BoneFrame {
                bone: BoneId::Neck,
                position: Vec3::ZERO,
                rotation: pose_rotation("neck bend forward 10"),
            },
        ];
        let pose = decompose_pose("rest", &frames, &config(), &mut rng());
        assert_eq!(
            pose.to_string(),
            "@pose rest {\n    head bend forward 0;\n    neck bend forward 10;\n}"
        );
        assert!(decompose_pose("none", &[], &config(), &mut rng()).statements.is_empty());
    }
}
