//! Derivative-free minimization with the Nelder-Mead downhill simplex.

/// Nelder-Mead coefficients and stopping rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexParams {
    pub max_iterations: usize,
    /// Stop once the spread between best and worst vertex is below this
    pub tolerance: f32,
    /// Reflection
    pub alpha: f32,
    /// Expansion
    pub gamma: f32,
    /// Contraction
    pub rho: f32,
    /// Shrink
    pub sigma: f32,
}

impl Default for SimplexParams {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-4,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }
}

/// Best vertex found by `minimize`
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexResult {
    pub point: Vec<f32>,
    pub value: f32,
    pub iterations: usize,
}

/// Smallest step used when a dimension's requested step is zero
const MIN_STEP: f32 = 1e-3;

/// Minimize `objective` with the Nelder-Mead downhill simplex method
///
/// # Arguments
/// * `objective` - Function to minimize; must accept any point
/// * `initial` - Starting vertex
/// * `steps` - Offset along each dimension for the other initial vertices
/// * `params` - Coefficients and stopping rules
///
/// # Returns
/// * `SimplexResult` - Best vertex, its value and the iterations used
pub fn minimize<F>(objective: F, initial: &[f32], steps: &[f32], params: &SimplexParams) -> SimplexResult
where
    F: Fn(&[f32]) -> f32,
{
    let n = initial.len();
    if n == 0 {
        return SimplexResult {
            point: Vec::new(),
            value: objective(initial),
            iterations: 0,
        };
    }

    // n + 1 vertices: the start and one step along each axis
    let mut vertices: Vec<Vec<f32>> = Vec::with_capacity(n + 1);
    vertices.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        let step = steps.get(i).copied().unwrap_or(0.0);
        vertex[i] += if step.abs() < MIN_STEP { MIN_STEP } else { step };
        vertices.push(vertex);
    }
    let mut values: Vec<f32> = vertices.iter().map(|v| objective(v)).collect();

    let mut iterations = 0;
    while iterations < params.max_iterations {
        sort_simplex(&mut vertices, &mut values);
        if values[n] - values[0] < params.tolerance {
            break;
        }
        iterations += 1;

        // Centroid of all but the worst vertex
        let mut centroid = vec![0.0f32; n];
        for vertex in &vertices[..n] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x / n as f32;
            }
        }

        let reflected = towards(&centroid, &vertices[n], -params.alpha);
        let reflected_value = objective(&reflected);

        if reflected_value < values[0] {
            let expanded = towards(&centroid, &reflected, params.gamma);
            let expanded_value = objective(&expanded);
            if expanded_value < reflected_value {
                vertices[n] = expanded;
                values[n] = expanded_value;
            } else {
                vertices[n] = reflected;
                values[n] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[n - 1] {
            vertices[n] = reflected;
            values[n] = reflected_value;
            continue;
        }

        let contracted = towards(&centroid, &vertices[n], params.rho);
        let contracted_value = objective(&contracted);
        if contracted_value < values[n] {
            vertices[n] = contracted;
            values[n] = contracted_value;
            continue;
        }

        // Shrink everything towards the best vertex
        let best = vertices[0].clone();
        for i in 1..=n {
            vertices[i] = towards(&best, &vertices[i], params.sigma);
            values[i] = objective(&vertices[i]);
        }
    }

    sort_simplex(&mut vertices, &mut values);
    SimplexResult {
        point: vertices.swap_remove(0),
        value: values[0],
        iterations,
    }
}

/// `origin + t * (point - origin)`
fn towards(origin: &[f32], point: &[f32], t: f32) -> Vec<f32> {
    origin
        .iter()
        .zip(point)
        .map(|(o, p)| o + t * (p - o))
        .collect()
}

/// Order vertices best first
fn sort_simplex(vertices: &mut Vec<Vec<f32>>, values: &mut Vec<f32>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *vertices = order.iter().map(|&i| vertices[i].clone()).collect();
    *values = order.iter().map(|&i| values[i]).collect();
}
