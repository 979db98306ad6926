//! Rapidly-exploring random tree bolt generator (raster plane).
//!
//! The tree grows from the cloud base toward a goal disc at the bottom of the
//! raster. Each iteration samples a target (goal-biased, optionally pulled
//! toward center-bottom by the electrical field), steps from the nearest
//! existing node, and jitters the step perpendicular to its direction.
//! Running out of iterations before reaching the goal is a valid outcome —
//! the bolt just never touches down.

use crate::geometry::{distance_squared, length};
use crate::segment::{Raster, Segment};
use crate::util::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrtParams {
    /// Distance of each tree extension in pixels
    pub step_size: f32,
    /// Probability of sampling inside the goal region, 0..1
    pub goal_bias: f32,
    /// Tree extension budget
    pub max_iterations: u32,
    /// Chance of spawning branch children from a fresh node, 0..1
    pub branch_probability: f32,
    /// Perpendicular step noise, 0..1 of the step size
    pub jaggedness: f32,
    /// Radius of the bottom goal disc in pixels
    pub goal_radius: f32,
    /// Sampling bias toward center-bottom, 0..1
    pub electrical_field: f32,
    /// Root position across the top, 0..1
    pub start_x: f32,
    pub raster: Raster,
}

impl Default for RrtParams {
    fn default() -> Self {
        Self {
            step_size: 12.0,
            goal_bias: 0.1,
            max_iterations: 150,
            branch_probability: 0.3,
            jaggedness: 0.3,
            goal_radius: 20.0,
            electrical_field: 0.5,
            start_x: 0.5,
            raster: Raster::new(50, 45),
        }
    }
}

/// Arena node. `parent` always points at a smaller index, so the tree is
/// acyclic and connected by construction.
struct Node {
    x: f32,
    y: f32,
    parent: Option<usize>,
    intensity: f32,
    depth: u32,
    is_branch: bool,
}

struct GoalRegion {
    cx: f32,
    cy: f32,
    radius: f32,
}

impl GoalRegion {
    fn contains(&self, x: f32, y: f32) -> bool {
        distance_squared(x, y, self.cx, self.cy) <= self.radius * self.radius
    }

    fn sample(&self, rng: &mut Rng) -> (f32, f32) {
        let angle = rng.next_f32() * TAU;
        let distance = rng.next_f32() * self.radius;
        (self.cx + angle.cos() * distance, self.cy + angle.sin() * distance)
    }
}

pub fn generate(params: &RrtParams, rng: &mut Rng, segments: &mut Vec<Segment>) {
    let mut arena = vec![Node {
        x: params.start_x * params.raster.width as f32,
        y: 0.0,
        parent: None,
        intensity: 1.0,
        depth: 0,
        is_branch: false,
    }];

    let goal = GoalRegion {
        cx: params.raster.width as f32 / 2.0,
        cy: params.raster.height as f32 - 1.0,
        radius: params.goal_radius,
    };

    for _ in 0..params.max_iterations {
        let (sample_x, sample_y) = sample_point(params, &goal, rng);
        let nearest = nearest_node(&arena, sample_x, sample_y);

        let Some(node) = extend(&arena[nearest], nearest, sample_x, sample_y, params, rng) else {
            continue;
        };
        if !params.raster.contains(node.x, node.y) {
            continue;
        }

        arena.push(node);
        let index = arena.len() - 1;
        let reached = goal.contains(arena[index].x, arena[index].y);

        if rng.next_f32() < params.branch_probability && arena[index].depth < 3 {
            create_branches(&mut arena, index, params, rng);
        }
        if reached {
            break;
        }
    }

    for node in arena.iter().skip(1) {
        if let Some(parent) = node.parent {
            segments.push(Segment::new(
                arena[parent].x,
                arena[parent].y,
                node.x,
                node.y,
                node.is_branch,
                node.intensity,
                node.depth,
            ));
        }
    }
}

fn sample_point(params: &RrtParams, goal: &GoalRegion, rng: &mut Rng) -> (f32, f32) {
    if rng.next_f32() < params.goal_bias {
        return goal.sample(rng);
    }

    let width = params.raster.width as f32;
    let height = params.raster.height as f32;
    let mut x = rng.next_f32() * width;
    let mut y = rng.next_f32() * height;

    if params.electrical_field > 0.0 {
        let cx = width / 2.0;
        let center_bias = (cx - (x - cx).abs()) / cx;
        let vertical_bias = y / height;
        let total_bias = (center_bias + vertical_bias) * params.electrical_field;
        if rng.next_f32() > total_bias {
            // Re-sample toward the high-field center-bottom region
            x = cx + rng.jitter(width * 0.6);
            y = y * 0.8 + height * 0.2;
        }
    }

    (params.raster.clamp_x(x), params.raster.clamp_y(y))
}

fn nearest_node(arena: &[Node], x: f32, y: f32) -> usize {
    let mut nearest = 0;
    let mut best = distance_squared(arena[0].x, arena[0].y, x, y);
    for (i, node) in arena.iter().enumerate().skip(1) {
        let d = distance_squared(node.x, node.y, x, y);
        if d < best {
            best = d;
            nearest = i;
        }
    }
    nearest
}

fn extend(
    nearest: &Node,
    nearest_index: usize,
    sample_x: f32,
    sample_y: f32,
    params: &RrtParams,
    rng: &mut Rng,
) -> Option<Node> {
    let dx = sample_x - nearest.x;
    let dy = sample_y - nearest.y;
    let distance = length(dx, dy);
    if distance < 1e-6 {
        return None; // Sample collapsed onto an existing node
    }
    let dx = dx / distance;
    let dy = dy / distance;

    let mut new_x = nearest.x + dx * params.step_size;
    let mut new_y = nearest.y + dy * params.step_size;

    if params.jaggedness > 0.0 {
        let displacement = rng.jitter(params.jaggedness * params.step_size);
        new_x += -dy * displacement;
        new_y += dx * displacement;
    }

    let mut intensity = (1.0 - 0.05 * nearest.depth as f32).max(0.7);
    if params.electrical_field > 0.0 {
        let cx = params.raster.width as f32 / 2.0;
        let center_distance = (new_x - cx).abs() / cx;
        intensity *= 1.0 - center_distance * 0.3;
    }

    Some(Node {
        x: new_x,
        y: new_y,
        parent: Some(nearest_index),
        intensity,
        depth: nearest.depth + 1,
        is_branch: false,
    })
}

fn create_branches(arena: &mut Vec<Node>, parent_index: usize, params: &RrtParams, rng: &mut Rng) {
    let count = if rng.next_f32() < 0.5 { 1 } else { 2 };

    for _ in 0..count {
        let parent = &arena[parent_index];
        let mut branch_angle = rng.next_f32() * TAU;
        if let Some(grandparent) = parent.parent {
            // Bias away from the incoming direction
            let incoming = (parent.y - arena[grandparent].y).atan2(parent.x - arena[grandparent].x);
            branch_angle = incoming + PI / 2.0 + rng.jitter(PI * 0.8);
        }

        let branch_length = params.step_size * rng.range_f32(0.5, 1.0);
        let mut branch_x = parent.x + branch_angle.cos() * branch_length;
        let mut branch_y = parent.y + branch_angle.sin() * branch_length;

        if params.jaggedness > 0.0 {
            let jag = rng.jitter(params.jaggedness * branch_length);
            branch_x += (branch_angle + PI / 2.0).cos() * jag;
            branch_y += (branch_angle + PI / 2.0).sin() * jag;
        }

        let intensity = parent.intensity * rng.range_f32(0.8, 1.0);
        let depth = parent.depth + 1;
        if params.raster.contains(branch_x, branch_y) {
            arena.push(Node {
                x: branch_x,
                y: branch_y,
                parent: Some(parent_index),
                intensity,
                depth,
                is_branch: true,
            });
        }
    }
}
