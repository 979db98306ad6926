//! Rapidly-exploring random tree bolt generator (world-space volume).
//!
//! Same growth loop as the planar tree search, lifted into a 3D box: the
//! root hangs at top-center (`max_y`), the goal is a sphere at bottom-center
//! (`min_y`), and jaggedness spreads over the two basis vectors spanning the
//! plane perpendicular to each step.

use crate::math3d::Vec3;
use crate::segment::Segment;
use crate::util::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Axis-aligned world-space box, inclusive on all faces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds3 {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Bounds3 {
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            min_z,
            max_z,
        }
    }

    /// Cube of the given half-extent centered on the origin
    pub fn cube(half: f32) -> Self {
        Self::new(-half, half, -half, half, -half, half)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min_x
            && p.x <= self.max_x
            && p.y >= self.min_y
            && p.y <= self.max_y
            && p.z >= self.min_z
            && p.z <= self.max_z
    }

    pub fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(self.min_x, self.max_x),
            p.y.clamp(self.min_y, self.max_y),
            p.z.clamp(self.min_z, self.max_z),
        )
    }

    fn center(&self) -> Vec3 {
        Vec3::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
            (self.min_z + self.max_z) / 2.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rrt3dParams {
    /// Distance of each tree extension in world units
    pub step_size: f32,
    /// Probability of sampling inside the goal sphere, 0..1
    pub goal_bias: f32,
    /// Tree extension budget
    pub max_iterations: u32,
    /// Chance of spawning branch children from a fresh node, 0..1
    pub branch_probability: f32,
    /// Step noise across the perpendicular plane, 0..1 of the step size
    pub jaggedness: f32,
    /// Radius of the bottom goal sphere in world units
    pub goal_radius: f32,
    /// Sampling bias toward center-bottom, 0..1
    pub electrical_field: f32,
    pub bounds: Bounds3,
}

impl Default for Rrt3dParams {
    fn default() -> Self {
        Self {
            step_size: 15.0,
            goal_bias: 0.15,
            max_iterations: 120,
            branch_probability: 0.25,
            jaggedness: 0.4,
            goal_radius: 25.0,
            electrical_field: 0.6,
            bounds: Bounds3::cube(25.0),
        }
    }
}

struct Node {
    pos: Vec3,
    parent: Option<usize>,
    intensity: f32,
    depth: u32,
    is_branch: bool,
}

struct GoalSphere {
    center: Vec3,
    radius: f32,
}

impl GoalSphere {
    fn contains(&self, p: Vec3) -> bool {
        self.center.distance_to(&p) <= self.radius
    }

    /// Uniform point inside the sphere via rejection sampling
    fn sample(&self, rng: &mut Rng) -> Vec3 {
        loop {
            let x = rng.jitter(2.0);
            let y = rng.jitter(2.0);
            let z = rng.jitter(2.0);
            if x * x + y * y + z * z <= 1.0 {
                return self.center + Vec3::new(x, y, z) * self.radius;
            }
        }
    }
}

pub fn generate(params: &Rrt3dParams, rng: &mut Rng, segments: &mut Vec<Segment>) {
    let bounds = &params.bounds;
    let center = bounds.center();

    let mut arena = vec![Node {
        pos: Vec3::new(center.x, bounds.max_y, center.z),
        parent: None,
        intensity: 1.0,
        depth: 0,
        is_branch: false,
    }];

    let goal = GoalSphere {
        center: Vec3::new(center.x, bounds.min_y, center.z),
        radius: params.goal_radius,
    };

    for _ in 0..params.max_iterations {
        let sample = sample_point(params, &goal, rng);
        let nearest = nearest_node(&arena, sample);

        let Some(node) = extend(&arena[nearest], nearest, sample, params, rng) else {
            continue;
        };
        if !bounds.contains(node.pos) {
            continue;
        }

        arena.push(node);
        let index = arena.len() - 1;
        let reached = goal.contains(arena[index].pos);

        if rng.next_f32() < params.branch_probability && arena[index].depth < 3 {
            create_branches(&mut arena, index, params, rng);
        }
        if reached {
            break;
        }
    }

    for node in arena.iter().skip(1) {
        if let Some(parent) = node.parent {
            let p = arena[parent].pos;
            segments.push(Segment::new_3d(
                p.x,
                p.y,
                p.z,
                node.pos.x,
                node.pos.y,
                node.pos.z,
                node.is_branch,
                node.intensity,
                node.depth,
            ));
        }
    }
}

fn sample_point(params: &Rrt3dParams, goal: &GoalSphere, rng: &mut Rng) -> Vec3 {
    if rng.next_f32() < params.goal_bias {
        return goal.sample(rng);
    }

    let b = &params.bounds;
    let mut x = rng.range_f32(b.min_x, b.max_x);
    let mut y = rng.range_f32(b.min_y, b.max_y);
    let mut z = rng.range_f32(b.min_z, b.max_z);

    if params.electrical_field > 0.0 {
        let center = b.center();
        let half_x = (b.max_x - b.min_x) / 2.0;
        let half_z = (b.max_z - b.min_z) / 2.0;
        let center_bias_x = 1.0 - (x - center.x).abs() / half_x;
        let center_bias_z = 1.0 - (z - center.z).abs() / half_z;
        let vertical_bias = 1.0 - (y - b.min_y) / (b.max_y - b.min_y);

        let total_bias = (center_bias_x + center_bias_z + vertical_bias) / 3.0 * params.electrical_field;
        if rng.next_f32() > total_bias {
            // Re-sample toward the high-field center-bottom column
            x = center.x + rng.jitter((b.max_x - b.min_x) * 0.6);
            z = center.z + rng.jitter((b.max_z - b.min_z) * 0.6);
            y = y * 0.8 + b.min_y * 0.2;
        }
    }

    params.bounds.clamp(Vec3::new(x, y, z))
}

fn nearest_node(arena: &[Node], sample: Vec3) -> usize {
    let mut nearest = 0;
    let mut best = arena[0].pos.distance_to(&sample);
    for (i, node) in arena.iter().enumerate().skip(1) {
        let d = node.pos.distance_to(&sample);
        if d < best {
            best = d;
            nearest = i;
        }
    }
    nearest
}

fn extend(nearest: &Node, nearest_index: usize, sample: Vec3, params: &Rrt3dParams, rng: &mut Rng) -> Option<Node> {
    let offset = sample - nearest.pos;
    let distance = offset.length();
    if distance < 1e-6 {
        return None; // Sample collapsed onto an existing node
    }
    let dir = offset * (1.0 / distance);

    let mut pos = nearest.pos + dir * params.step_size;

    if params.jaggedness > 0.0 {
        let (u, v) = dir.perpendicular_basis();
        let d1 = rng.jitter(params.jaggedness * params.step_size);
        let d2 = rng.jitter(params.jaggedness * params.step_size);
        pos = pos + u * d1 + v * d2;
    }

    let mut intensity = (1.0 - 0.05 * nearest.depth as f32).max(0.7);
    if params.electrical_field > 0.0 {
        let b = &params.bounds;
        let center = b.center();
        let lateral_x = (pos.x - center.x).abs() / ((b.max_x - b.min_x) / 2.0);
        let lateral_z = (pos.z - center.z).abs() / ((b.max_z - b.min_z) / 2.0);
        intensity *= 1.0 - (lateral_x + lateral_z) / 2.0 * 0.3;
    }

    Some(Node {
        pos,
        parent: Some(nearest_index),
        intensity,
        depth: nearest.depth + 1,
        is_branch: false,
    })
}

fn create_branches(arena: &mut Vec<Node>, parent_index: usize, params: &Rrt3dParams, rng: &mut Rng) {
    let count = if rng.next_f32() < 0.5 { 1 } else { 2 };

    for _ in 0..count {
        let parent = &arena[parent_index];
        let theta = rng.next_f32() * TAU;
        let phi = rng.next_f32() * PI;
        let mut dir = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());

        if let Some(grandparent) = parent.parent {
            // Halve the component parallel to the incoming direction so
            // branches fan outward instead of following the channel
            let incoming = (parent.pos - arena[grandparent].pos).normalize();
            let dot = dir.dot(&incoming);
            if dot > 0.0 {
                dir = (dir - incoming * (dot * 0.5)).normalize();
            }
        }

        let branch_length = params.step_size * rng.range_f32(0.5, 1.0);
        let mut pos = parent.pos + dir * branch_length;

        if params.jaggedness > 0.0 {
            pos = pos
                + Vec3::new(
                    rng.jitter(params.jaggedness * branch_length),
                    rng.jitter(params.jaggedness * branch_length),
                    rng.jitter(params.jaggedness * branch_length),
                );
        }

        let intensity = parent.intensity * rng.range_f32(0.8, 1.0);
        let depth = parent.depth + 1;
        if params.bounds.contains(pos) {
            arena.push(Node {
                pos,
                parent: Some(parent_index),
                intensity,
                depth,
                is_branch: true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_endpoints_inside_bounds() {
        let params = Rrt3dParams {
            jaggedness: 1.0,
            branch_probability: 0.5,
            ..Rrt3dParams::default()
        };
        for seed in 1..=10 {
            let mut rng = Rng::new(seed);
            let mut segments = Vec::new();
            generate(&params, &mut rng, &mut segments);
            assert!(!segments.is_empty());
            for s in &segments {
                assert!(params.bounds.contains(Vec3::new(s.x1, s.y1, s.z1)));
                assert!(params.bounds.contains(Vec3::new(s.x2, s.y2, s.z2)));
            }
        }
    }

    #[test]
    fn test_root_at_top_center() {
        let params = Rrt3dParams::default();
        let mut rng = Rng::new(4);
        let mut segments = Vec::new();
        generate(&params, &mut rng, &mut segments);
        let first = &segments[0];
        assert_eq!((first.x1, first.y1, first.z1), (0.0, params.bounds.max_y, 0.0));
    }

    #[test]
    fn test_full_goal_bias_reaches_goal_sphere() {
        let params = Rrt3dParams {
            goal_bias: 1.0,
            jaggedness: 0.0,
            branch_probability: 0.0,
            electrical_field: 0.0,
            max_iterations: 500,
            ..Rrt3dParams::default()
        };
        let goal_center = Vec3::new(0.0, params.bounds.min_y, 0.0);

        for seed in 1..=10 {
            let mut rng = Rng::new(seed);
            let mut segments = Vec::new();
            generate(&params, &mut rng, &mut segments);

            assert!((segments.len() as u32) < params.max_iterations / 2);
            let last = segments.last().unwrap();
            let end = Vec3::new(last.x2, last.y2, last.z2);
            assert!(goal_center.distance_to(&end) <= params.goal_radius);
        }
    }

    #[test]
    fn test_segments_form_connected_tree() {
        let params = Rrt3dParams::default();
        let mut rng = Rng::new(8);
        let mut segments = Vec::new();
        generate(&params, &mut rng, &mut segments);

        let root = (0.0, params.bounds.max_y, 0.0);
        for (i, s) in segments.iter().enumerate() {
            let start = (s.x1, s.y1, s.z1);
            let attached = start == root
                || segments[..i].iter().any(|prev| (prev.x2, prev.y2, prev.z2) == start);
            assert!(attached, "segment {} detached from the tree", i);
        }
    }
}
