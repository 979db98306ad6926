//! Midpoint-displacement bolt generator.
//!
//! One trunk from a randomized top point to a randomized bottom point is
//! bisected `recursion_depth` times, jittering each midpoint perpendicular to
//! its segment. Non-terminal midpoints of the trunk may spawn a single side
//! branch, which subdivides like the trunk but never branches again.
//!
//! Subdivision runs on an explicit work stack rather than the call stack, so
//! the `~2^recursion_depth` task bound is an allocation, not a stack frame
//! count. Tasks are pushed so that leaves emit in left-to-right trunk order.

use crate::geometry::{normalize, perpendicular};
use crate::segment::{Raster, Segment};
use crate::util::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidpointParams {
    /// Perpendicular midpoint jitter scale, 0..1 (pixels = 10x this)
    pub displacement: f32,
    /// Bisection levels; leaf count is `2^recursion_depth` per subtree
    pub recursion_depth: u32,
    /// Trunk start position across the top, 0..1
    pub start_x: f32,
    /// Random spread of the start point, 0..1 of raster width
    pub start_spread: f32,
    /// Random spread of the end point around bottom-center, 0..1
    pub end_spread: f32,
    /// Chance of spawning a branch at each non-terminal trunk midpoint
    pub branch_probability: f32,
    /// Branch length scale (pixels = 20x this)
    pub branch_distance: f32,
    /// Branch deviation from the trunk direction, 0..1 of a half-turn
    pub branch_angle: f32,
    pub raster: Raster,
}

impl Default for MidpointParams {
    fn default() -> Self {
        Self {
            displacement: 0.5,
            recursion_depth: 6,
            start_x: 0.5,
            start_spread: 0.5,
            end_spread: 0.5,
            branch_probability: 0.3,
            branch_distance: 0.5,
            branch_angle: 0.5,
            raster: Raster::new(50, 45),
        }
    }
}

struct Task {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    is_branch: bool,
    intensity: f32,
    depth: u32,
}

pub fn generate(params: &MidpointParams, rng: &mut Rng, segments: &mut Vec<Segment>) {
    let width = params.raster.width as f32;

    let start_x = params.raster.clamp_x(params.start_x * width + rng.jitter(params.start_spread * width));
    let end_x = params.raster.clamp_x(width / 2.0 + rng.jitter(params.end_spread * width));
    let end_y = params.raster.height as f32 - 1.0;

    let mut stack = vec![Task {
        x1: start_x,
        y1: 0.0,
        x2: end_x,
        y2: end_y,
        is_branch: false,
        intensity: 1.0,
        depth: 0,
    }];

    while let Some(task) = stack.pop() {
        if task.depth >= params.recursion_depth {
            segments.push(Segment::new(
                task.x1,
                task.y1,
                task.x2,
                task.y2,
                task.is_branch,
                task.intensity,
                task.depth,
            ));
            continue;
        }

        let dx = task.x2 - task.x1;
        let dy = task.y2 - task.y1;
        let (perp_x, perp_y) = perpendicular(dx, dy);
        let (perp_x, perp_y) = normalize(perp_x, perp_y);

        let displace = params.displacement * 10.0 * rng.jitter(1.0);
        let mid_x = params.raster.clamp_x((task.x1 + task.x2) / 2.0 + perp_x * displace);
        let mid_y = params.raster.clamp_y((task.y1 + task.y2) / 2.0 + perp_y * displace);

        // LIFO: branch pops last, first half pops next
        if !task.is_branch && rng.next_f32() < params.branch_probability {
            let branch_len = params.branch_distance * 20.0;
            let trunk_angle = dy.atan2(dx);
            let branch_angle = trunk_angle + rng.jitter(params.branch_angle * PI);
            let branch_x = params.raster.clamp_x(mid_x + branch_angle.cos() * branch_len);
            let branch_y = params.raster.clamp_y(mid_y + branch_angle.sin() * branch_len);
            stack.push(Task {
                x1: mid_x,
                y1: mid_y,
                x2: branch_x,
                y2: branch_y,
                is_branch: true,
                intensity: task.intensity * 0.7,
                depth: task.depth + 1,
            });
        }
        stack.push(Task {
            x1: mid_x,
            y1: mid_y,
            x2: task.x2,
            y2: task.y2,
            is_branch: task.is_branch,
            intensity: task.intensity,
            depth: task.depth + 1,
        });
        stack.push(Task {
            x1: task.x1,
            y1: task.y1,
            x2: mid_x,
            y2: mid_y,
            is_branch: task.is_branch,
            intensity: task.intensity,
            depth: task.depth + 1,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_params() -> MidpointParams {
        MidpointParams {
            displacement: 0.0,
            recursion_depth: 2,
            start_x: 0.5,
            start_spread: 0.0,
            end_spread: 0.0,
            branch_probability: 0.0,
            raster: Raster::new(100, 100),
            ..MidpointParams::default()
        }
    }

    #[test]
    fn test_zero_displacement_straight_vertical_line() {
        let params = straight_params();
        let mut rng = Rng::new(12345);
        let mut segments = Vec::new();
        generate(&params, &mut rng, &mut segments);

        // 2^2 leaves, one straight line (50,0) -> (50,99)
        assert_eq!(segments.len(), 4);
        assert_eq!((segments[0].x1, segments[0].y1), (50.0, 0.0));
        assert_eq!((segments[3].x2, segments[3].y2), (50.0, 99.0));
        for s in &segments {
            assert_eq!(s.x1, 50.0);
            assert_eq!(s.x2, 50.0);
            assert!(!s.is_branch);
            assert_eq!(s.depth, 2);
        }
        // leaves chain top to bottom
        for pair in segments.windows(2) {
            assert_eq!((pair[0].x2, pair[0].y2), (pair[1].x1, pair[1].y1));
        }
    }

    #[test]
    fn test_leaf_count_without_branching() {
        let params = MidpointParams {
            branch_probability: 0.0,
            ..MidpointParams::default()
        };
        let mut rng = Rng::new(77);
        let mut segments = Vec::new();
        generate(&params, &mut rng, &mut segments);
        assert_eq!(segments.len(), 1usize << params.recursion_depth);
    }

    #[test]
    fn test_emitted_depth_is_exactly_recursion_depth() {
        let params = MidpointParams {
            branch_probability: 1.0,
            ..MidpointParams::default()
        };
        let mut rng = Rng::new(3);
        let mut segments = Vec::new();
        generate(&params, &mut rng, &mut segments);

        assert!(segments.len() > 1usize << params.recursion_depth);
        for s in &segments {
            assert_eq!(s.depth, params.recursion_depth);
        }
        assert!(segments.iter().any(|s| s.is_branch));
    }

    #[test]
    fn test_all_coordinates_clamped_to_raster() {
        let params = MidpointParams {
            displacement: 1.0,
            branch_probability: 1.0,
            branch_distance: 2.0,
            ..MidpointParams::default()
        };
        for seed in 1..=20 {
            let mut rng = Rng::new(seed);
            let mut segments = Vec::new();
            generate(&params, &mut rng, &mut segments);
            for s in &segments {
                assert!(params.raster.contains(s.x1, s.y1));
                assert!(params.raster.contains(s.x2, s.y2));
            }
        }
    }

    #[test]
    fn test_branch_intensity_dimmed() {
        let params = MidpointParams {
            branch_probability: 1.0,
            ..MidpointParams::default()
        };
        let mut rng = Rng::new(41);
        let mut segments = Vec::new();
        generate(&params, &mut rng, &mut segments);
        for s in &segments {
            if s.is_branch {
                assert!((s.intensity - 0.7).abs() < 1e-6);
            } else {
                assert_eq!(s.intensity, 1.0);
            }
        }
    }
}
