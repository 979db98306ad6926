//! Stepped-leader / return-stroke bolt generator.
//!
//! Two phases, loosely following how real strikes form. A forest of charged
//! leaders steps down from the cloud base, each step lerped between the
//! current heading and straight-down (the pull grows as the ground nears),
//! shedding charge and occasionally forking. The moment any leader comes
//! within `connection_distance` of the ground, the phase ends and the
//! connected channel is back-traced as the bright return stroke; strong side
//! channels get dimmer secondary strokes. A strike that never connects emits
//! only the dim leader segments, which is a valid outcome.

use crate::segment::{Raster, Segment};
use crate::util::{lerp, Rng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParams {
    /// Initial charge at the cloud base, 0..1
    pub electric_potential: f32,
    /// Distance of each leader step in pixels
    pub step_length: f32,
    /// Propagation round budget
    pub max_steps: u32,
    /// Chance per round that an active leader forks, 0..1
    pub branching_probability: f32,
    /// Random heading jitter per step, in radians
    pub step_angle_variation: f32,
    /// Fraction of charge lost per step, 0..1
    pub charge_decay: f32,
    /// How close to the ground counts as touching down, in pixels
    pub connection_distance: f32,
    /// Cloud-base position across the top, 0..1
    pub start_x: f32,
    pub raster: Raster,
}

impl Default for PhysicalParams {
    fn default() -> Self {
        Self {
            electric_potential: 0.8,
            step_length: 8.0,
            max_steps: 100,
            branching_probability: 0.3,
            step_angle_variation: 0.5 * PI,
            charge_decay: 0.02,
            connection_distance: 10.0,
            start_x: 0.5,
            raster: Raster::new(50, 45),
        }
    }
}

/// Arena record for one leader step. `parent` always points at a smaller
/// index; `children` is only consulted after the growth phase.
struct Leader {
    x: f32,
    y: f32,
    parent: Option<usize>,
    charge: f32,
    direction: f32,
    step: u32,
    active: bool,
    children: u32,
}

pub fn generate(params: &PhysicalParams, rng: &mut Rng, segments: &mut Vec<Segment>) {
    let ground = params.raster.height as f32 - 1.0;

    let mut arena = vec![Leader {
        x: params.start_x * params.raster.width as f32,
        y: 0.0,
        parent: None,
        charge: params.electric_potential,
        direction: PI / 2.0,
        step: 0,
        active: true,
        children: 0,
    }];

    // Phase 1: stepped-leader propagation. Each round advances the whole
    // frontier by one step; the frontier for the next round is exactly the
    // nodes created this round.
    let mut frontier = vec![0usize];
    let mut connection: Option<usize> = None;

    'rounds: for _ in 0..params.max_steps {
        if frontier.is_empty() {
            break;
        }
        let mut next_frontier = Vec::new();

        for &index in &frontier {
            if !arena[index].active {
                continue;
            }
            if (ground - arena[index].y).abs() <= params.connection_distance {
                connection = Some(index);
                break 'rounds;
            }

            if let Some(step) = next_step(&arena[index], index, params, ground, rng) {
                arena[index].children += 1;
                arena.push(step);
                next_frontier.push(arena.len() - 1);
            }

            if rng.next_f32() < params.branching_probability {
                fork(&mut arena, index, params, rng, &mut next_frontier);
            }
        }

        frontier = next_frontier;
    }

    // Phase 2: return strokes along connected channels
    let mut strokes: Vec<(Vec<usize>, f32)> = Vec::new();
    if let Some(connected) = connection {
        strokes.push((trace_to_root(&arena, connected), 1.0));

        for (index, leader) in arena.iter().enumerate() {
            if leader.children > 0 && leader.charge > params.electric_potential * 0.5 {
                let path = trace_to_root(&arena, index);
                if path.len() > 3 {
                    strokes.push((path, leader.charge / params.electric_potential));
                }
            }
        }
    }

    // Phase 3: flatten. Leader edges first (dim), return strokes after
    // (bright), so the renderer naturally paints the channel over the forest.
    for leader in arena.iter().skip(1) {
        if let Some(parent) = leader.parent {
            let intensity = 0.3 * leader.charge / params.electric_potential;
            segments.push(Segment::new(
                arena[parent].x,
                arena[parent].y,
                leader.x,
                leader.y,
                arena[parent].children > 1,
                intensity,
                leader.step,
            ));
        }
    }
    for (path, intensity) in &strokes {
        for (i, pair) in path.windows(2).enumerate() {
            let prev = &arena[pair[0]];
            let curr = &arena[pair[1]];
            segments.push(Segment::new(prev.x, prev.y, curr.x, curr.y, false, *intensity, i as u32 + 1));
        }
    }
}

fn next_step(current: &Leader, index: usize, params: &PhysicalParams, ground: f32, rng: &mut Rng) -> Option<Leader> {
    // Heading drifts laterally but is pulled straight down, harder the
    // closer the ground gets
    let lateral = current.direction + rng.jitter(0.3);
    let ground_attraction = 1.0 / (1.0 + (ground - current.y) * 0.01);
    let direction = lerp(lateral, PI / 2.0, ground_attraction) + rng.jitter(params.step_angle_variation);

    let x = current.x + direction.cos() * params.step_length;
    let y = current.y + direction.sin() * params.step_length;
    if !params.raster.contains(x, y) {
        return None; // Leader leaves the raster and dies
    }

    let charge = current.charge * (1.0 - params.charge_decay);
    Some(Leader {
        x,
        y,
        parent: Some(index),
        charge,
        direction,
        step: current.step + 1,
        active: charge > params.electric_potential * 0.1,
        children: 0,
    })
}

fn fork(arena: &mut Vec<Leader>, parent_index: usize, params: &PhysicalParams, rng: &mut Rng, frontier: &mut Vec<usize>) {
    let count = 1 + (rng.next_f32() * 3.0) as u32;

    for _ in 0..count {
        let parent = &arena[parent_index];
        // Roughly perpendicular to the channel, either side
        let direction = parent.direction + rng.jitter(PI);
        let x = parent.x + direction.cos() * params.step_length * 0.7;
        let y = parent.y + direction.sin() * params.step_length * 0.7;
        let charge = parent.charge * rng.range_f32(0.6, 0.9);
        let step = parent.step + 1;

        if params.raster.contains(x, y) {
            arena[parent_index].children += 1;
            arena.push(Leader {
                x,
                y,
                parent: Some(parent_index),
                charge,
                direction,
                step,
                active: true,
                children: 0,
            });
            frontier.push(arena.len() - 1);
        }
    }
}

/// Walk parent links back to the root, returned in root-to-endpoint order
fn trace_to_root(arena: &[Leader], endpoint: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = Some(endpoint);
    while let Some(index) = current {
        path.push(index);
        current = arena[index].parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connecting_params() -> PhysicalParams {
        PhysicalParams {
            electric_potential: 0.8,
            step_length: 8.0,
            max_steps: 100,
            branching_probability: 0.0,
            step_angle_variation: 0.0,
            charge_decay: 0.02,
            connection_distance: 10.0,
            start_x: 0.5,
            raster: Raster::new(50, 45),
        }
    }

    #[test]
    fn test_connected_strike_has_bright_return_stroke() {
        for seed in 1..=10 {
            let mut rng = Rng::new(seed);
            let mut segments = Vec::new();
            generate(&connecting_params(), &mut rng, &mut segments);

            let bright: Vec<_> = segments.iter().filter(|s| s.intensity == 1.0).collect();
            assert!(!bright.is_empty(), "seed {} never connected", seed);
            assert!(bright.iter().all(|s| !s.is_branch));
        }
    }

    #[test]
    fn test_primary_stroke_continuous_from_root_to_ground() {
        let params = connecting_params();
        let mut rng = Rng::new(42);
        let mut segments = Vec::new();
        generate(&params, &mut rng, &mut segments);

        let bright: Vec<_> = segments.iter().filter(|s| s.intensity == 1.0).collect();
        assert_eq!((bright[0].x1, bright[0].y1), (25.0, 0.0));
        for (i, s) in bright.iter().enumerate() {
            assert_eq!(s.depth, i as u32 + 1, "step index must increase strictly");
            if i > 0 {
                assert_eq!((s.x1, s.y1), (bright[i - 1].x2, bright[i - 1].y2));
            }
        }
        let ground = params.raster.height as f32 - 1.0;
        let end = bright.last().unwrap();
        assert!((ground - end.y2).abs() <= params.connection_distance);
    }

    #[test]
    fn test_leader_segments_are_dim() {
        let params = PhysicalParams {
            max_steps: 2, // not enough rounds to reach the ground
            ..connecting_params()
        };
        let mut rng = Rng::new(9);
        let mut segments = Vec::new();
        generate(&params, &mut rng, &mut segments);

        assert!(!segments.is_empty());
        for s in &segments {
            assert!(s.intensity <= 0.3, "no return stroke without a connection");
        }
    }

    #[test]
    fn test_charge_decay_deactivates_leaders() {
        // Heavy decay drops charge below 10% of the potential within a few
        // steps, stranding the leader mid-air
        let params = PhysicalParams {
            charge_decay: 0.5,
            ..connecting_params()
        };
        let mut rng = Rng::new(3);
        let mut segments = Vec::new();
        generate(&params, &mut rng, &mut segments);

        assert!(segments.len() < 8);
        for s in &segments {
            assert!(s.intensity <= 0.3);
        }
    }

    #[test]
    fn test_all_segments_in_bounds() {
        let params = PhysicalParams {
            branching_probability: 0.5,
            ..PhysicalParams::default()
        };
        for seed in 1..=10 {
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
    fn test_branch_flag_marks_forked_parents() {
        let params = PhysicalParams {
            branching_probability: 1.0,
            max_steps: 20,
            ..connecting_params()
        };
        let mut rng = Rng::new(17);
        let mut segments = Vec::new();
        generate(&params, &mut rng, &mut segments);
        assert!(segments.iter().any(|s| s.is_branch));
    }
}
