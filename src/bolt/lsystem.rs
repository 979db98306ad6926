//! L-System bolt generator — string-rewriting grammar plus turtle interpreter.
//!
//! The axiom `F` is rewritten `iterations` times with the fixed production
//! `F -> F[+F][-F]F`; the result is walked by a turtle that starts at the top
//! of the raster heading straight down. String length grows roughly 10x per
//! iteration, so the caller bounds `iterations` — there is no internal cap.

use crate::segment::{Raster, Segment};
use crate::util::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

const FORWARD: char = 'F';
const TURN_LEFT: char = '+';
const TURN_RIGHT: char = '-';
const BRANCH_START: char = '[';
const BRANCH_END: char = ']';

const PRODUCTION: &str = "F[+F][-F]F";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LSystemParams {
    /// Rewriting passes over the axiom. Geometric growth: keep this small.
    pub iterations: u32,
    /// Base turtle step in pixels
    pub segment_length: f32,
    /// Random scale on turn angles, 0..1
    pub angle_variation: f32,
    /// Random scale on step lengths, 0..1
    pub length_variation: f32,
    /// Base turn angle in degrees
    pub branch_angle_deg: f32,
    /// Starting position across the top, 0..1
    pub start_x: f32,
    pub raster: Raster,
}

impl Default for LSystemParams {
    fn default() -> Self {
        Self {
            iterations: 4,
            segment_length: 8.0,
            angle_variation: 0.5,
            length_variation: 0.3,
            branch_angle_deg: 45.0,
            start_x: 0.5,
            raster: Raster::new(50, 45),
        }
    }
}

#[derive(Clone, Copy)]
struct Turtle {
    x: f32,
    y: f32,
    angle: f32,
    depth: u32,
}

/// Rewrite the axiom `iterations` times. Deterministic: the production has
/// no stochastic alternatives, so the output depends only on the count.
pub fn expand(iterations: u32) -> String {
    let mut current = String::from("F");
    for _ in 0..iterations {
        let mut next = String::with_capacity(current.len() * PRODUCTION.len());
        for c in current.chars() {
            if c == FORWARD {
                next.push_str(PRODUCTION);
            } else {
                next.push(c);
            }
        }
        current = next;
    }
    current
}

pub fn generate(params: &LSystemParams, rng: &mut Rng, segments: &mut Vec<Segment>) {
    let expanded = expand(params.iterations);
    interpret(&expanded, params, rng, segments);
}

fn interpret(commands: &str, params: &LSystemParams, rng: &mut Rng, segments: &mut Vec<Segment>) {
    let mut turtle = Turtle {
        x: params.start_x * params.raster.width as f32,
        y: 0.0,
        angle: PI / 2.0, // heading down, y grows toward the ground
        depth: 0,
    };
    let mut stack: Vec<Turtle> = Vec::new();
    let base_angle = params.branch_angle_deg.to_radians();

    for c in commands.chars() {
        match c {
            FORWARD => {
                let length = params.segment_length * (1.0 + rng.jitter(params.length_variation));
                let new_x = turtle.x + turtle.angle.cos() * length;
                let new_y = turtle.y + turtle.angle.sin() * length;

                // An out-of-bounds step is skipped: the cursor stays put and
                // interpretation continues with the next command.
                if params.raster.contains(new_x, new_y) {
                    let intensity = (1.0 - 0.1 * turtle.depth as f32).max(0.7);
                    segments.push(Segment::new(
                        turtle.x,
                        turtle.y,
                        new_x,
                        new_y,
                        turtle.depth > 0,
                        intensity,
                        turtle.depth,
                    ));
                    turtle.x = new_x;
                    turtle.y = new_y;
                }
            },
            TURN_LEFT => {
                turtle.angle -= base_angle * (1.0 + rng.jitter(params.angle_variation));
            },
            TURN_RIGHT => {
                turtle.angle += base_angle * (1.0 + rng.jitter(params.angle_variation));
            },
            BRANCH_START => {
                stack.push(turtle);
                turtle.depth += 1;
            },
            BRANCH_END => {
                if let Some(saved) = stack.pop() {
                    turtle = saved;
                }
            },
            _ => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expansion_lengths() {
        // Each F becomes 10 characters; +, -, [, ] self-map.
        assert_eq!(expand(0), "F");
        assert_eq!(expand(1), "F[+F][-F]F");
        assert_eq!(expand(1).len(), 10);
        assert_eq!(expand(2).len(), 46);
    }

    #[test]
    fn test_expansion_is_balanced() {
        let s = expand(3);
        let mut open = 0i32;
        for c in s.chars() {
            match c {
                '[' => open += 1,
                ']' => {
                    open -= 1;
                    assert!(open >= 0);
                },
                _ => {},
            }
        }
        assert_eq!(open, 0);
    }

    #[test]
    fn test_zero_iterations_single_downward_segment() {
        let params = LSystemParams {
            iterations: 0,
            length_variation: 0.0,
            raster: Raster::new(100, 100),
            ..LSystemParams::default()
        };
        let mut rng = Rng::new(1);
        let mut segments = Vec::new();
        generate(&params, &mut rng, &mut segments);

        assert_eq!(segments.len(), 1);
        let s = &segments[0];
        assert_eq!((s.x1, s.y1), (50.0, 0.0));
        assert!((s.x2 - 50.0).abs() < 1e-3);
        assert!((s.y2 - params.segment_length).abs() < 1e-3);
        assert!(!s.is_branch);
        assert_eq!(s.depth, 0);
    }

    #[test]
    fn test_all_segments_in_bounds() {
        let params = LSystemParams::default();
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
    fn test_trunk_segments_full_intensity() {
        let mut rng = Rng::new(7);
        let mut segments = Vec::new();
        generate(&LSystemParams::default(), &mut rng, &mut segments);
        for s in &segments {
            if !s.is_branch {
                assert_eq!(s.depth, 0);
                assert_eq!(s.intensity, 1.0);
            } else {
                assert!(s.intensity >= 0.7);
            }
        }
    }
}
