use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::graph::GraphSnapshot;
use crate::util::stable_pair;

pub const DEFAULT_LAYOUT_ITERATIONS: usize = 240;

pub trait LayoutEngine: Send {
    fn layout(&self, snapshot: &GraphSnapshot) -> HashMap<String, Vec2>;
}

/// Fruchterman–Reingold style relaxation with the center pinned at the
/// origin. Stronger interactions get shorter springs.
#[derive(Clone, Copy, Debug)]
pub struct ForceLayout {
    pub iterations: usize,
    pub spacing: f32,
}

impl Default for ForceLayout {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_LAYOUT_ITERATIONS,
            spacing: 180.0,
        }
    }
}

impl ForceLayout {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    fn initial_positions(&self, snapshot: &GraphSnapshot, pinned: Option<usize>) -> Vec<Vec2> {
        let nodes = snapshot.nodes();
        let ring = nodes.len().saturating_sub(usize::from(pinned.is_some())).max(1);
        let radius = self.spacing * (1.0 + (ring as f32).sqrt() * 0.35);

        let mut slot = 0usize;
        nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                if Some(index) == pinned {
                    return Vec2::ZERO;
                }

                let angle = (slot as f32 / ring as f32) * TAU;
                slot += 1;
                let (jx, jy) = stable_pair(&node.id);
                vec2(angle.cos(), angle.sin()) * radius + vec2(jx, jy) * (self.spacing * 0.2)
            })
            .collect()
    }
}

impl LayoutEngine for ForceLayout {
    fn layout(&self, snapshot: &GraphSnapshot) -> HashMap<String, Vec2> {
        let nodes = snapshot.nodes();
        let n = nodes.len();
        if n == 0 {
            return HashMap::new();
        }

        let pinned = snapshot
            .center_node()
            .and_then(|node| snapshot.index_of(&node.id));
        let mut positions = self.initial_positions(snapshot, pinned);

        let springs = snapshot
            .edges()
            .iter()
            .filter_map(|edge| {
                let from = snapshot.index_of(&edge.from)?;
                let to = snapshot.index_of(&edge.to)?;
                (from != to).then_some((from, to, edge.weight as f32))
            })
            .collect::<Vec<_>>();

        let k = self.spacing;
        let mut temperature = k * 0.8;

        for _ in 0..self.iterations {
            let mut disp = vec![Vec2::ZERO; n];

            for i in 0..n {
                for j in (i + 1)..n {
                    let delta = positions[i] - positions[j];
                    let distance = delta.length().max(0.5);
                    let direction = delta / distance;
                    let force = (k * k) / distance;
                    disp[i] += direction * force;
                    disp[j] -= direction * force;
                }
            }

            for &(from, to, weight) in &springs {
                let delta = positions[from] - positions[to];
                let distance = delta.length().max(0.5);
                let direction = delta / distance;
                let ideal_length = k * (1.6 - weight.clamp(0.0, 1.0) * 0.8);
                let force = (distance - ideal_length) * 0.35;
                disp[from] -= direction * force;
                disp[to] += direction * force;
            }

            for (index, position) in positions.iter_mut().enumerate() {
                if Some(index) == pinned {
                    continue;
                }

                let d = disp[index] - *position * 0.002;
                let length = d.length();
                if length > 0.0 {
                    *position += d / length * length.min(temperature);
                }
            }

            temperature *= 0.96;
            if temperature < 0.5 {
                break;
            }
        }

        nodes
            .iter()
            .zip(positions)
            .map(|(node, position)| (node.id.clone(), position))
            .collect()
    }
}
