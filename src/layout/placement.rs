//! Member placement from solved unit centers.
//!
//! A unit's members fill its unit width left to right. The anchor takes the
//! leftmost slot; the others follow at `member_gap` steps, ordered by where
//! their BFS parent sits in its generation, then by id. Adding or removing
//! a spouse elsewhere never moves an anchor relative to its unit.

use std::collections::BTreeMap;

use super::generation::Generations;
use super::units::UnitGraph;
use super::width::unit_width;
use super::{LayoutConfig, Position};
use crate::graph::FamilyGraph;

/// Member positions and the final generations.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    pub positions: BTreeMap<String, Position>,
    /// Member ids per generation, sorted by x then id.
    pub layers: Vec<Vec<String>>,
}

/// Expand unit centers into member positions.
pub fn place_members(
    family: &FamilyGraph,
    generations: &Generations,
    units: &UnitGraph,
    centers: &[f32],
    config: &LayoutConfig,
) -> Placement {
    let mut placed: Vec<(usize, u32, Position)> = Vec::with_capacity(family.len());

    for (index, unit) in units.units().iter().enumerate() {
        let base_x = centers[index] - unit_width(unit, config) / 2.0;
        let y = config.generation_y(unit.depth);

        placed.push((unit.anchor, unit.depth, Position::new(base_x, y)));

        let mut others: Vec<usize> = unit
            .members
            .iter()
            .copied()
            .filter(|&m| m != unit.anchor)
            .collect();
        others.sort_by(|&a, &b| {
            let slot = |m: usize| {
                generations.bfs_parent[m].map_or(usize::MAX, |p| generations.layer_index[p])
            };
            slot(a)
                .cmp(&slot(b))
                .then_with(|| family.id(a).cmp(family.id(b)))
        });
        for (step, member) in others.into_iter().enumerate() {
            let x = base_x + (step + 1) as f32 * config.member_gap;
            placed.push((member, unit.depth, Position::new(x, y)));
        }
    }

    normalize_left_margin(&mut placed, config.min_left_margin);

    let generation_count = units.generation_count();
    let mut rows: Vec<Vec<(usize, Position)>> = vec![Vec::new(); generation_count];
    for &(member, depth, position) in &placed {
        rows[depth as usize].push((member, position));
    }

    let layers: Vec<Vec<String>> = rows
        .into_iter()
        .map(|mut row| {
            row.sort_by(|(a, pa), (b, pb)| {
                pa.x.total_cmp(&pb.x)
                    .then_with(|| family.id(*a).cmp(family.id(*b)))
            });
            row.into_iter()
                .map(|(member, _)| family.id(member).to_string())
                .collect::<Vec<_>>()
        })
        .collect();

    let positions: BTreeMap<String, Position> = placed
        .into_iter()
        .map(|(member, _, position)| (family.id(member).to_string(), position))
        .collect();

    Placement { positions, layers }
}

/// Shift everything right so the leftmost x is at least `margin`.
fn normalize_left_margin(placed: &mut [(usize, u32, Position)], margin: f32) {
    let min_x = placed
        .iter()
        .map(|(_, _, p)| p.x)
        .fold(f32::INFINITY, f32::min);
    if min_x.is_finite() && min_x < margin {
        let shift = margin - min_x;
        for (_, _, position) in placed.iter_mut() {
            position.x += shift;
        }
    }
}
