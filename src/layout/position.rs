//! Horizontal placement of spousal units.
//!
//! Every unit owns a footprint: its subtree width, centered on the unit's x
//! center. Placement runs two passes over the generations.
//!
//! 1. **Top-down:** units that share the exact same set of parent units form
//!    a sibling block. A block is centered under the mean center of its
//!    parents and its units are packed left to right inside it. Parentless
//!    blocks are packed in sequence instead of stacking at one x.
//! 2. **Bottom-up:** every unit with layout children is moved over the mean
//!    center of its immediate child units.
//!
//! Each generation is finished by a collision sweep: sorted by center, every
//! footprint is pushed right until it starts at least `unit_gap` after the
//! previous one ends. Footprints never overlap after a sweep.

use super::LayoutConfig;
use super::units::UnitGraph;

/// A run of sibling units sharing one parent-unit set.
struct SiblingBlock {
    parents: Vec<usize>,
    units: Vec<usize>,
}

/// Solve the x center of every unit.
pub fn solve_centers(
    units: &UnitGraph,
    widths: &[f32],
    config: &LayoutConfig,
    viewport_width: f32,
) -> Vec<f32> {
    let mut centers = vec![0.0f32; units.len()];
    let mut generations = generation_rows(units);

    for row in generations.iter_mut() {
        place_row(row, units, widths, config, viewport_width, &mut centers);
        sweep(row, &mut centers, widths, config.unit_gap);
    }

    for row in generations.iter_mut().rev().skip(1) {
        for &unit in row.iter() {
            let children = units.layout_children(unit);
            if !children.is_empty() {
                let sum: f32 = children.iter().map(|&c| centers[c]).sum();
                centers[unit] = sum / children.len() as f32;
            }
        }
        sweep(row, &mut centers, widths, config.unit_gap);
    }

    centers
}

/// Units per generation in sibling order: first BFS visit, then anchor id.
fn generation_rows(units: &UnitGraph) -> Vec<Vec<usize>> {
    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); units.generation_count()];
    for (index, unit) in units.units().iter().enumerate() {
        rows[unit.depth as usize].push(index);
    }
    for row in rows.iter_mut() {
        row.sort_by_key(|&u| units.unit(u).rank);
    }
    rows
}

/// Top-down placement of one generation.
fn place_row(
    row: &[usize],
    units: &UnitGraph,
    widths: &[f32],
    config: &LayoutConfig,
    viewport_width: f32,
    centers: &mut [f32],
) {
    let gap = config.unit_gap;
    let blocks = sibling_blocks(row, units);
    let block_width = |block: &SiblingBlock| {
        let sum: f32 = block.units.iter().map(|&u| widths[u]).sum();
        sum + gap * block.units.len().saturating_sub(1) as f32
    };

    let mut rightmost: Option<f32> = None;
    for block in blocks.iter().filter(|b| !b.parents.is_empty()) {
        let sum: f32 = block.parents.iter().map(|&p| centers[p]).sum();
        let center = sum / block.parents.len() as f32;
        let right = pack_block(block, center, block_width(block), widths, gap, centers);
        rightmost = Some(rightmost.map_or(right, |r: f32| r.max(right)));
    }

    let free: Vec<&SiblingBlock> = blocks.iter().filter(|b| b.parents.is_empty()).collect();
    if free.is_empty() {
        return;
    }
    let mut cursor = match rightmost {
        Some(right) => right + gap,
        None => {
            let total: f32 = free.iter().map(|b| block_width(*b)).sum::<f32>()
                + gap * free.len().saturating_sub(1) as f32;
            ((viewport_width - total) / 2.0).max(0.0)
        }
    };
    for block in free {
        let width = block_width(block);
        pack_block(block, cursor + width / 2.0, width, widths, gap, centers);
        cursor += width + gap;
    }
}

/// Group a generation into sibling blocks, in order of first appearance.
fn sibling_blocks(row: &[usize], units: &UnitGraph) -> Vec<SiblingBlock> {
    let mut blocks: Vec<SiblingBlock> = Vec::new();
    for &unit in row {
        let parents = units.layout_parents(unit);
        match blocks.iter_mut().find(|b| b.parents == parents) {
            Some(block) => block.units.push(unit),
            None => blocks.push(SiblingBlock {
                parents,
                units: vec![unit],
            }),
        }
    }
    blocks
}

/// Lay a block's units left to right centered on `center`. Returns the
/// right edge of the block.
fn pack_block(
    block: &SiblingBlock,
    center: f32,
    width: f32,
    widths: &[f32],
    gap: f32,
    centers: &mut [f32],
) -> f32 {
    let mut left = center - width / 2.0;
    for &unit in &block.units {
        centers[unit] = left + widths[unit] / 2.0;
        left += widths[unit] + gap;
    }
    center + width / 2.0
}

/// Sort a generation by center and push overlapping footprints right.
fn sweep(row: &mut [usize], centers: &mut [f32], widths: &[f32], gap: f32) {
    row.sort_by(|&a, &b| centers[a].total_cmp(&centers[b]));

    let mut previous_right: Option<f32> = None;
    for &unit in row.iter() {
        let half = widths[unit] / 2.0;
        if let Some(right) = previous_right {
            let min_center = right + gap + half;
            if centers[unit] < min_center {
                centers[unit] = min_center;
            }
        }
        previous_right = Some(centers[unit] + half);
    }
}
