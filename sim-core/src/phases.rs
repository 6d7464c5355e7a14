//! High-level update phases for the colony simulation.
//!
//! One tick of the simulation runs, in order:
//! 1. [`field_phase`] — refresh each cell's cached signal concentration
//!    from the field clock.
//! 2. [`growth_phase`] — advance growth accumulators and run divisions
//!    through the direction allocator.
//! 3. [`survival_phase`] — apply selection pressure; failing cells start
//!    dying.
//! 4. [`death_phase`] — advance death fades and purge fully dead cells.
//! 5. [`drift_phase`] — advance division interpolation on offspring and
//!    dividing parents.
//! 6. [`shape_phase`] — ease every cell's elongation toward the oxygen
//!    target.
//!
//! Capacity enforcement runs afterwards via
//! [`Population::enforce_capacity`].

use crate::cell::{Cell, LifecycleState, target_length};
use crate::config::Config;
use crate::direction::{founder_branches, offspring_branches};
use crate::field::{FieldClock, concentration};
use crate::population::Population;
use crate::selection::{SelectionLevel, inherit_mutation, survives};
use crate::types::CellId;
use log::trace;
use rand::Rng;

/// Refreshes the cached signal concentration on every cell.
///
/// Does nothing while emission is inactive; the caches keep whatever
/// value was last computed (zero before the first emission).
pub fn field_phase(population: &mut Population, clock: &FieldClock) {
    if !clock.emitting() {
        return;
    }
    for cell in population.iter_mut() {
        cell.signal_concentration = concentration(cell.position, clock.time(), true);
    }
}

/// Advances growth accumulators and triggers divisions.
///
/// Only `Growing` cells accumulate growth. A cell whose accumulator
/// crosses `1 + division_delay` attempts to divide; divisions decline
/// silently when the population is at capacity or the cell has used up
/// its division allowance (ten for the founder, one for everyone else).
///
/// ### Parameters
/// - `population` - The colony; offspring are inserted here.
/// - `growth_rate_percent` - Colony-wide growth rate for this tick.
/// - `cfg` - Global configuration.
/// - `rng` - Randomness for branch allocation and offspring traits.
///
/// ### Returns
/// Ids of all offspring created this tick, in creation order.
pub fn growth_phase(
    population: &mut Population,
    growth_rate_percent: f32,
    cfg: &Config,
    rng: &mut impl Rng,
) -> Vec<CellId> {
    let base_increment = growth_rate_percent / cfg.growth_divisor;

    let mut dividers = Vec::new();
    for (index, cell) in population.cells_mut().iter_mut().enumerate() {
        if cell.state != LifecycleState::Growing {
            continue;
        }
        cell.growth_stage += base_increment * cell.growth_rate_modifier;
        if cell.ready_to_divide() {
            dividers.push(index);
        }
    }

    let mut spawned = Vec::new();
    for index in dividers {
        spawned.extend(divide(population, index, cfg, rng));
    }
    spawned
}

/// Runs one division for the cell at `index`, if it is allowed to.
fn divide(
    population: &mut Population,
    index: usize,
    cfg: &Config,
    rng: &mut impl Rng,
) -> Vec<CellId> {
    if population.len() >= cfg.max_visible_cells {
        // At capacity the periphery freezes: division is refused outright
        // rather than undone later.
        return Vec::new();
    }

    let parent = population.cells()[index].clone();
    let limit = if parent.is_founder {
        cfg.founder_division_limit
    } else {
        cfg.offspring_division_limit
    };
    if parent.state != LifecycleState::Growing || parent.division_count >= limit {
        return Vec::new();
    }

    let dual_probability = if parent.descendant_of_split {
        cfg.damped_dual_offspring_probability
    } else {
        cfg.dual_offspring_probability
    };
    let dual = rng.random_range(0.0..1.0) < dual_probability;

    {
        let parent = &mut population.cells_mut()[index];
        parent.state = LifecycleState::Dividing;
        parent.division_progress = 0.0;
        parent.division_count += 1;
    }

    // The branch slot index is the division count before this division.
    let division_index = parent.division_count as usize;
    let (first, second) = if parent.is_founder {
        founder_branches(division_index, dual, rng)
    } else {
        offspring_branches(parent.long_axis(), dual, rng)
    };

    let mut spawned = Vec::new();
    for branch in std::iter::once(first).chain(second) {
        let id = population.allocate_id();
        let mutation = inherit_mutation(parent.mutation_level, cfg, rng);
        let distance = parent.scale * cfg.separation_scale * branch.separation_factor;
        let child = Cell::offspring(id, &parent, &branch, distance, mutation, dual, rng);
        if population.insert(child, cfg) {
            spawned.push(id);
        }
    }
    trace!(
        "cell {} divided into {} offspring (division {})",
        parent.id,
        spawned.len(),
        division_index + 1
    );
    spawned
}

/// Applies selection pressure to every live cell.
///
/// A live cell that fails the survival check starts dying; cells that
/// are already dying or dead are left alone.
///
/// ### Returns
/// How many cells started dying this tick.
pub fn survival_phase(population: &mut Population, level: SelectionLevel) -> usize {
    let mut marked = 0;
    for cell in population.iter_mut() {
        if cell.is_live() && !survives(cell, level) {
            cell.begin_dying();
            marked += 1;
        }
    }
    marked
}

/// Advances every dying cell's fade and purges the fully dead.
///
/// ### Returns
/// How many cells were purged.
pub fn death_phase(population: &mut Population, cfg: &Config) -> usize {
    for cell in population.iter_mut() {
        cell.step_death(cfg.death_step);
    }
    population.purge_dead()
}

/// Advances division interpolation: offspring drift outward and dividing
/// parents count toward their return to growth.
pub fn drift_phase(population: &mut Population, cfg: &Config) {
    for cell in population.iter_mut() {
        cell.step_drift(cfg.division_step);
        cell.step_division(cfg.division_step);
    }
}

/// Eases every non-dying cell's elongation toward the oxygen target.
pub fn shape_phase(population: &mut Population, cfg: &Config) {
    let target = target_length(cfg.oxygen, cfg.max_length_ratio);
    for cell in population.iter_mut() {
        if cell.is_live() {
            cell.ease_shape(target, cfg.shape_easing);
        }
    }
}
