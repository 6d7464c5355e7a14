//! Bounded, insertion-ordered store of live cells.

use crate::cell::{Cell, LifecycleState};
use crate::config::Config;
use crate::types::CellId;
use log::debug;
use thiserror::Error;

/// Fatal invariant violations.
///
/// These indicate a logic bug in the simulation core, not a recoverable
/// runtime condition; policy declines (at capacity, division limit and
/// the like) are silent no-ops instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantError {
    #[error("population holds {count} cells, exceeding the capacity of {capacity}")]
    OverCapacity { count: usize, capacity: usize },
    #[error("cell {id} carries mutation level {level}, outside 0..=2")]
    MutationOutOfRange { id: CellId, level: u8 },
    #[error("{count} founder cells are present; expected at most one")]
    MultipleFounders { count: usize },
}

/// The colony's cell store.
///
/// Cells keep their insertion order; ids come from a monotonically
/// increasing counter that restarts on [`Population::reset`]. The store
/// also tracks how many cells were ever created in the current epoch.
#[derive(Debug)]
pub struct Population {
    cells: Vec<Cell>,
    next_id: CellId,
    total_created: u64,
}

impl Population {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            next_id: 1,
            total_created: 0,
        }
    }

    /// Hands out the next cell id.
    pub fn allocate_id(&mut self) -> CellId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Inserts a cell, silently dropping it when the store is full.
    ///
    /// ### Returns
    /// `true` if the cell was actually stored.
    pub fn insert(&mut self, cell: Cell, cfg: &Config) -> bool {
        if self.cells.len() >= cfg.max_visible_cells {
            debug!("dropping cell {} at capacity", cell.id);
            return false;
        }
        self.total_created = (self.total_created + 1).min(cfg.max_total_cells);
        self.cells.push(cell);
        true
    }

    /// Removes cells until the store fits the capacity again.
    ///
    /// Victims are picked from the periphery: among cells that are not
    /// important (important means the founder, or anything closer to the
    /// origin than the protected radius), the most distant one goes
    /// first. If only important cells remain, the globally most distant
    /// cell is removed instead.
    ///
    /// ### Returns
    /// How many cells were evicted.
    pub fn enforce_capacity(&mut self, cfg: &Config) -> usize {
        let mut evicted = 0;
        while self.cells.len() > cfg.max_visible_cells {
            let Some(victim) = self.eviction_victim(cfg) else {
                break;
            };
            self.cells.remove(victim);
            evicted += 1;
        }
        if evicted > 0 {
            debug!("evicted {evicted} peripheral cells over capacity");
        }
        evicted
    }

    fn eviction_victim(&self, cfg: &Config) -> Option<usize> {
        let mut farthest_any: Option<(usize, f32)> = None;
        let mut farthest_expendable: Option<(usize, f32)> = None;

        for (index, cell) in self.cells.iter().enumerate() {
            let distance = cell.distance_from_origin();
            if farthest_any.is_none_or(|(_, best)| distance > best) {
                farthest_any = Some((index, distance));
            }
            let important = cell.is_founder || distance < cfg.important_radius;
            if !important && farthest_expendable.is_none_or(|(_, best)| distance > best) {
                farthest_expendable = Some((index, distance));
            }
        }

        farthest_expendable.or(farthest_any).map(|(index, _)| index)
    }

    /// Drops all `Dead` cells, returning how many were purged.
    pub fn purge_dead(&mut self) -> usize {
        let before = self.cells.len();
        self.cells.retain(|cell| cell.state != LifecycleState::Dead);
        before - self.cells.len()
    }

    /// Discards every cell and restarts the id and creation counters.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.next_id = 1;
        self.total_created = 0;
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells participating in growth and survival (not dying or dead).
    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_live()).count()
    }

    pub fn total_created(&self) -> u64 {
        self.total_created
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.id == id)
    }

    /// The founder cell, while it is still in the store.
    pub fn founder(&self) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.is_founder)
    }

    /// Verifies the store's structural invariants.
    pub fn check_invariants(&self, cfg: &Config) -> Result<(), InvariantError> {
        if self.cells.len() > cfg.max_visible_cells {
            return Err(InvariantError::OverCapacity {
                count: self.cells.len(),
                capacity: cfg.max_visible_cells,
            });
        }
        if let Some(cell) = self
            .cells
            .iter()
            .find(|cell| cell.mutation_level > cfg.max_mutation_level)
        {
            return Err(InvariantError::MutationOutOfRange {
                id: cell.id,
                level: cell.mutation_level,
            });
        }
        let founders = self.cells.iter().filter(|cell| cell.is_founder).count();
        if founders > 1 {
            return Err(InvariantError::MultipleFounders { count: founders });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn small_config() -> Config {
        Config {
            max_visible_cells: 4,
            ..Config::default()
        }
    }

    fn cell_at(population: &mut Population, position: Vec3, cfg: &Config) -> CellId {
        let mut rng = SmallRng::seed_from_u64(1);
        let id = population.allocate_id();
        let mut cell = Cell::founder(id, 0.1, &mut rng);
        cell.is_founder = false;
        cell.has_resistance_trait = false;
        cell.position = position;
        assert!(population.insert(cell, cfg));
        id
    }

    #[test]
    fn ids_are_unique_and_monotonic() {
        let mut population = Population::new();
        let a = population.allocate_id();
        let b = population.allocate_id();
        assert!(b > a);

        population.reset();
        assert_eq!(population.allocate_id(), a);
    }

    #[test]
    fn insert_declines_silently_at_capacity() {
        let cfg = small_config();
        let mut population = Population::new();
        for i in 0..4 {
            cell_at(&mut population, Vec3::new(i as f32, 0.0, 0.0), &cfg);
        }

        let mut rng = SmallRng::seed_from_u64(2);
        let id = population.allocate_id();
        let extra = Cell::founder(id, 0.1, &mut rng);
        assert!(!population.insert(extra, &cfg));
        assert_eq!(population.len(), 4);
        // A dropped cell does not count as created.
        assert_eq!(population.total_created(), 4);
    }

    #[test]
    fn eviction_removes_the_most_distant_expendable_cell() {
        let cfg = small_config();
        let mut population = Population::new();

        let mut rng = SmallRng::seed_from_u64(3);
        let id = population.allocate_id();
        let founder = Cell::founder(id, 0.1, &mut rng);
        population.insert(founder, &cfg);

        let near = cell_at(&mut population, Vec3::new(2.0, 0.0, 0.0), &cfg);
        let far = cell_at(&mut population, Vec3::new(30.0, 0.0, 0.0), &cfg);
        let farther = cell_at(&mut population, Vec3::new(-40.0, 0.0, 0.0), &cfg);

        // Push one past capacity by force.
        let id = population.allocate_id();
        let mut intruder = Cell::founder(id, 0.1, &mut rng);
        intruder.is_founder = false;
        intruder.position = Vec3::new(10.0, 0.0, 0.0);
        population.cells.push(intruder);

        assert_eq!(population.enforce_capacity(&cfg), 1);
        assert!(population.get(farther).is_none(), "farthest cell evicted");
        assert!(population.get(far).is_some());
        assert!(population.get(near).is_some());
        assert!(population.founder().is_some());
        assert!(population.check_invariants(&cfg).is_ok());
    }

    #[test]
    fn protected_core_is_kept_until_nothing_else_remains() {
        let cfg = Config {
            max_visible_cells: 2,
            ..Config::default()
        };
        let mut population = Population::new();

        // All cells inside the protected radius, one slightly farther out.
        cell_at(&mut population, Vec3::new(1.0, 0.0, 0.0), &cfg);
        cell_at(&mut population, Vec3::new(2.0, 0.0, 0.0), &cfg);
        let outer = {
            let mut rng = SmallRng::seed_from_u64(4);
            let id = population.allocate_id();
            let mut cell = Cell::founder(id, 0.1, &mut rng);
            cell.is_founder = false;
            cell.position = Vec3::new(4.0, 0.0, 0.0);
            population.cells.push(cell);
            id
        };

        // Every cell is important, so the globally most distant one goes.
        assert_eq!(population.enforce_capacity(&cfg), 1);
        assert!(population.get(outer).is_none());
        assert_eq!(population.len(), 2);
    }

    #[test]
    fn purge_removes_only_dead_cells() {
        let cfg = small_config();
        let mut population = Population::new();
        let keep = cell_at(&mut population, Vec3::new(1.0, 0.0, 0.0), &cfg);
        let doomed = cell_at(&mut population, Vec3::new(2.0, 0.0, 0.0), &cfg);

        for cell in population.iter_mut() {
            if cell.id == doomed {
                cell.state = LifecycleState::Dead;
            }
        }

        assert_eq!(population.purge_dead(), 1);
        assert!(population.get(keep).is_some());
        assert!(population.get(doomed).is_none());
    }

    #[test]
    fn invariant_check_flags_over_capacity_and_bad_mutations() {
        let cfg = small_config();
        let mut population = Population::new();
        for i in 0..4 {
            cell_at(&mut population, Vec3::new(i as f32, 0.0, 0.0), &cfg);
        }
        assert!(population.check_invariants(&cfg).is_ok());

        // Force a fifth cell in to trip the capacity invariant.
        let mut rng = SmallRng::seed_from_u64(5);
        let id = population.allocate_id();
        let mut cell = Cell::founder(id, 0.1, &mut rng);
        cell.is_founder = false;
        population.cells.push(cell);
        assert_eq!(
            population.check_invariants(&cfg),
            Err(InvariantError::OverCapacity {
                count: 5,
                capacity: 4
            })
        );

        population.cells.pop();
        population.cells[0].mutation_level = 3;
        let id = population.cells[0].id;
        assert_eq!(
            population.check_invariants(&cfg),
            Err(InvariantError::MutationOutOfRange { id, level: 3 })
        );

        population.cells[0].mutation_level = 0;
        population.cells[0].is_founder = true;
        population.cells[1].is_founder = true;
        assert_eq!(
            population.check_invariants(&cfg),
            Err(InvariantError::MultipleFounders { count: 2 })
        );
    }

    #[test]
    fn total_created_saturates_at_the_cap() {
        let cfg = Config {
            max_visible_cells: 10,
            max_total_cells: 3,
            ..Config::default()
        };
        let mut population = Population::new();
        for i in 0..5 {
            cell_at(&mut population, Vec3::new(i as f32, 0.0, 0.0), &cfg);
        }
        assert_eq!(population.total_created(), 3);
    }
}
