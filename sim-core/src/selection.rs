//! Selection pressure and mutation inheritance.

use crate::cell::Cell;
use crate::config::Config;
use log::{debug, trace};
use rand::Rng;

/// Signal concentration that lets a cell survive low pressure.
const LOW_SURVIVAL_CONCENTRATION: f32 = 0.2;
/// Signal concentration that lets a cell survive high pressure.
const HIGH_SURVIVAL_CONCENTRATION: f32 = 0.3;

/// External selection pressure level, ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum SelectionLevel {
    #[default]
    None,
    Low,
    High,
}

/// Current pressure applied to the colony.
///
/// The level only ever escalates; a request to step back down is
/// rejected and leaves the state unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection {
    level: SelectionLevel,
}

impl Selection {
    pub fn level(&self) -> SelectionLevel {
        self.level
    }

    /// Applies a pressure change.
    ///
    /// ### Returns
    /// `true` if the change was a forward transition and took effect.
    pub fn escalate(&mut self, level: SelectionLevel) -> bool {
        if level > self.level {
            debug!("selection pressure escalated to {level:?}");
            self.level = level;
            true
        } else {
            trace!("ignoring selection change to {level:?} (currently {:?})", self.level);
            false
        }
    }
}

/// Whether `cell` survives the given pressure this tick.
///
/// Survival comes from either enough of the diffusing signal or an
/// inherited mutation of sufficient tier.
pub fn survives(cell: &Cell, level: SelectionLevel) -> bool {
    match level {
        SelectionLevel::None => true,
        SelectionLevel::Low => {
            cell.signal_concentration >= LOW_SURVIVAL_CONCENTRATION || cell.mutation_level >= 1
        }
        SelectionLevel::High => {
            cell.signal_concentration >= HIGH_SURVIVAL_CONCENTRATION || cell.mutation_level == 2
        }
    }
}

/// Mutation level an offspring inherits at division.
///
/// The parent's level carries over and, with a small probability,
/// advances by exactly one tier up to the configured cap.
pub fn inherit_mutation(parent_level: u8, cfg: &Config, rng: &mut impl Rng) -> u8 {
    if rng.random_range(0.0..1.0) < cfg.mutation_probability {
        (parent_level + 1).min(cfg.max_mutation_level)
    } else {
        parent_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn cell_with(concentration: f32, mutation: u8) -> Cell {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut cell = Cell::founder(1, 0.1, &mut rng);
        cell.signal_concentration = concentration;
        cell.mutation_level = mutation;
        cell
    }

    #[test]
    fn no_pressure_spares_everything() {
        assert!(survives(&cell_with(0.0, 0), SelectionLevel::None));
    }

    #[test]
    fn low_pressure_thresholds() {
        assert!(survives(&cell_with(0.2, 0), SelectionLevel::Low));
        assert!(survives(&cell_with(0.0, 1), SelectionLevel::Low));
        assert!(!survives(&cell_with(0.19, 0), SelectionLevel::Low));
    }

    #[test]
    fn high_pressure_requires_strong_resistance() {
        assert!(survives(&cell_with(0.3, 0), SelectionLevel::High));
        assert!(survives(&cell_with(0.0, 2), SelectionLevel::High));
        // A weak mutation is not enough under high pressure.
        assert!(!survives(&cell_with(0.1, 1), SelectionLevel::High));
        assert!(!survives(&cell_with(0.1, 0), SelectionLevel::High));
    }

    #[test]
    fn escalation_is_forward_only() {
        let mut selection = Selection::default();
        assert_eq!(selection.level(), SelectionLevel::None);

        assert!(selection.escalate(SelectionLevel::Low));
        assert_eq!(selection.level(), SelectionLevel::Low);

        // Downgrade and repeat requests are rejected without a change.
        assert!(!selection.escalate(SelectionLevel::None));
        assert!(!selection.escalate(SelectionLevel::Low));
        assert_eq!(selection.level(), SelectionLevel::Low);

        assert!(selection.escalate(SelectionLevel::High));
        assert!(!selection.escalate(SelectionLevel::Low));
        assert_eq!(selection.level(), SelectionLevel::High);
    }

    #[test]
    fn skipping_straight_to_high_is_allowed() {
        let mut selection = Selection::default();
        assert!(selection.escalate(SelectionLevel::High));
        assert_eq!(selection.level(), SelectionLevel::High);
    }

    #[test]
    fn mutation_inheritance_is_capped() {
        let cfg = Config {
            mutation_probability: 1.0,
            ..Config::default()
        };
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(inherit_mutation(0, &cfg, &mut rng), 1);
        assert_eq!(inherit_mutation(1, &cfg, &mut rng), 2);
        // Already at the cap: stays there.
        assert_eq!(inherit_mutation(2, &cfg, &mut rng), 2);
    }

    #[test]
    fn mutation_inheritance_usually_copies_the_parent() {
        let cfg = Config {
            mutation_probability: 0.0,
            ..Config::default()
        };
        let mut rng = SmallRng::seed_from_u64(5);
        for level in 0..=2 {
            assert_eq!(inherit_mutation(level, &cfg, &mut rng), level);
        }
    }

    #[test]
    fn founder_origin_is_unused_in_survival() {
        // Survival reads only the cached concentration and mutation tier;
        // position plays no direct part.
        let mut cell = cell_with(0.5, 0);
        cell.position = Vec3::new(100.0, 0.0, 0.0);
        assert!(survives(&cell, SelectionLevel::High));
    }
}
