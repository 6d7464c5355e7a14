//! Cell entities and their per-tick stepping.

use crate::direction::Branch;
use crate::types::CellId;
use glam::{Quat, Vec3};
use rand::Rng;

/// Lifecycle of a cell.
///
/// `Growing -> Dividing -> Growing` repeats until the cell runs out of
/// divisions; selection pressure can push a growing or dividing cell
/// into `Dying`, and a fully dark dying cell becomes `Dead` and is
/// purged by the population on the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Growing,
    Dividing,
    Dying,
    Dead,
}

/// Position interpolation for a freshly spawned offspring.
///
/// The offspring is inserted into the population immediately and slides
/// from its parent's position toward the final offset over a bounded
/// number of ticks; no deferred spawning, no animation callbacks.
#[derive(Debug, Clone, Copy)]
pub struct Drift {
    /// Parent position at the moment of division.
    pub origin: Vec3,
    /// Unit drift direction.
    pub direction: Vec3,
    /// Final offset distance from the origin.
    pub distance: f32,
    /// Interpolation progress in `[0, 1]`.
    pub progress: f32,
}

/// One cell of the colony.
#[derive(Debug, Clone)]
pub struct Cell {
    pub id: CellId,
    /// Id of the dividing parent, or `None` for the founder.
    pub parent_id: Option<CellId>,
    pub position: Vec3,
    /// Unit quaternion; the cell's long axis is its local `+X`.
    pub orientation: Quat,
    /// Elongation along the long axis, eased toward the oxygen target.
    pub scale: f32,
    /// Divisions this cell has itself undergone.
    pub division_count: u32,
    pub is_founder: bool,
    /// Growth accumulator; the cell divides at `1 + division_delay`.
    pub growth_stage: f32,
    pub division_delay: f32,
    /// Per-cell growth multiplier, fixed at creation.
    pub growth_rate_modifier: f32,
    /// Branch-dependent multiplier on the division drift distance.
    pub separation_factor: f32,
    pub has_resistance_trait: bool,
    /// Inherited resistance tier, 0 to 2.
    pub mutation_level: u8,
    /// Cached field concentration at this cell's position.
    pub signal_concentration: f32,
    pub state: LifecycleState,
    /// Advances while `Dying`; the cell is purged at 1.
    pub death_progress: f32,
    /// Observable fade attribute, `1 - death_progress` while dying.
    pub brightness: f32,
    /// Whether this cell's parent produced two offspring at once.
    pub descendant_of_split: bool,
    /// Parent-side interpolation counter while `Dividing`.
    pub division_progress: f32,
    /// Offspring-side division interpolation, cleared on completion.
    pub drift: Option<Drift>,
}

impl Cell {
    /// Creates the colony's origin cell at the origin.
    pub fn founder(id: CellId, division_delay: f32, rng: &mut impl Rng) -> Self {
        Self {
            id,
            parent_id: None,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: 1.0,
            division_count: 0,
            is_founder: true,
            growth_stage: 0.0,
            division_delay,
            growth_rate_modifier: random_growth_modifier(rng),
            separation_factor: 1.0,
            has_resistance_trait: true,
            mutation_level: 0,
            signal_concentration: 0.0,
            state: LifecycleState::Growing,
            death_progress: 0.0,
            brightness: 1.0,
            descendant_of_split: false,
            division_progress: 0.0,
            drift: None,
        }
    }

    /// Creates a division offspring next to its parent.
    ///
    /// The offspring starts at the parent's position and drifts along the
    /// branch direction to `drift_distance`. Resistance and concentration
    /// are inherited; the mutation level is decided by the caller.
    pub fn offspring(
        id: CellId,
        parent: &Cell,
        branch: &Branch,
        drift_distance: f32,
        mutation_level: u8,
        descendant_of_split: bool,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            id,
            parent_id: Some(parent.id),
            position: parent.position,
            orientation: branch.orientation(),
            scale: 1.0,
            division_count: 0,
            is_founder: false,
            growth_stage: 0.0,
            division_delay: branch.division_delay,
            growth_rate_modifier: random_growth_modifier(rng),
            separation_factor: branch.separation_factor,
            has_resistance_trait: parent.has_resistance_trait,
            mutation_level,
            signal_concentration: parent.signal_concentration,
            state: LifecycleState::Growing,
            death_progress: 0.0,
            brightness: 1.0,
            descendant_of_split,
            division_progress: 0.0,
            drift: Some(Drift {
                origin: parent.position,
                direction: branch.direction,
                distance: drift_distance,
                progress: 0.0,
            }),
        }
    }

    /// The cell's long axis in world space.
    pub fn long_axis(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn distance_from_origin(&self) -> f32 {
        self.position.length()
    }

    /// Live means participating in growth and survival checks.
    pub fn is_live(&self) -> bool {
        matches!(self.state, LifecycleState::Growing | LifecycleState::Dividing)
    }

    /// Whether the growth accumulator has crossed the division threshold.
    pub fn ready_to_divide(&self) -> bool {
        self.growth_stage >= 1.0 + self.division_delay
    }

    /// Starts the death fade. Growth and division stop immediately.
    pub fn begin_dying(&mut self) {
        self.state = LifecycleState::Dying;
        self.death_progress = 0.0;
        self.drift = None;
    }

    /// Advances the death fade by `step`.
    ///
    /// ### Returns
    /// `true` once the cell has fully darkened and turned `Dead`.
    pub fn step_death(&mut self, step: f32) -> bool {
        if self.state != LifecycleState::Dying {
            return false;
        }
        self.death_progress += step;
        self.brightness = (1.0 - self.death_progress).max(0.0);
        // The tolerance keeps 50 accumulated steps of 0.02 landing on 1.
        if self.death_progress + 1e-6 >= 1.0 {
            self.death_progress = 1.0;
            self.brightness = 0.0;
            self.state = LifecycleState::Dead;
            return true;
        }
        false
    }

    /// Advances the offspring drift interpolation, if any.
    pub fn step_drift(&mut self, step: f32) {
        if let Some(drift) = &mut self.drift {
            drift.progress = (drift.progress + step).min(1.0);
            self.position = drift.origin + drift.direction * (drift.distance * drift.progress);
            if drift.progress >= 1.0 {
                self.drift = None;
            }
        }
    }

    /// Advances the parent-side division counter.
    ///
    /// ### Returns
    /// `true` when the division completed and the cell returned to
    /// `Growing` with a reset growth accumulator.
    pub fn step_division(&mut self, step: f32) -> bool {
        if self.state != LifecycleState::Dividing {
            return false;
        }
        self.division_progress += step;
        if self.division_progress >= 1.0 {
            self.state = LifecycleState::Growing;
            self.growth_stage = 0.0;
            self.division_progress = 0.0;
            return true;
        }
        false
    }

    /// Eases the elongation toward `target`.
    pub fn ease_shape(&mut self, target: f32, easing: f32) {
        self.scale += (target - self.scale) * easing;
    }
}

/// Per-cell growth multiplier drawn once at creation.
fn random_growth_modifier(rng: &mut impl Rng) -> f32 {
    rng.random_range(0.6..1.4)
}

/// Target elongation for the given oxygen level.
///
/// Aerobic conditions (oxygen at or above 20%) keep the cell round;
/// lower oxygen elongates it up to `max_ratio`.
pub fn target_length(oxygen: f32, max_ratio: f32) -> f32 {
    if oxygen >= 20.0 {
        1.0
    } else {
        let increase = (20.0 - oxygen) / 20.0 * (max_ratio - 1.0);
        (1.0 + increase).min(max_ratio)
    }
}
