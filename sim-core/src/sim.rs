//! The owning simulation context and its command/snapshot surface.

use crate::cell::{Cell, LifecycleState};
use crate::config::Config;
use crate::field::FieldClock;
use crate::phases;
use crate::population::{InvariantError, Population};
use crate::selection::{Selection, SelectionLevel};
use crate::types::CellId;
use glam::{Quat, Vec3};
use log::debug;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// A command forwarded from the UI layer into the core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Pauses or resumes the growth clock.
    SetPaused(bool),
    /// Discards the colony and reinstalls a single founder cell.
    Reset,
    /// Changes the speed multiplier, clamped to the configured range.
    SetSpeedMultiplier(f32),
    /// Starts signal emission; a no-op if already emitting.
    BeginSignalEmission,
    /// Escalates selection pressure; downgrades are rejected.
    ApplySelection(SelectionLevel),
}

/// What happened during one tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Ids of offspring created this tick.
    pub spawned: Vec<CellId>,
    /// Cells that started dying this tick.
    pub marked_dying: usize,
    /// Fully dead cells purged this tick.
    pub purged: usize,
    /// Cells evicted by the capacity policy this tick.
    pub evicted: usize,
}

/// Render-facing view of one cell.
#[derive(Debug, Clone, Copy)]
pub struct CellView {
    pub id: CellId,
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: f32,
    pub state: LifecycleState,
    pub mutation_level: u8,
    pub signal_concentration: f32,
    pub has_resistance_trait: bool,
    /// Fades from 1 to 0 while the cell dies.
    pub brightness: f32,
}

/// Aggregate statistics for one tick's snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// Cells ever created this epoch, saturating at the configured cap.
    pub total_created: u64,
    /// Cells currently growing or dividing.
    pub live_cells: usize,
    /// Mean elongation across live cells.
    pub mean_scale: f32,
    /// Current colony growth rate, as a percentage.
    pub growth_rate_percent: f32,
    /// Simulated minutes elapsed on the growth clock.
    pub elapsed_minutes: u64,
    /// Simulated seconds past the elapsed minute.
    pub elapsed_seconds: u64,
}

/// Immutable per-tick view handed to the renderer.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// All non-purged cells, in insertion order.
    pub cells: Vec<CellView>,
    pub stats: Stats,
}

/// The simulation core.
///
/// Owns the population, both clocks, the RNG and the selection state;
/// external callers drive it with [`Simulation::tick`] and the command
/// surface, and read results through [`Simulation::snapshot`]. All work
/// in a tick completes synchronously before the call returns.
#[derive(Debug)]
pub struct Simulation {
    config: Config,
    population: Population,
    rng: SmallRng,
    /// Growth clock: ticks elapsed while unpaused.
    ticks: u64,
    field: FieldClock,
    selection: Selection,
    paused: bool,
    speed_multiplier: f32,
}

impl Simulation {
    /// Creates a paused simulation holding a single founder cell.
    pub fn new(config: Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let mut sim = Self {
            config,
            population: Population::new(),
            rng,
            ticks: 0,
            field: FieldClock::new(),
            selection: Selection::default(),
            paused: true,
            speed_multiplier: 1.0,
        };
        sim.install_founder();
        sim
    }

    /// Advances the simulation by one discrete step.
    ///
    /// The field clock runs whenever emission is active, pause or not;
    /// the growth clock and the lifecycle phases run only while
    /// unpaused. External schedulers control real-time pacing (a higher
    /// speed also shortens the interval between calls).
    pub fn tick(&mut self) -> TickReport {
        if self.field.emitting() {
            self.field.advance(self.config.field_step);
            phases::field_phase(&mut self.population, &self.field);
        }

        let mut report = TickReport::default();
        if !self.paused {
            self.ticks += 1;
            let rate = self.growth_rate_percent();

            report.spawned =
                phases::growth_phase(&mut self.population, rate, &self.config, &mut self.rng);
            report.marked_dying =
                phases::survival_phase(&mut self.population, self.selection.level());
            report.purged = phases::death_phase(&mut self.population, &self.config);
            phases::drift_phase(&mut self.population, &self.config);
            phases::shape_phase(&mut self.population, &self.config);
            report.evicted = self.population.enforce_capacity(&self.config);
        }

        debug_assert!(
            self.population.check_invariants(&self.config).is_ok(),
            "population invariants violated after tick"
        );
        report
    }

    /// Applies a UI command.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetPaused(paused) => self.set_paused(paused),
            Command::Reset => self.reset(),
            Command::SetSpeedMultiplier(speed) => self.set_speed_multiplier(speed),
            Command::BeginSignalEmission => self.begin_signal_emission(),
            Command::ApplySelection(level) => {
                self.apply_selection(level);
            }
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Sets the speed multiplier, clamped to the configured range.
    pub fn set_speed_multiplier(&mut self, speed: f32) {
        self.speed_multiplier = speed.clamp(self.config.min_speed, self.config.max_speed);
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Starts signal emission; repeated calls change nothing.
    ///
    /// The concentration caches are primed immediately so the very next
    /// survival check already sees the saturated source.
    pub fn begin_signal_emission(&mut self) {
        if self.field.begin_emission() {
            debug!("signal emission started");
            phases::field_phase(&mut self.population, &self.field);
        }
    }

    /// Escalates selection pressure.
    ///
    /// ### Returns
    /// `true` if the level actually advanced; downgrade and repeat
    /// requests are rejected and leave the state unchanged.
    pub fn apply_selection(&mut self, level: SelectionLevel) -> bool {
        self.selection.escalate(level)
    }

    pub fn selection_level(&self) -> SelectionLevel {
        self.selection.level()
    }

    /// Discards the colony and starts a fresh epoch.
    ///
    /// Population, both clocks and the selection state are dropped
    /// atomically; a new founder is installed at the origin and the
    /// simulation comes back paused. The speed multiplier is kept.
    pub fn reset(&mut self) {
        self.population.reset();
        self.ticks = 0;
        self.field.reset();
        self.selection = Selection::default();
        self.paused = true;
        self.install_founder();
        debug!("colony reset");
    }

    fn install_founder(&mut self) {
        let id = self.population.allocate_id();
        let founder = Cell::founder(id, self.config.founder_division_delay, &mut self.rng);
        self.population.insert(founder, &self.config);
    }

    /// Current colony growth rate as a percentage.
    ///
    /// The rate ramps with elapsed growth-clock time up to a cap, and
    /// scales with the fixed environment factors and the speed
    /// multiplier.
    pub fn growth_rate_percent(&self) -> f32 {
        let time_multiplier =
            (self.ticks as f32 / self.config.growth_time_scale).min(self.config.growth_time_cap);
        self.config.base_growth_rate
            * (1.0 + time_multiplier)
            * self.config.oxygen_effect
            * self.config.temperature_effect
            * self.speed_multiplier
            * 100.0
    }

    /// Builds the per-tick view for the renderer.
    pub fn snapshot(&self) -> Snapshot {
        let cells: Vec<CellView> = self
            .population
            .iter()
            .map(|cell| CellView {
                id: cell.id,
                position: cell.position,
                orientation: cell.orientation,
                scale: cell.scale,
                state: cell.state,
                mutation_level: cell.mutation_level,
                signal_concentration: cell.signal_concentration,
                has_resistance_trait: cell.has_resistance_trait,
                brightness: cell.brightness,
            })
            .collect();

        let live = self.population.live_count();
        let mean_scale = if live > 0 {
            let sum: f32 = self
                .population
                .iter()
                .filter(|cell| cell.is_live())
                .map(|cell| cell.scale)
                .sum();
            sum / live as f32
        } else {
            0.0
        };

        Snapshot {
            cells,
            stats: Stats {
                total_created: self.population.total_created(),
                live_cells: live,
                mean_scale,
                growth_rate_percent: self.growth_rate_percent(),
                elapsed_minutes: self.ticks / 10,
                elapsed_seconds: (self.ticks % 10) * 6,
            },
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Ticks elapsed on the growth clock this epoch.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn emitting(&self) -> bool {
        self.field.emitting()
    }

    pub fn field_time(&self) -> f32 {
        self.field.time()
    }

    /// Verifies the core's structural invariants.
    ///
    /// An error here is a logic bug in the core, not a runtime
    /// condition the caller can recover from.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.population.check_invariants(&self.config)
    }
}
