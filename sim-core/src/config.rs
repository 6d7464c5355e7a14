/// Global tuning knobs for the colony simulation.
///
/// All fields are plain data; [`Config::default`] carries the values the
/// simulation was calibrated with.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Upper bound on the number of cells kept in the population.
    pub max_visible_cells: usize,
    /// Saturation point for the total-ever-created counter.
    pub max_total_cells: u64,
    /// Maximum elongation of a cell along its long axis.
    pub max_length_ratio: f32,
    /// Ambient oxygen percentage; fixed for the whole run.
    pub oxygen: f32,
    /// Ambient temperature in degrees Celsius; fixed for the whole run.
    pub temperature: f32,
    /// Base growth rate before time, environment and speed factors.
    pub base_growth_rate: f32,
    /// Fixed growth multiplier for the ambient oxygen level.
    pub oxygen_effect: f32,
    /// Fixed growth multiplier for the ambient temperature.
    pub temperature_effect: f32,
    /// Ticks over which the time multiplier ramps one unit.
    pub growth_time_scale: f32,
    /// Cap on the time multiplier.
    pub growth_time_cap: f32,
    /// Divisor converting the percentage growth rate into a per-tick
    /// growth-stage increment.
    pub growth_divisor: f32,
    /// How many times the founder cell may divide.
    pub founder_division_limit: u32,
    /// How many times any non-founder cell may divide.
    pub offspring_division_limit: u32,
    /// Probability that a division yields two offspring.
    pub dual_offspring_probability: f32,
    /// Dual-offspring probability for cells whose parent split in two.
    pub damped_dual_offspring_probability: f32,
    /// Per-division probability of advancing the mutation level.
    pub mutation_probability: f32,
    /// Highest reachable mutation level.
    pub max_mutation_level: u8,
    /// Division delay assigned to the founder at creation.
    pub founder_division_delay: f32,
    /// Interpolation step per tick for division drift and the parent's
    /// return to growth.
    pub division_step: f32,
    /// Death-progress step per tick while a cell is dying.
    pub death_step: f32,
    /// Base offset of an offspring from its parent, in units of the
    /// parent's scale (further shaped by the branch separation factor).
    pub separation_scale: f32,
    /// Exponential easing factor pulling `scale` toward its target.
    pub shape_easing: f32,
    /// Cells closer to the origin than this are protected from eviction.
    pub important_radius: f32,
    /// Field-clock advance per tick while signal emission is active.
    pub field_step: f32,
    /// Lowest accepted speed multiplier.
    pub min_speed: f32,
    /// Highest accepted speed multiplier.
    pub max_speed: f32,
    /// Optional RNG seed for reproducible runs.
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_visible_cells: 2100,
            max_total_cells: 999_999_999,
            max_length_ratio: 1.8,
            oxygen: 10.0,
            temperature: 30.0,
            base_growth_rate: 0.15,
            oxygen_effect: 0.8,
            temperature_effect: 1.0,
            growth_time_scale: 200.0,
            growth_time_cap: 3.0,
            growth_divisor: 2000.0,
            founder_division_limit: 10,
            offspring_division_limit: 1,
            dual_offspring_probability: 0.6,
            damped_dual_offspring_probability: 0.3,
            mutation_probability: 0.005,
            max_mutation_level: 2,
            founder_division_delay: 0.1,
            division_step: 0.015,
            death_step: 0.02,
            separation_scale: 2.3 * 1.18,
            shape_easing: 0.1,
            important_radius: 5.0,
            field_step: 0.1,
            min_speed: 0.5,
            max_speed: 3.0,
            rng_seed: None,
        }
    }
}
