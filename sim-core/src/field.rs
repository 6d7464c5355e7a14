//! Diffusing-signal concentration field.
//!
//! The field is a stylized radial/temporal approximation, not a PDE
//! solver: a diffusion front expands from the origin at a fixed rate, the
//! concentration inside the front decays exponentially with distance and
//! ramps up over time, and a soft edge fades the front boundary.

use glam::Vec3;

/// Planar radius around the origin inside which the source saturates.
const SOURCE_RADIUS: f32 = 0.1;
/// Expansion rate of the diffusion front.
const DIFFUSION_RATE: f32 = 0.8;
/// Width of the soft fade at the front boundary.
const EDGE_SOFTNESS: f32 = 2.0;
/// Exponential decay constant of the radial gradient.
const RADIAL_FALLOFF: f32 = 0.15;
/// Field time over which the overall intensity ramps to full.
const RAMP_TIME: f32 = 15.0;

/// Clock for the signal field, decoupled from the growth clock.
///
/// The clock starts at zero when emission begins and advances only while
/// emission is active; it never decreases within an epoch. Pausing the
/// simulation does not stop it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldClock {
    time: f32,
    emitting: bool,
}

impl FieldClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts signal emission from time zero.
    ///
    /// Idempotent: a second call leaves the running clock untouched.
    ///
    /// ### Returns
    /// `true` if emission was actually started by this call.
    pub fn begin_emission(&mut self) -> bool {
        if self.emitting {
            return false;
        }
        self.emitting = true;
        self.time = 0.0;
        true
    }

    /// Advances the clock by `step`, but only while emission is active.
    pub fn advance(&mut self, step: f32) {
        if self.emitting {
            self.time += step;
        }
    }

    /// Stops emission and rewinds the clock to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn emitting(&self) -> bool {
        self.emitting
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}

/// Signal concentration at `position` for the given field time.
///
/// The distance used is planar (the emission plane through the origin);
/// the vertical component of `position` does not attenuate the signal.
///
/// ### Parameters
/// - `position` - World-space point to sample.
/// - `field_time` - Current [`FieldClock`] time.
/// - `emitting` - Whether emission is active; `false` yields 0.
///
/// ### Returns
/// A value in `[0, 1]`: 1 inside the saturated source region, 0 outside
/// the diffusion front, and the faded radial/temporal product in between.
pub fn concentration(position: Vec3, field_time: f32, emitting: bool) -> f32 {
    if !emitting {
        return 0.0;
    }

    let distance = position.truncate().length();
    if distance < SOURCE_RADIUS {
        // The source cell saturates immediately.
        return 1.0;
    }

    let time = field_time.max(0.1);
    let front_radius = DIFFUSION_RATE * time * 2.0;
    if distance > front_radius {
        return 0.0;
    }

    let edge_fade =
        1.0 - ((distance - (front_radius - EDGE_SOFTNESS)) / EDGE_SOFTNESS).clamp(0.0, 1.0);
    let radial_gradient = (-distance * RADIAL_FALLOFF).exp();
    let time_factor = (time / RAMP_TIME).min(1.0);

    (radial_gradient * time_factor * edge_fade).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_field_reads_zero_everywhere() {
        for &t in &[0.0, 1.0, 100.0] {
            assert_eq!(concentration(Vec3::new(3.0, -2.0, 1.0), t, false), 0.0);
            assert_eq!(concentration(Vec3::ZERO, t, false), 0.0);
        }
    }

    #[test]
    fn source_is_saturated_at_all_times() {
        for &t in &[0.0, 0.05, 1.0, 500.0] {
            assert_eq!(concentration(Vec3::ZERO, t, true), 1.0);
        }
    }

    #[test]
    fn planar_distance_ignores_vertical_offset() {
        // Directly above the origin the planar distance is still zero.
        assert_eq!(concentration(Vec3::new(0.0, 0.0, 7.0), 1.0, true), 1.0);
    }

    #[test]
    fn outside_diffusion_front_reads_zero() {
        // At t = 1 the front sits at radius 1.6.
        assert_eq!(concentration(Vec3::new(5.0, 0.0, 0.0), 1.0, true), 0.0);
    }

    #[test]
    fn interior_values_stay_in_unit_range_and_grow_with_time() {
        let point = Vec3::new(4.0, 0.0, 0.0);
        let early = concentration(point, 10.0, true);
        let late = concentration(point, 100.0, true);
        assert!(early > 0.0 && early <= 1.0);
        assert!(late > 0.0 && late <= 1.0);
        // The front has long passed this point at both samples, so only
        // the time ramp (saturating at 15) separates them.
        assert!(late >= early);
    }

    #[test]
    fn edge_fade_softens_the_front() {
        let t = 10.0;
        let front = DIFFUSION_RATE * t * 2.0;
        let just_inside = concentration(Vec3::new(front - 0.1, 0.0, 0.0), t, true);
        let deeper = concentration(Vec3::new(front - EDGE_SOFTNESS, 0.0, 0.0), t, true);
        assert!(just_inside < deeper);
    }

    #[test]
    fn clock_only_runs_while_emitting() {
        let mut clock = FieldClock::new();
        clock.advance(0.1);
        assert_eq!(clock.time(), 0.0);

        assert!(clock.begin_emission());
        clock.advance(0.1);
        clock.advance(0.1);
        assert!((clock.time() - 0.2).abs() < 1e-6);

        // A second begin is a no-op and keeps the running time.
        assert!(!clock.begin_emission());
        assert!((clock.time() - 0.2).abs() < 1e-6);

        clock.reset();
        assert!(!clock.emitting());
        assert_eq!(clock.time(), 0.0);
    }
}
