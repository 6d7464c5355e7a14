//! Division-direction allocation.
//!
//! A dividing cell needs a spatial direction for each offspring:
//!
//! - The founder works through a fixed ordered table of branch slots
//!   (the eight unit-cube diagonals, then the two directions along its
//!   long axis), each slot perturbed by a small random rotation so the
//!   branching never looks perfectly regular.
//! - Every other cell perturbs its parent's long axis by a small polar
//!   angle biased toward the axis, with a uniform azimuth.
//!
//! Each allocation also carries the separation factor (how far the
//! offspring drifts from its parent) and the division delay the
//! offspring is created with.

use glam::{Quat, Vec3};
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Number of fixed branch slots available to the founder.
pub const FOUNDER_SLOTS: usize = 10;

/// Ordered candidate directions for the founder's successive divisions:
/// the eight unit-cube diagonals, then the two axis directions along the
/// founder's long axis. Normalized at use.
const SLOT_DIRECTIONS: [Vec3; FOUNDER_SLOTS] = [
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(1.0, 1.0, -1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(-1.0, -1.0, -1.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(-1.0, 0.0, 0.0),
];

/// Division delays for offspring occupying each founder slot, increasing
/// across the table so the branches unfold in slot order.
const SLOT_DELAYS: [f32; FOUNDER_SLOTS] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.85, 0.9];

/// Separation factor for the diagonal slots.
const DIAGONAL_SEPARATION: f32 = 0.8;
/// Separation factor for the axis-aligned slots.
const AXIS_SEPARATION: f32 = 1.0;
/// Separation factor once the slot table is exhausted.
const FALLBACK_SEPARATION: f32 = 0.9;
/// Number of diagonal slots at the front of the table.
const DIAGONAL_SLOTS: usize = 8;

/// Maximum polar deviation of an offspring direction from the parent axis.
const MAX_OFFSPRING_ANGLE: f32 = 15.0 * PI / 180.0;
/// Uniform range a new offspring draws its division delay from.
const OFFSPRING_DELAY_RANGE: f32 = 0.3;
/// Jitter added on top of a slot's table delay.
const SLOT_DELAY_JITTER: f32 = 0.1;

/// A fully specified division branch for one offspring cell.
#[derive(Debug, Clone, Copy)]
pub struct Branch {
    /// Unit direction the offspring drifts along.
    pub direction: Vec3,
    /// Multiplier on the parent-to-offspring separation distance.
    pub separation_factor: f32,
    /// Division delay the offspring is created with.
    pub division_delay: f32,
}

impl Branch {
    /// Orientation aligning a cell's long axis (local `+X`) with the
    /// branch direction.
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_arc(Vec3::X, self.direction)
    }
}

/// Allocates the branch for one founder division.
///
/// `division_index` counts the founder's completed divisions (0-based).
/// Slots inside the table get the tabled direction rotated by 5°-15°
/// about a random perpendicular axis; past the table a uniformly random
/// direction is used instead.
pub fn founder_branch(division_index: usize, rng: &mut impl Rng) -> Branch {
    if division_index < FOUNDER_SLOTS {
        let base = SLOT_DIRECTIONS[division_index].normalize();
        let separation_factor = if division_index < DIAGONAL_SLOTS {
            DIAGONAL_SEPARATION
        } else {
            AXIS_SEPARATION
        };
        Branch {
            direction: jittered_slot_direction(base, rng),
            separation_factor,
            division_delay: slot_delay(division_index, rng),
        }
    } else {
        Branch {
            direction: random_unit_vector(rng),
            separation_factor: FALLBACK_SEPARATION,
            division_delay: slot_delay(division_index, rng),
        }
    }
}

/// Allocates one or two branches for a founder division.
///
/// The sibling of a dual division leaves along the antipode of the first
/// direction, perturbed the same way a non-founder offspring is, and
/// shares the slot's separation factor.
pub fn founder_branches(
    division_index: usize,
    dual: bool,
    rng: &mut impl Rng,
) -> (Branch, Option<Branch>) {
    let first = founder_branch(division_index, rng);
    let sibling = if dual {
        let azimuth = rng.random_range(0.0..TAU);
        Some(Branch {
            direction: perturbed_direction(-first.direction, azimuth, rng),
            separation_factor: first.separation_factor,
            division_delay: slot_delay(division_index, rng),
        })
    } else {
        None
    };
    (first, sibling)
}

/// Allocates one or two branches for a non-founder division.
///
/// The first direction perturbs the parent's long axis by a polar angle
/// sampled as `acos(u^(1/3)) * MAX_OFFSPRING_ANGLE` (the cube root biases
/// the draw toward the axis) at a uniform azimuth. A sibling reuses the
/// construction with the azimuth offset by half a turn plus a jitter of
/// at most `0.1 * PI`, keeping the pair roughly antipodal around the
/// axis.
pub fn offspring_branches(
    parent_axis: Vec3,
    dual: bool,
    rng: &mut impl Rng,
) -> (Branch, Option<Branch>) {
    let azimuth = rng.random_range(0.0..TAU);
    let first = Branch {
        direction: perturbed_direction(parent_axis, azimuth, rng),
        separation_factor: 1.0,
        division_delay: rng.random_range(0.0..OFFSPRING_DELAY_RANGE),
    };
    let sibling = if dual {
        let opposite = azimuth + PI + rng.random_range(-0.1..0.1) * PI;
        Some(Branch {
            direction: perturbed_direction(parent_axis, opposite, rng),
            separation_factor: 1.0,
            division_delay: rng.random_range(0.0..OFFSPRING_DELAY_RANGE),
        })
    } else {
        None
    };
    (first, sibling)
}

fn slot_delay(division_index: usize, rng: &mut impl Rng) -> f32 {
    let base = if division_index < FOUNDER_SLOTS {
        SLOT_DELAYS[division_index]
    } else {
        0.1 + 0.1 * division_index as f32
    };
    base + rng.random_range(0.0..SLOT_DELAY_JITTER)
}

/// Rotates a slot direction by 5°-15° about a random perpendicular axis.
fn jittered_slot_direction(base: Vec3, rng: &mut impl Rng) -> Vec3 {
    let angle = rng.random_range(5.0_f32.to_radians()..15.0_f32.to_radians());
    let axis = base.cross(random_unit_vector(rng)).normalize_or_zero();
    if axis == Vec3::ZERO {
        // The random vector was parallel to the slot; keep the slot as is.
        return base;
    }
    (Quat::from_axis_angle(axis, angle) * base).normalize()
}

/// Perturbs `axis` by a biased polar angle at the given azimuth.
fn perturbed_direction(axis: Vec3, azimuth: f32, rng: &mut impl Rng) -> Vec3 {
    let polar = rng.random_range(0.0_f32..1.0).cbrt().acos() * MAX_OFFSPRING_ANGLE;

    let mut up = Vec3::Y;
    if axis.dot(up).abs() > 0.99 {
        up = Vec3::Z;
    }
    let perp_a = axis.cross(up).normalize();
    let perp_b = axis.cross(perp_a).normalize();

    (axis + perp_a * (polar.sin() * azimuth.cos()) + perp_b * (polar.sin() * azimuth.sin()))
        .normalize()
}

fn random_unit_vector(rng: &mut impl Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.random_range(-0.5..0.5),
            rng.random_range(-0.5..0.5),
            rng.random_range(-0.5..0.5),
        )
        .normalize_or_zero();
        if v != Vec3::ZERO {
            return v;
        }
    }
}
