/// Identifier for a cell in a [`crate::population::Population`].
///
/// Ids are handed out by the population's monotonically increasing
/// counter and are unique for the lifetime of a colony epoch; they
/// restart from 1 when the colony is reset.
pub type CellId = u64;
