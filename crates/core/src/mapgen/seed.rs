//! Deterministic seed mixing and dice helpers over an injected random source.

use rand_chacha::rand_core::Rng;

/// Folds the grid size into the run seed so that different sizes generated
/// from one run seed do not share a random stream prefix.
pub fn derive_map_seed(run_seed: u64, grid_side: usize) -> u64 {
    let mut mixed = run_seed ^ 0x9E37_79B9_7F4A_7C15;
    mixed ^= (grid_side as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= mixed >> 30;
    mixed = mixed.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= mixed >> 27;
    mixed = mixed.wrapping_mul(0x94D0_49BB_1331_11EB);
    mixed ^ (mixed >> 31)
}

/// Uniform value in `0..sides`.
pub(crate) fn roll<R: Rng + ?Sized>(rng: &mut R, sides: usize) -> usize {
    debug_assert!(sides > 0);
    (rng.next_u64() % sides as u64) as usize
}

pub(crate) fn coin<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.next_u64() & 1 == 1
}

/// True with `chance` percent probability.
pub(crate) fn percent<R: Rng + ?Sized>(rng: &mut R, chance: usize) -> bool {
    roll(rng, 100) < chance
}

pub(crate) fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, options: &[T]) -> T {
    options[roll(rng, options.len())]
}
