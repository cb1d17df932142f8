// Copyright @yucwang 2026

use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn photon_rng(seed: u64, photon_id: usize) -> StdRng {
    let mixed = seed ^ (photon_id as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(mixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_streams_are_reproducible_and_distinct() {
        let a = photon_rng(42, 0).next_u64();
        assert_eq!(a, photon_rng(42, 0).next_u64());
        assert_ne!(a, photon_rng(42, 1).next_u64());
        assert_ne!(a, photon_rng(43, 0).next_u64());
    }
}
