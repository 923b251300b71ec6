use rand::Rng;

/// 36 symbols, 6 positions: ~2.1 billion combinations.
pub const PNR_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const PNR_LEN: usize = 6;

/// Produces a random reservation code. Uniqueness is enforced by the
/// booking store's constraint and the coordinator's retry loop, not here.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..PNR_LEN)
        .map(|_| PNR_ALPHABET[rng.gen_range(0..PNR_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        for _ in 0..100 {
            let pnr = generate();
            assert_eq!(pnr.len(), PNR_LEN);
            assert!(pnr.bytes().all(|b| PNR_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_generate_varies() {
        let codes: std::collections::HashSet<String> = (0..50).map(|_| generate()).collect();
        // 50 draws from a 2.1B space colliding down to one value would mean
        // a broken RNG, not bad luck.
        assert!(codes.len() > 1);
    }
}
