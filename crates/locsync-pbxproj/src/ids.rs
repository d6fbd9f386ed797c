//! Node-ID generation.

use rand::Rng;

use crate::graph::{NodeId, ObjectTable};

const ID_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generated IDs are 24 characters, matching the width of toolchain-issued
/// identifiers.
pub const ID_LENGTH: usize = 24;

/// Draws a fixed-length identifier, one uniform charset pick per character.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> NodeId {
    (0..ID_LENGTH)
        .map(|_| ID_CHARSET[rng.random_range(0..ID_CHARSET.len())] as char)
        .collect()
}

/// Generates an ID unused in the object table, regenerating on collision.
pub fn unique_id<R: Rng + ?Sized>(rng: &mut R, objects: &ObjectTable) -> NodeId {
    loop {
        let id = generate_id(rng);
        if !objects.contains(&id) {
            return id;
        }
    }
}
