use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// Lowercase hex SHA-256 digest of a UTF-8 string.
#[must_use]
pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    format!("{digest:x}")
}

/// Seed material of one provably fair round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTriple {
    pub client_seed: String,
    pub server_seed: String,
    /// SHA-256 of `server_seed`, as published before the round
    pub server_seed_hash: String,
    pub nonce: u64,
}

impl SeedTriple {
    #[must_use]
    pub fn new(client_seed: &str, server_seed: &str, nonce: u64) -> Self {
        Self {
            client_seed: client_seed.to_owned(),
            server_seed: server_seed.to_owned(),
            server_seed_hash: sha256_hex(server_seed),
            nonce,
        }
    }

    /// Combined seed string handed to heuristics: `client:server:nonce`.
    #[must_use]
    pub fn seed_string(&self) -> String {
        format!("{}:{}:{}", self.client_seed, self.server_seed, self.nonce)
    }
}
