mod network;

use std::path::PathBuf;

use rand::{rngs::StdRng, SeedableRng};

use crate::Network;

pub(crate) fn seeded_network(sizes: &[usize], seed: u64) -> Network {
    Network::from_topology(sizes, &mut StdRng::seed_from_u64(seed)).unwrap()
}

pub(crate) fn scratch_directory(name: &str) -> PathBuf {
    let directory =
        std::env::temp_dir().join(format!("digitnet-tests-{}-{}", std::process::id(), name));
    std::fs::create_dir_all(&directory).unwrap();
    directory
}
