use crate::{CellId, Hypergraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

pub struct RandomHypergraphConfig {
    /// The seed for the random number generator.
    pub rng_seed: u64,
    /// Number of cells to declare.
    pub cells: u32,
    /// Number of nets to declare.
    pub nets: u32,
    /// Nets get between 2 and this many distinct cells.
    pub max_net_degree: u32,
    /// Cell sizes are drawn uniformly from `1..=max_cell_size`.
    pub max_cell_size: u32,
}

impl Default for RandomHypergraphConfig {
    fn default() -> Self {
        Self {
            rng_seed: 1234,
            cells: 100,
            nets: 100,
            max_net_degree: 4,
            max_cell_size: 1,
        }
    }
}

impl Hypergraph {
    /// Generates a synthetic hypergraph. The same config always yields the same instance.
    pub fn random(config: &RandomHypergraphConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.rng_seed);
        let mut hg = Hypergraph::new();

        for i in 0..config.cells {
            let size = rng.gen_range(1..=config.max_cell_size.max(1));
            hg.add_cell(format!("c{i}"), size);
        }
        if config.cells < 2 {
            return hg;
        }

        let max_degree = config.max_net_degree.clamp(2, config.cells);
        for i in 0..config.nets {
            let degree = rng.gen_range(2..=max_degree);
            let mut pins = BTreeSet::new();
            while pins.len() < degree as usize {
                pins.insert(rng.gen_range(0..config.cells) as CellId);
            }
            hg.add_net(format!("n{i}"), pins.into_iter().collect());
        }
        hg
    }
}
