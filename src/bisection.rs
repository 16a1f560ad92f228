use crate::{BalanceWindow, FmConfig, FmEngine, Hypergraph, InitialPartitioningMethod};

pub struct BisectionPartitioningConfig {
    /// What initial partitioning method to use.
    pub initial_partitioning: InitialPartitioningMethod,
    /// Balance window for both the seed and every refinement move.
    pub window: BalanceWindow,
    /// Upper bound on refinement passes, see [`FmConfig::max_passes`].
    pub max_passes: Option<u32>,
}

impl Default for BisectionPartitioningConfig {
    fn default() -> Self {
        Self {
            initial_partitioning: InitialPartitioningMethod::Connectivity,
            window: BalanceWindow::BISECTION,
            max_passes: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BisectionReport {
    /// `(A_size, B_size)` right after seeding.
    pub initial_sizes: (u64, u64),
    pub initial_cutsize: usize,
    pub final_cutsize: usize,
    pub passes: u32,
    pub moves: usize,
}

impl Hypergraph {
    /// Splits the hypergraph into two sides while minimizing the number of cut nets.
    pub fn partition_bisection(&mut self, config: &BisectionPartitioningConfig) -> BisectionReport {
        self.unlock_all();
        if self.cells.len() <= 1 || self.total_size == 0 {
            for c in self.cells.iter_mut() {
                c.group = 0;
            }
            self.refresh();
            log::debug!("trivial bisection of {} cells", self.cells.len());
            return BisectionReport {
                initial_sizes: (self.a_size(), self.b_size()),
                ..Default::default()
            };
        }

        let initial_sizes = self.partition_initial(config.initial_partitioning, &config.window);
        self.refresh();
        log::trace!("initial cutsize: {}", self.cutsize);

        let engine = FmEngine::new(FmConfig {
            window: config.window,
            max_passes: config.max_passes,
        });
        let fm = engine.run(self);
        log::debug!(
            "bisection: cutsize {} -> {} in {} passes, A = {}, B = {}",
            fm.initial_cutsize,
            fm.final_cutsize,
            fm.passes,
            self.a_size(),
            self.b_size()
        );

        BisectionReport {
            initial_sizes,
            initial_cutsize: fm.initial_cutsize,
            final_cutsize: fm.final_cutsize,
            passes: fm.passes,
            moves: fm.moves,
        }
    }
}
