use crate::{
    BalanceWindow, BisectionPartitioningConfig, CellId, Hypergraph, InitialPartitioningMethod,
};

pub struct QuadrisectionConfig {
    /// What initial partitioning method every bisection uses.
    pub initial_partitioning: InitialPartitioningMethod,
    /// Window of the first split.
    pub root_window: BalanceWindow,
    /// Share of the root total each final group should get.
    pub leaf_window: BalanceWindow,
    /// Upper bound on refinement passes of every bisection.
    pub max_passes: Option<u32>,
}

impl Default for QuadrisectionConfig {
    fn default() -> Self {
        Self {
            initial_partitioning: InitialPartitioningMethod::Connectivity,
            root_window: BalanceWindow::QUADRISECTION_ROOT,
            leaf_window: BalanceWindow::QUADRISECTION_LEAF,
            max_passes: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct QuadrisectionReport {
    /// Cutsize of the first split.
    pub root_cutsize: usize,
    /// Nets touching at least two of the four final groups.
    pub cutsize: usize,
    pub group_sizes: [u64; 4],
}

/// Sub-hypergraph induced by the cells of one side, with dense ids of its own.
pub struct InducedHypergraph {
    pub graph: Hypergraph,
    /// Parent id of every sub-hypergraph cell.
    pub to_parent: Vec<CellId>,
}

impl Hypergraph {
    /// Copies `keep` and the nets among them into a new hypergraph. Nets left without cells
    /// are dropped; cell and net ids are renumbered from 0.
    pub fn induced(&self, keep: &[CellId]) -> InducedHypergraph {
        let mut to_sub = vec![CellId::MAX; self.cells.len()];
        let mut graph = Hypergraph::new();
        for &cx in keep.iter() {
            let cell = &self.cells[cx as usize];
            to_sub[cx as usize] = graph.add_cell(cell.name.clone(), cell.size);
        }

        for net in self.nets.iter() {
            let pins: Vec<CellId> = net
                .cells
                .iter()
                .map(|&c| to_sub[c as usize])
                .filter(|&c| c != CellId::MAX)
                .collect();
            if !pins.is_empty() {
                graph.add_net(net.name.clone(), pins);
            }
        }

        InducedHypergraph {
            graph,
            to_parent: keep.to_vec(),
        }
    }

    /// Splits the hypergraph into four groups by recursive bisection: one split of the
    /// whole instance, then an independent split of each side. Side 0 becomes groups
    /// 0 and 2, side 1 becomes groups 1 and 3.
    pub fn partition_quadrisection(&mut self, config: &QuadrisectionConfig) -> QuadrisectionReport {
        let root = self.partition_bisection(&BisectionPartitioningConfig {
            initial_partitioning: config.initial_partitioning,
            window: config.root_window,
            max_passes: config.max_passes,
        });
        log::debug!("root split: cutsize {}", root.final_cutsize);

        let sides = [self.cells_in_group(0), self.cells_in_group(1)];
        for (side, cells) in sides.iter().enumerate() {
            if cells.is_empty() {
                continue;
            }
            let InducedHypergraph {
                mut graph,
                to_parent,
            } = self.induced(cells);

            let fraction = graph.total_size as f64 / self.total_size as f64;
            let window = config.leaf_window.rescaled(fraction);
            let report = graph.partition_bisection(&BisectionPartitioningConfig {
                initial_partitioning: config.initial_partitioning,
                window,
                max_passes: config.max_passes,
            });
            log::debug!(
                "side {side}: {} cells, window [{:.3}, {:.3}], cutsize {}",
                graph.cells.len(),
                window.lower,
                window.upper,
                report.final_cutsize
            );

            for cell in graph.cells.iter() {
                self.cells[to_parent[cell.id as usize] as usize].group = side as u8 + 2 * cell.group;
            }
        }

        self.cutsize = self.recompute_cutsize();
        let report = QuadrisectionReport {
            root_cutsize: root.final_cutsize,
            cutsize: self.cutsize,
            group_sizes: self.group_sizes(),
        };
        log::info!(
            "4-way cutsize {}, group sizes {:?}",
            report.cutsize,
            report.group_sizes
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Hypergraph {
        // 4x4 grid of unit cells with row and column nets.
        let mut hg = Hypergraph::new();
        for i in 0..16 {
            hg.add_cell(format!("c{i}"), 1);
        }
        for r in 0..4 {
            hg.add_net(format!("r{r}"), (0..4).map(|c| r * 4 + c).collect());
        }
        for c in 0..4 {
            hg.add_net(format!("k{c}"), (0..4).map(|r| r * 4 + c).collect());
        }
        hg
    }

    #[test]
    fn induced_hypergraph_renumbers_and_drops_empty_nets() {
        let hg = grid();
        let keep = vec![5, 6, 9];
        let sub = hg.induced(&keep);

        assert_eq!(sub.to_parent, keep);
        assert_eq!(sub.graph.cells.len(), 3);
        assert_eq!(sub.graph.cells[0].name, "c5");
        assert_eq!(sub.graph.total_size, 3);
        // Row 1 holds c5 and c6, row 2 c9, columns 1 and 2 c5, c9 and c6.
        let nets: Vec<(&str, Vec<CellId>)> = sub
            .graph
            .nets
            .iter()
            .map(|n| (n.name.as_str(), n.cells.clone()))
            .collect();
        assert_eq!(
            nets,
            vec![
                ("r1", vec![0, 1]),
                ("r2", vec![2]),
                ("k1", vec![0, 2]),
                ("k2", vec![1]),
            ]
        );
        assert_eq!(sub.graph.max_degree, 2);
        assert_eq!(sub.graph.cells[2].nets, vec![1, 2]);
    }

    #[test]
    fn grid_splits_into_four_groups() {
        let mut hg = grid();
        let report = hg.partition_quadrisection(&Default::default());

        assert_eq!(report.group_sizes.iter().sum::<u64>(), 16);
        assert!(report.group_sizes.iter().all(|&s| s > 0));
        assert!(hg.cells.iter().all(|c| c.group < 4));
        assert_eq!(report.cutsize, hg.recompute_cutsize());
        assert!(report.cutsize >= report.root_cutsize);
    }

    #[test]
    fn empty_hypergraph_is_left_alone() {
        let mut hg = Hypergraph::new();
        let report = hg.partition_quadrisection(&Default::default());
        assert_eq!(report.cutsize, 0);
        assert_eq!(report.group_sizes, [0; 4]);
    }
}
