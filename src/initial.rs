use crate::{BalanceWindow, CellId, Hypergraph};
use std::collections::VecDeque;

/// Nets with more pins than this only push a sample of their cells onto a frontier.
const LARGE_NET_DEGREE: usize = 64;
/// How many of the smallest unassigned cells a large net contributes.
const LARGE_NET_SAMPLE: usize = 8;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum InitialPartitioningMethod {
    /// Breadth first clusters grown from cells in declaration order, each poured into the
    /// emptier side until it hits the upper cap.
    SizeGreedy,
    /// Two frontiers grown from the most cohesive cells, each cell joining the side its
    /// nets already lean towards.
    Connectivity,
}

impl Default for InitialPartitioningMethod {
    fn default() -> Self {
        Self::Connectivity
    }
}

/// Working state shared by both seeding methods.
struct Seeding {
    lower: u64,
    upper: u64,
    assigned: Vec<bool>,
    sums: [u64; 2],
}

impl Seeding {
    fn new(hg: &Hypergraph, window: &BalanceWindow) -> Self {
        let (lower, upper) = window.caps(hg.total_size);
        Self {
            lower,
            upper,
            assigned: vec![false; hg.cells.len()],
            sums: [0, 0],
        }
    }

    /// Side a new cluster should start on: the smaller one, unless it is already full.
    fn cluster_side(&self) -> usize {
        let [a, b] = self.sums;
        if (a < b && a < self.upper) || b >= self.upper {
            0
        } else {
            1
        }
    }

    fn fits(&self, side: usize, size: u64) -> bool {
        self.sums[side] + size <= self.upper
    }

    fn both_above_lower(&self) -> bool {
        self.sums[0] >= self.lower && self.sums[1] >= self.lower
    }
}

impl Hypergraph {
    /// Assigns every cell to side 0 or 1 and returns the resulting `(A_size, B_size)`.
    ///
    /// Gains, net counters and the cutsize are left for the caller to recompute.
    pub fn partition_initial(
        &mut self,
        method: InitialPartitioningMethod,
        window: &BalanceWindow,
    ) -> (u64, u64) {
        if self.total_size == 0 {
            for c in self.cells.iter_mut() {
                c.group = 0;
            }
            return (0, 0);
        }

        let sums = match method {
            InitialPartitioningMethod::SizeGreedy => self.seed_size_greedy(window),
            InitialPartitioningMethod::Connectivity => self.seed_connectivity(window),
        };
        log::trace!(
            "{method:?} seed: A = {}, B = {} of {}",
            sums[0],
            sums[1],
            self.total_size
        );
        (sums[0], sums[1])
    }

    fn seed_size_greedy(&mut self, window: &BalanceWindow) -> [u64; 2] {
        let mut s = Seeding::new(self, window);
        let n = self.cells.len();

        // Cells already queued by the current cluster, stamped with the cluster's seed.
        let mut queued = vec![u32::MAX; n];
        let mut queue = VecDeque::new();

        for seed in 0..n {
            if s.assigned[seed] {
                continue;
            }
            let side = s.cluster_side();

            queue.clear();
            queue.push_back(seed as CellId);
            queued[seed] = seed as u32;

            while let Some(u) = queue.pop_front() {
                let u = u as usize;
                if s.assigned[u] {
                    continue;
                }
                // Cells that do not fit wait for a later cluster or the sweep below.
                if !s.fits(side, self.cells[u].size as u64) {
                    continue;
                }
                self.cells[u].group = side as u8;
                s.assigned[u] = true;
                s.sums[side] += self.cells[u].size as u64;

                for &net in self.cells[u].nets.iter() {
                    for &v in self.nets[net as usize].cells.iter() {
                        if !s.assigned[v as usize] && queued[v as usize] != seed as u32 {
                            queued[v as usize] = seed as u32;
                            queue.push_back(v);
                        }
                    }
                }
            }

            if s.both_above_lower() {
                break;
            }
        }

        for u in 0..n {
            if s.assigned[u] {
                continue;
            }
            let size = self.cells[u].size as u64;
            let side = if s.sums[0] <= s.sums[1] && s.fits(0, size) {
                0
            } else if s.fits(1, size) {
                1
            } else if s.fits(0, size) || s.sums[0] <= s.sums[1] {
                // With neither side able to take it, the smaller one does.
                0
            } else {
                1
            };
            self.cells[u].group = side as u8;
            s.assigned[u] = true;
            s.sums[side] += size;
        }

        let order = self.size_greedy_correction_order();
        self.correct_balance(&mut s, &order, false);
        s.sums
    }

    fn seed_connectivity(&mut self, window: &BalanceWindow) -> [u64; 2] {
        let mut s = Seeding::new(self, window);
        let n = self.cells.len();
        for net in self.nets.iter_mut() {
            net.count = [0, 0];
        }

        let mut order: Vec<CellId> = (0..n as CellId).collect();
        let cohesion: Vec<f64> = (0..n).map(|c| self.cohesion(c)).collect();
        order.sort_by(|&a, &b| cohesion[b as usize].total_cmp(&cohesion[a as usize]));

        let mut frontiers = [VecDeque::new(), VecDeque::new()];

        for &seed in order.iter() {
            let seed = seed as usize;
            if s.assigned[seed] {
                continue;
            }

            let side = s.cluster_side();
            let size = self.cells[seed].size as u64;
            if s.fits(side, size) {
                self.place(&mut s, seed, side);
                self.push_frontier(&s, seed, &mut frontiers);
            } else if s.fits(1 - side, size) {
                self.place(&mut s, seed, 1 - side);
                self.push_frontier(&s, seed, &mut frontiers);
            }

            while !frontiers[0].is_empty() || !frontiers[1].is_empty() {
                if s.both_above_lower() {
                    break;
                }
                for side in 0..2 {
                    let Some(u) = frontiers[side].pop_front() else {
                        continue;
                    };
                    let u = u as usize;
                    if s.assigned[u] {
                        continue;
                    }
                    let size = self.cells[u].size as u64;
                    let (a, b) = (self.affinity(u, 0), self.affinity(u, 1));
                    let prefers = if side == 0 { a >= b } else { b > a };
                    let target = if prefers && s.fits(side, size) {
                        Some(side)
                    } else if s.fits(1 - side, size) {
                        Some(1 - side)
                    } else {
                        None
                    };
                    if let Some(target) = target {
                        self.place(&mut s, u, target);
                        self.push_frontier(&s, u, &mut frontiers);
                    }
                }
            }

            if s.both_above_lower() {
                break;
            }
        }

        for u in 0..n {
            if s.assigned[u] {
                continue;
            }
            let size = self.cells[u].size as u64;
            let preferred = if self.affinity(u, 0) > self.affinity(u, 1) {
                0
            } else {
                1
            };
            let side = if s.fits(preferred, size) {
                preferred
            } else if s.fits(1 - preferred, size) {
                1 - preferred
            } else if s.sums[0] <= s.sums[1] {
                // Neither side has room; refinement has to sort this out.
                0
            } else {
                1
            };
            self.place(&mut s, u, side);
        }

        let order = self.connectivity_correction_order();
        self.correct_balance(&mut s, &order, true);
        s.sums
    }

    /// Smallest cells first, ties by id.
    fn size_greedy_correction_order(&self) -> Vec<CellId> {
        let mut order: Vec<CellId> = (0..self.cells.len() as CellId).collect();
        order.sort_by_key(|&c| self.cells[c as usize].size);
        order
    }

    /// Cells pulled hardest towards the other side first, then the smallest, then by id.
    /// Reads the net counters, so they must match the current groups.
    fn connectivity_correction_order(&self) -> Vec<CellId> {
        let n = self.cells.len();
        let mut order: Vec<CellId> = (0..n as CellId).collect();
        let keys: Vec<(i32, u32)> = (0..n)
            .map(|u| (self.external_minus_internal(u), self.cells[u].size))
            .collect();
        order.sort_by(|&a, &b| {
            let (ka, kb) = (keys[a as usize], keys[b as usize]);
            kb.0.cmp(&ka.0).then(ka.1.cmp(&kb.1))
        });
        order
    }

    /// Moves cells, in `order`, out of the side that ended below its lower cap until it
    /// reaches it, never pushing the receiving side past its upper cap or the giving side
    /// below its own lower cap.
    fn correct_balance(&mut self, s: &mut Seeding, order: &[CellId], track_nets: bool) {
        let short = if s.sums[0] < s.lower {
            0
        } else if s.sums[1] < s.lower {
            1
        } else {
            return;
        };
        let long = 1 - short;

        let mut moved = 0;
        for &c in order.iter() {
            let cell = &self.cells[c as usize];
            if cell.group as usize != long {
                continue;
            }
            let size = cell.size as u64;
            if s.sums[short] + size > s.upper || s.sums[long] < s.lower + size {
                continue;
            }
            self.cells[c as usize].group = short as u8;
            s.sums[short] += size;
            s.sums[long] -= size;
            moved += 1;
            if track_nets {
                for &n in self.cells[c as usize].nets.iter() {
                    let net = &mut self.nets[n as usize];
                    net.count[long] -= 1;
                    net.count[short] += 1;
                }
            }
            if s.sums[short] >= s.lower {
                break;
            }
        }
        log::trace!("balance correction moved {moved} cells to side {short}");
    }

    fn place(&mut self, s: &mut Seeding, u: usize, side: usize) {
        let cell = &mut self.cells[u];
        cell.group = side as u8;
        s.assigned[u] = true;
        s.sums[side] += cell.size as u64;
        for &n in cell.nets.iter() {
            self.nets[n as usize].count[side] += 1;
        }
    }

    /// Queues the unassigned neighbours of `u` on the frontier of the side they lean to.
    fn push_frontier(&self, s: &Seeding, u: usize, frontiers: &mut [VecDeque<CellId>; 2]) {
        for &n in self.cells[u].nets.iter() {
            let pins = &self.nets[n as usize].cells;
            let mut candidates: Vec<CellId> = pins
                .iter()
                .copied()
                .filter(|&v| !s.assigned[v as usize])
                .collect();
            if pins.len() > LARGE_NET_DEGREE && candidates.len() > LARGE_NET_SAMPLE {
                candidates.sort_by_key(|&v| self.cells[v as usize].size);
                candidates.truncate(LARGE_NET_SAMPLE);
            }
            for v in candidates {
                let side = if self.affinity(v as usize, 0) >= self.affinity(v as usize, 1) {
                    0
                } else {
                    1
                };
                frontiers[side].push_back(v);
            }
        }
    }

    /// Sum over the nets of `u` of the fraction of their cells already placed on `side`.
    fn affinity(&self, u: usize, side: usize) -> f64 {
        self.cells[u]
            .nets
            .iter()
            .map(|&n| {
                let net = &self.nets[n as usize];
                net.count[side] as f64 / net.degree() as f64
            })
            .sum()
    }

    /// Favours cells sitting on small nets, normalised by the cell's own size.
    fn cohesion(&self, u: usize) -> f64 {
        let shared: f64 = self.cells[u]
            .nets
            .iter()
            .map(|&n| self.nets[n as usize].degree())
            .filter(|&d| d > 1)
            .map(|d| 1.0 / (d - 1) as f64)
            .sum();
        shared / self.cells[u].size.max(1) as f64
    }

    /// Nets of `u` reaching the other side minus nets reaching its own side.
    fn external_minus_internal(&self, u: usize) -> i32 {
        let side = self.cells[u].group as usize & 1;
        self.cells[u]
            .nets
            .iter()
            .map(|&n| {
                let count = self.nets[n as usize].count;
                (count[1 - side] > 0) as i32 - (count[side] > 0) as i32
            })
            .sum()
    }
}
