// Hypergraph bipartitioning with the Fiduccia-Mattheyses move heuristic:
// https://doi.org/10.1109/DAC.1982.1585498

mod bisection;
mod feasibility;
mod fm;
mod gain_bucket;
mod gain_update;
mod generate;
mod initial;
mod io;
mod quadrisection;

pub use bisection::*;
pub use feasibility::*;
pub use fm::*;
pub use gain_bucket::*;
pub use generate::*;
pub use initial::*;
pub use io::*;
pub use quadrisection::*;

pub type CellId = u32;
pub type NetId = u32;

#[derive(Clone, Debug)]
pub struct Cell {
    pub id: CellId,
    pub name: String,
    pub size: u32,
    /// Side 0/1 during bisection, 0..=3 after a quadrisection relabel.
    pub group: u8,
    /// Cutsize reduction if this cell switched sides right now.
    pub gain: i32,
    /// Set once the cell has moved in the current pass.
    pub locked: bool,
    pub nets: Vec<NetId>,
}

#[derive(Clone, Debug)]
pub struct Net {
    pub id: NetId,
    pub name: String,
    pub cells: Vec<CellId>,
    /// Incident cells per side (A, B).
    pub count: [u32; 2],
    pub is_cut: bool,
    pub critical: bool,
}

impl Net {
    pub fn degree(&self) -> usize {
        self.cells.len()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Hypergraph {
    pub cells: Vec<Cell>,
    pub nets: Vec<Net>,
    pub total_size: u64,
    /// Aggregate cell size per side (A, B).
    pub side_size: [u64; 2],
    pub cutsize: usize,
    /// Largest number of nets on a single cell. Bounds every gain.
    pub max_degree: u32,
}

impl Hypergraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cell(&mut self, name: impl Into<String>, size: u32) -> CellId {
        let id = self.cells.len() as CellId;
        self.cells.push(Cell {
            id,
            name: name.into(),
            size,
            group: 0,
            gain: 0,
            locked: false,
            nets: vec![],
        });
        self.total_size += size as u64;
        self.side_size[0] += size as u64;
        id
    }

    /// Declares a net over already declared cells. A cell listed more than once joins
    /// the net once, at its first position.
    pub fn add_net(&mut self, name: impl Into<String>, cells: Vec<CellId>) -> NetId {
        let id = self.nets.len() as NetId;
        let mut pins = Vec::with_capacity(cells.len());
        for c in cells {
            let cell = &mut self.cells[c as usize];
            if cell.nets.last() == Some(&id) {
                continue;
            }
            cell.nets.push(id);
            self.max_degree = self.max_degree.max(cell.nets.len() as u32);
            pins.push(c);
        }
        self.nets.push(Net {
            id,
            name: name.into(),
            cells: pins,
            count: [0, 0],
            is_cut: false,
            critical: false,
        });
        id
    }

    pub fn a_size(&self) -> u64 {
        self.side_size[0]
    }

    pub fn b_size(&self) -> u64 {
        self.side_size[1]
    }

    pub fn unlock_all(&mut self) {
        for c in self.cells.iter_mut() {
            c.locked = false;
        }
    }

    /// Rebuilds side sizes, net counters, the cutsize and all gains from the current groups.
    pub fn refresh(&mut self) {
        self.side_size = [0, 0];
        for c in self.cells.iter() {
            self.side_size[c.group as usize & 1] += c.size as u64;
        }

        let mut cutsize = 0;
        for net in self.nets.iter_mut() {
            net.count = [0, 0];
            for &c in net.cells.iter() {
                net.count[self.cells[c as usize].group as usize & 1] += 1;
            }
            net.is_cut = net.count[0] > 0 && net.count[1] > 0;
            net.critical = net.count[0] == 1 || net.count[1] == 1;
            if net.is_cut {
                cutsize += 1;
            }
        }
        self.cutsize = cutsize;

        for cx in 0..self.cells.len() {
            self.cells[cx].gain = self.cell_gain(cx as CellId);
        }
    }

    /// Gain of a cell derived from the cached net counters.
    pub fn cell_gain(&self, cx: CellId) -> i32 {
        let cell = &self.cells[cx as usize];
        let from = cell.group as usize & 1;
        let to = 1 - from;
        let mut gain = 0;
        for &n in cell.nets.iter() {
            let net = &self.nets[n as usize];
            if net.count[from] == 1 {
                gain += 1;
            }
            if net.count[to] == 0 {
                gain -= 1;
            }
        }
        gain
    }

    /// Counts nets touching at least two distinct groups, ignoring every cached counter.
    pub fn recompute_cutsize(&self) -> usize {
        self.nets
            .iter()
            .filter(|net| {
                let mut groups = net.cells.iter().map(|&c| self.cells[c as usize].group);
                match groups.next() {
                    Some(first) => groups.any(|g| g != first),
                    None => false,
                }
            })
            .count()
    }

    /// Aggregate cell size of each of the four possible groups.
    pub fn group_sizes(&self) -> [u64; 4] {
        let mut sizes = [0; 4];
        for c in self.cells.iter() {
            sizes[c.group as usize & 3] += c.size as u64;
        }
        sizes
    }

    pub fn cells_in_group(&self, group: u8) -> Vec<CellId> {
        self.cells
            .iter()
            .filter(|c| c.group == group)
            .map(|c| c.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pairs() -> Hypergraph {
        let mut hg = Hypergraph::new();
        for name in ["a", "b", "c", "d"] {
            hg.add_cell(name, 1);
        }
        hg.add_net("n1", vec![0, 1]);
        hg.add_net("n2", vec![2, 3]);
        hg
    }

    #[test]
    fn declaration_assigns_dense_ids_and_incidence() {
        let mut hg = two_pairs();
        let n3 = hg.add_net("n3", vec![0, 2, 3]);
        assert_eq!(n3, 2);
        assert_eq!(hg.cells[0].nets, vec![0, 2]);
        assert_eq!(hg.cells[3].nets, vec![1, 2]);
        assert_eq!(hg.max_degree, 2);
        assert_eq!(hg.total_size, 4);
        assert_eq!(hg.nets[2].degree(), 3);
    }

    #[test]
    fn repeated_pins_join_a_net_once() {
        let mut hg = two_pairs();
        let n3 = hg.add_net("n3", vec![2, 0, 2, 0, 1]);
        assert_eq!(hg.nets[n3 as usize].cells, vec![2, 0, 1]);
        assert_eq!(hg.cells[0].nets, vec![0, 2]);
        assert_eq!(hg.cells[2].nets, vec![1, 2]);
        assert_eq!(hg.max_degree, 2);

        hg.cells[2].group = 1;
        hg.refresh();
        assert_eq!(hg.nets[n3 as usize].count, [2, 1]);
        assert_eq!(hg.cutsize, 2);
        assert_eq!(hg.cells[2].gain, 2);
    }

    #[test]
    fn refresh_counts_cut_nets_and_gains() {
        let mut hg = two_pairs();
        hg.cells[1].group = 1;
        hg.cells[3].group = 1;
        hg.refresh();

        assert_eq!(hg.cutsize, 2);
        assert_eq!(hg.side_size, [2, 2]);
        assert_eq!(hg.a_size() + hg.b_size(), hg.total_size);
        for net in hg.nets.iter() {
            assert_eq!(net.count, [1, 1]);
            assert!(net.is_cut);
            assert!(net.critical);
        }
        for c in hg.cells.iter() {
            assert_eq!(c.gain, 1);
        }
    }

    #[test]
    fn uncut_net_makes_gain_negative() {
        let mut hg = two_pairs();
        hg.refresh();
        assert_eq!(hg.cutsize, 0);
        assert!(hg.cells.iter().all(|c| c.gain == -1));
    }

    #[test]
    fn recompute_cutsize_uses_distinct_groups() {
        let mut hg = two_pairs();
        hg.add_net("n3", vec![0, 1, 2, 3]);
        hg.cells[0].group = 0;
        hg.cells[1].group = 0;
        hg.cells[2].group = 2;
        hg.cells[3].group = 3;
        assert_eq!(hg.recompute_cutsize(), 2);
        assert_eq!(hg.group_sizes(), [2, 0, 1, 1]);
        assert_eq!(hg.cells_in_group(0), vec![0, 1]);
    }
}
