use crate::{CellId, GainBucket, Hypergraph};

impl Hypergraph {
    /// Moves `mx` to the opposite side and locks it.
    ///
    /// Only cells sharing a net with `mx` have their gains touched, and always through
    /// `bucket.update`. The moved cell must already be out of the bucket. Net counters, the
    /// side sizes and the cutsize are kept current.
    pub fn apply_move(&mut self, mx: CellId, bucket: &mut GainBucket) {
        debug_assert!(!bucket.contains(mx), "moving cell {mx} is still bucketed");

        let from = self.cells[mx as usize].group as usize & 1;
        let to = 1 - from;
        self.cells[mx as usize].locked = true;

        for i in 0..self.cells[mx as usize].nets.len() {
            let n = self.cells[mx as usize].nets[i] as usize;
            let cells = &mut self.cells;
            let net = &mut self.nets[n];
            let was_cut = net.is_cut;

            let to_count = net.count[to];
            if to_count == 0 {
                // The net is about to become cut: every free cell on it gains.
                for &c in net.cells.iter() {
                    let cell = &mut cells[c as usize];
                    if !cell.locked && cell.group as usize & 1 == from {
                        let gain = cell.gain + 1;
                        bucket.update(cell, gain);
                    }
                }
            } else if to_count == 1 {
                // The lone cell on the destination side stops being critical.
                let lone = net.cells.iter().copied().find(|&c| {
                    let cell = &cells[c as usize];
                    !cell.locked && cell.group as usize & 1 == to
                });
                if let Some(c) = lone {
                    let cell = &mut cells[c as usize];
                    let gain = cell.gain - 1;
                    bucket.update(cell, gain);
                }
            }

            let from_count = net.count[from] - 1;
            if from_count == 0 {
                // The source side vanished from the net: moving any remaining cell recuts it.
                for &c in net.cells.iter() {
                    let cell = &mut cells[c as usize];
                    if !cell.locked && cell.group as usize & 1 == to {
                        let gain = cell.gain - 1;
                        bucket.update(cell, gain);
                    }
                }
            } else if from_count == 1 {
                // One cell left behind on the source side; moving it uncuts the net.
                let lone = net.cells.iter().copied().find(|&c| {
                    let cell = &cells[c as usize];
                    !cell.locked && cell.group as usize & 1 == from
                });
                if let Some(c) = lone {
                    let cell = &mut cells[c as usize];
                    let gain = cell.gain + 1;
                    bucket.update(cell, gain);
                }
            }

            net.count[from] = from_count;
            net.count[to] = to_count + 1;
            net.is_cut = net.count[0] > 0 && net.count[1] > 0;
            net.critical = net.count[0] == 1 || net.count[1] == 1;

            match (was_cut, net.is_cut) {
                (false, true) => self.cutsize += 1,
                (true, false) => self.cutsize -= 1,
                _ => {}
            }
        }

        let cell = &mut self.cells[mx as usize];
        let size = cell.size as u64;
        self.side_size[from] -= size;
        self.side_size[to] += size;
        cell.group = to as u8;
    }
}
