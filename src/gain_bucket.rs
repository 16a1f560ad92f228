use crate::{Cell, CellId, Hypergraph};

const NIL: u32 = u32::MAX;

/// Position of one cell inside the bucket arena. Slots are indexed by cell id, so the
/// handle of a cell never moves; `bin == NIL` means the cell is not in any bucket.
#[derive(Copy, Clone, Debug)]
struct Slot {
    prev: u32,
    next: u32,
    bin: u32,
}

impl Slot {
    const EMPTY: Slot = Slot {
        prev: NIL,
        next: NIL,
        bin: NIL,
    };
}

/// Gain-indexed priority structure over the unlocked cells of a bisection.
///
/// Every gain in `[-max_gain, max_gain]` owns a bin holding an intrusive doubly linked
/// list threaded through the slot arena. Insertion pushes to the front of the bin and
/// extraction scans a bin front to back, so the order within a bin is fixed by the
/// sequence of insertions.
#[derive(Clone, Debug)]
pub struct GainBucket {
    max_gain: i32,
    heads: Vec<u32>,
    slots: Vec<Slot>,
    /// Highest non-empty bin.
    top: Option<usize>,
    len: usize,
}

impl GainBucket {
    pub fn new(max_gain: u32, cell_count: usize) -> Self {
        Self {
            max_gain: max_gain as i32,
            heads: vec![NIL; 2 * max_gain as usize + 1],
            slots: vec![Slot::EMPTY; cell_count],
            top: None,
            len: 0,
        }
    }

    /// Builds a bucket holding every unlocked cell of the hypergraph, in declaration order.
    pub fn from_hypergraph(hg: &Hypergraph) -> Self {
        let mut bucket = Self::new(hg.max_degree, hg.cells.len());
        for cell in hg.cells.iter() {
            bucket.insert(cell);
        }
        bucket
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, cx: CellId) -> bool {
        self.slots[cx as usize].bin != NIL
    }

    /// Gain of the highest occupied bin.
    pub fn best_gain(&self) -> Option<i32> {
        self.top.map(|bin| bin as i32 - self.max_gain)
    }

    fn bin_of(&self, gain: i32) -> usize {
        debug_assert!(
            gain.abs() <= self.max_gain,
            "gain {gain} outside [-{0}, {0}]",
            self.max_gain
        );
        (gain + self.max_gain) as usize
    }

    /// Places an unlocked cell into the bin of its current gain. Locked cells are ignored.
    pub fn insert(&mut self, cell: &Cell) {
        if cell.locked {
            return;
        }
        debug_assert!(!self.contains(cell.id), "cell {} inserted twice", cell.id);

        let bin = self.bin_of(cell.gain);
        let head = self.heads[bin];
        self.slots[cell.id as usize] = Slot {
            prev: NIL,
            next: head,
            bin: bin as u32,
        };
        if head != NIL {
            self.slots[head as usize].prev = cell.id;
        }
        self.heads[bin] = cell.id;
        self.len += 1;

        if self.top.map_or(true, |top| bin > top) {
            self.top = Some(bin);
        }
    }

    /// Unlinks a cell, invalidating its handle. Returns false if the cell was not present.
    pub fn remove(&mut self, cx: CellId) -> bool {
        let slot = self.slots[cx as usize];
        if slot.bin == NIL {
            return false;
        }

        if slot.prev != NIL {
            self.slots[slot.prev as usize].next = slot.next;
        } else {
            self.heads[slot.bin as usize] = slot.next;
        }
        if slot.next != NIL {
            self.slots[slot.next as usize].prev = slot.prev;
        }
        self.slots[cx as usize] = Slot::EMPTY;
        self.len -= 1;

        let bin = slot.bin as usize;
        if self.top == Some(bin) && self.heads[bin] == NIL {
            self.top = (0..bin).rev().find(|&b| self.heads[b] != NIL);
        }
        true
    }

    /// Sets a new gain on the cell and moves it to the matching bin.
    pub fn update(&mut self, cell: &mut Cell, gain: i32) {
        self.remove(cell.id);
        cell.gain = gain;
        self.insert(cell);
    }

    /// Removes and returns the first cell, scanning bins from the highest gain down and
    /// each bin front to back, for which `feasible` holds.
    pub fn extract_best_feasible<F>(&mut self, mut feasible: F) -> Option<CellId>
    where
        F: FnMut(CellId) -> bool,
    {
        let mut bin = self.top?;
        loop {
            let mut cursor = self.heads[bin];
            while cursor != NIL {
                if feasible(cursor) {
                    self.remove(cursor);
                    return Some(cursor);
                }
                cursor = self.slots[cursor as usize].next;
            }
            if bin == 0 {
                return None;
            }
            bin -= 1;
        }
    }

    /// Cells of one bin in scan order.
    pub fn cells_with_gain(&self, gain: i32) -> Vec<CellId> {
        let mut out = vec![];
        let mut cursor = self.heads[self.bin_of(gain)];
        while cursor != NIL {
            out.push(cursor);
            cursor = self.slots[cursor as usize].next;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: CellId, gain: i32) -> Cell {
        Cell {
            id,
            name: format!("c{id}"),
            size: 1,
            group: 0,
            gain,
            locked: false,
            nets: vec![],
        }
    }

    #[test]
    fn bins_scan_most_recent_first() {
        let mut bucket = GainBucket::new(2, 4);
        let cells = [cell(0, 1), cell(1, 1), cell(2, -2), cell(3, 1)];
        for c in cells.iter() {
            bucket.insert(c);
        }
        assert_eq!(bucket.len(), 4);
        assert_eq!(bucket.best_gain(), Some(1));
        assert_eq!(bucket.cells_with_gain(1), vec![3, 1, 0]);
        assert_eq!(bucket.cells_with_gain(-2), vec![2]);
    }

    #[test]
    fn locked_cells_are_never_inserted() {
        let mut bucket = GainBucket::new(1, 2);
        let mut c = cell(0, 0);
        c.locked = true;
        bucket.insert(&c);
        assert!(bucket.is_empty());
        assert!(!bucket.contains(0));
        assert_eq!(bucket.best_gain(), None);
    }

    #[test]
    fn update_moves_between_bins_and_tracks_top() {
        let mut bucket = GainBucket::new(3, 3);
        let mut cells = vec![cell(0, 3), cell(1, 0), cell(2, -1)];
        for c in cells.iter() {
            bucket.insert(c);
        }
        assert_eq!(bucket.best_gain(), Some(3));

        bucket.update(&mut cells[0], -3);
        assert_eq!(cells[0].gain, -3);
        assert_eq!(bucket.best_gain(), Some(0));
        assert_eq!(bucket.cells_with_gain(-3), vec![0]);
        assert_eq!(bucket.cells_with_gain(3), Vec::<CellId>::new());

        bucket.update(&mut cells[2], 2);
        assert_eq!(bucket.best_gain(), Some(2));
        assert_eq!(bucket.len(), 3);
    }

    #[test]
    fn extract_skips_infeasible_and_descends_into_negative_gains() {
        let mut bucket = GainBucket::new(2, 4);
        for c in [cell(0, 2), cell(1, 0), cell(2, -1), cell(3, -2)].iter() {
            bucket.insert(c);
        }

        assert_eq!(bucket.extract_best_feasible(|c| c >= 2), Some(2));
        assert!(!bucket.contains(2));
        // Skipped cells stay reachable for later extractions.
        assert_eq!(bucket.best_gain(), Some(2));
        assert_eq!(bucket.extract_best_feasible(|c| c == 3), Some(3));
        assert_eq!(bucket.extract_best_feasible(|_| false), None);
        assert_eq!(bucket.extract_best_feasible(|_| true), Some(0));
        assert_eq!(bucket.extract_best_feasible(|_| true), Some(1));
        assert_eq!(bucket.extract_best_feasible(|_| true), None);
        assert!(bucket.is_empty());
    }

    #[test]
    fn removal_from_middle_keeps_order() {
        let mut bucket = GainBucket::new(0, 3);
        for id in 0..3 {
            bucket.insert(&cell(id, 0));
        }
        assert!(bucket.remove(1));
        assert!(!bucket.remove(1));
        assert_eq!(bucket.cells_with_gain(0), vec![2, 0]);
        assert_eq!(bucket.extract_best_feasible(|_| true), Some(2));
    }

    #[test]
    fn clones_are_independent() {
        let mut bucket = GainBucket::new(1, 2);
        bucket.insert(&cell(0, 1));
        bucket.insert(&cell(1, 0));
        let mut copy = bucket.clone();
        assert_eq!(copy.extract_best_feasible(|_| true), Some(0));
        assert!(bucket.contains(0));
        assert_eq!(bucket.len(), 2);
        assert_eq!(copy.len(), 1);
    }
}
