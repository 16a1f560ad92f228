use crate::{BalanceWindow, CellId, GainBucket, Hypergraph};

pub struct FmConfig {
    /// Balance window every tentative move must respect.
    pub window: BalanceWindow,
    /// Upper bound on the number of passes. `None` runs until a pass fails to improve.
    pub max_passes: Option<u32>,
}

impl Default for FmConfig {
    fn default() -> Self {
        Self {
            window: BalanceWindow::BISECTION,
            max_passes: None,
        }
    }
}

/// Outcome of simulating one pass on a private copy of the hypergraph.
#[derive(Clone, Debug)]
pub struct Proposal {
    /// Every move of the simulated pass, in order.
    pub moves: Vec<CellId>,
    /// Length of the prefix of `moves` reaching `best_cutsize`.
    pub best_prefix: usize,
    pub start_cutsize: usize,
    pub best_cutsize: usize,
}

impl Proposal {
    pub fn improves(&self) -> bool {
        self.best_cutsize < self.start_cutsize
    }

    /// The moves worth committing.
    pub fn best_moves(&self) -> &[CellId] {
        &self.moves[..self.best_prefix]
    }
}

#[derive(Clone, Debug, Default)]
pub struct FmReport {
    /// Passes run, including the final one that found nothing.
    pub passes: u32,
    /// Moves committed over all passes.
    pub moves: usize,
    pub initial_cutsize: usize,
    pub final_cutsize: usize,
    /// Committed cutsize after each improving pass.
    pub pass_cutsizes: Vec<usize>,
}

/// Multi-pass Fiduccia-Mattheyses refinement of a bisection.
pub struct FmEngine {
    config: FmConfig,
}

impl FmEngine {
    pub fn new(config: FmConfig) -> Self {
        Self { config }
    }

    pub fn with_window(window: BalanceWindow) -> Self {
        Self::new(FmConfig {
            window,
            ..Default::default()
        })
    }

    /// Refines the current groups of `hg` pass by pass until a pass cannot lower the cutsize.
    pub fn run(&self, hg: &mut Hypergraph) -> FmReport {
        hg.unlock_all();
        hg.refresh();

        let mut report = FmReport {
            initial_cutsize: hg.cutsize,
            final_cutsize: hg.cutsize,
            ..Default::default()
        };

        loop {
            if let Some(limit) = self.config.max_passes {
                if report.passes >= limit {
                    log::debug!("pass limit {limit} reached");
                    break;
                }
            }
            report.passes += 1;

            let proposal = self.propose(hg);
            if !proposal.improves() {
                log::debug!(
                    "pass {}: no improvement over cutsize {} after {} tentative moves",
                    report.passes,
                    proposal.start_cutsize,
                    proposal.moves.len()
                );
                break;
            }

            let cutsize = self.commit(hg, proposal.best_moves());
            debug_assert_eq!(cutsize, proposal.best_cutsize);
            log::debug!(
                "pass {}: cutsize {} -> {}, committed {} of {} moves",
                report.passes,
                proposal.start_cutsize,
                cutsize,
                proposal.best_prefix,
                proposal.moves.len()
            );
            report.moves += proposal.best_prefix;
            report.pass_cutsizes.push(cutsize);
        }

        report.final_cutsize = hg.cutsize;
        report
    }

    /// Simulates one pass on a clone of `hg` and reports the move sequence together with
    /// the prefix that reached the lowest cutsize. `hg` is left untouched.
    ///
    /// Expects `hg` to be refreshed and fully unlocked.
    pub fn propose(&self, hg: &Hypergraph) -> Proposal {
        let window = self.config.window;
        let mut work = hg.clone();
        let mut bucket = GainBucket::from_hypergraph(&work);

        let start = work.cutsize as i64;
        let mut running = start;
        let mut best = start;
        let mut best_prefix = 0;
        let mut moves = Vec::with_capacity(bucket.len());

        while let Some(cx) = bucket.extract_best_feasible(|c| window.feasible(&work, c)) {
            let gain = work.cells[cx as usize].gain;
            moves.push(cx);
            work.apply_move(cx, &mut bucket);
            running -= gain as i64;
            debug_assert_eq!(running, work.cutsize as i64);

            if running < best {
                best = running;
                best_prefix = moves.len();
            }
        }
        log::trace!(
            "simulated {} moves, best cutsize {best} after {best_prefix}",
            moves.len()
        );

        Proposal {
            moves,
            best_prefix,
            start_cutsize: start as usize,
            best_cutsize: best as usize,
        }
    }

    /// Replays `moves` on `hg` from a full recomputation of its state, then unlocks every
    /// cell and recomputes again. Returns the committed cutsize.
    pub fn commit(&self, hg: &mut Hypergraph, moves: &[CellId]) -> usize {
        hg.unlock_all();
        hg.refresh();
        let mut bucket = GainBucket::from_hypergraph(hg);

        for &cx in moves.iter() {
            bucket.remove(cx);
            hg.apply_move(cx, &mut bucket);
        }

        let incremental = hg.cutsize;
        hg.unlock_all();
        hg.refresh();
        debug_assert_eq!(incremental, hg.cutsize);
        hg.cutsize
    }
}
