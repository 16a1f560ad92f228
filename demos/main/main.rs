use fm_partition::{Hypergraph, QuadrisectionConfig, RandomHypergraphConfig};
use std::time;

fn main() {
    env_logger::init();
    let mut hg = Hypergraph::random(&RandomHypergraphConfig {
        cells: 20_000,
        nets: 24_000,
        max_net_degree: 6,
        max_cell_size: 4,
        ..Default::default()
    });
    let t1 = time::Instant::now();
    let report = hg.partition_quadrisection(&QuadrisectionConfig::default());
    println!("time: {}ms", t1.elapsed().as_millis());
    println!(
        "cutsize: {} (root split {}), group sizes {:?} of {}",
        report.cutsize, report.root_cutsize, report.group_sizes, hg.total_size
    );
}
