use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fm_partition::{
    BalanceWindow, BisectionPartitioningConfig, Hypergraph, InitialPartitioningMethod,
    QuadrisectionConfig,
};
use std::path::PathBuf;
use std::time;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Method {
    SizeGreedy,
    Connectivity,
}

impl From<Method> for InitialPartitioningMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::SizeGreedy => InitialPartitioningMethod::SizeGreedy,
            Method::Connectivity => InitialPartitioningMethod::Connectivity,
        }
    }
}

/// Number of output groups.
#[derive(Copy, Clone, Debug, PartialEq, ValueEnum)]
enum Ways {
    #[value(name = "2")]
    Two,
    #[value(name = "4")]
    Four,
}

impl Ways {
    fn groups(self) -> u8 {
        match self {
            Ways::Two => 2,
            Ways::Four => 4,
        }
    }
}

/// Min-cut 2-way or 4-way partitioning of a cell/net hypergraph.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Netlist in the NumCells/Cell/NumNets/Net text format.
    input: PathBuf,
    /// Where to write the cutsize and the cell groups.
    output: PathBuf,
    /// Number of groups.
    #[arg(value_enum)]
    k: Ways,
    /// Seeding algorithm used before refinement.
    #[arg(long, value_enum, default_value_t = Method::Connectivity)]
    method: Method,
    /// Stop refinement after this many passes.
    #[arg(long)]
    max_passes: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut hg = Hypergraph::from_path(&args.input)
        .with_context(|| format!("could not read {}", args.input.display()))?;
    let t1 = time::Instant::now();

    if args.k == Ways::Two {
        let report = hg.partition_bisection(&BisectionPartitioningConfig {
            initial_partitioning: args.method.into(),
            window: BalanceWindow::BISECTION,
            max_passes: args.max_passes,
        });
        let total = hg.total_size.max(1) as f64;
        println!("TotalSize = {}", hg.total_size);
        println!(
            "GroupA Size = {} ({:.3})",
            hg.a_size(),
            hg.a_size() as f64 / total
        );
        println!(
            "GroupB Size = {} ({:.3})",
            hg.b_size(),
            hg.b_size() as f64 / total
        );
        println!(
            "Cutsize: {} -> {} in {} passes",
            report.initial_cutsize, report.final_cutsize, report.passes
        );
    } else {
        let report = hg.partition_quadrisection(&QuadrisectionConfig {
            initial_partitioning: args.method.into(),
            max_passes: args.max_passes,
            ..Default::default()
        });
        println!("TotalSize = {}", hg.total_size);
        println!("Group sizes = {:?}", report.group_sizes);
        println!("Cutsize: {}", report.cutsize);
    }
    println!("time: {}ms", t1.elapsed().as_millis());

    hg.write_partition_to_path(&args.output, args.k.groups())
        .with_context(|| format!("could not write {}", args.output.display()))?;
    Ok(())
}
