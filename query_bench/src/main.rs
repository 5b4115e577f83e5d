//! Benchmark and validation harness for the metric-tree library.
//!
//! Generates pseudorandom keys, builds the selected index once, and runs
//! batches of range queries at each requested radius, reporting query rate,
//! mean hits, and the fraction of the index each query had to examine.

use clap::Parser;
use kdam::tqdm;
use log::info;
use metric_tree::accumulator::ResultAccumulator;
use metric_tree::data::{self, Key, MAX_DISTANCE};
use metric_tree::tree::{Tree, TreeConfig, TreeKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::process;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Index type: bk, vp, or linear
    kind: TreeKind,

    /// Query radii to benchmark, each in 1..32
    #[arg(required = true)]
    distances: Vec<u32>,

    /// Maximum number of keys in a leaf before splitting stops
    #[arg(short, long, default_value_t = 1000)]
    max_leaf_size: usize,

    /// Number of keys to index
    #[arg(short = 'n', long, default_value_t = 1_000_000)]
    num_keys: usize,

    /// Number of queries per distance
    #[arg(short = 'q', long, default_value_t = 1000)]
    num_queries: usize,

    /// RNG seed; drawn from entropy when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// YAML config file overriding the index type and leaf size
    #[arg(short, long)]
    config: Option<String>,

    /// Print every query and its matches as bit strings
    #[arg(short, long)]
    print: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match TreeConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        None => TreeConfig {
            kind: args.kind,
            max_leaf_size: args.max_leaf_size,
        },
    };

    for &dist in &args.distances {
        if dist == 0 || dist >= MAX_DISTANCE {
            eprintln!("Distance should be in the range 1..{}", MAX_DISTANCE);
            process::exit(1);
        }
    }
    if args.num_keys == 0 {
        eprintln!("Need at least one key");
        process::exit(1);
    }

    let seed = match args.seed {
        Some(seed) => seed,
        None => rand::thread_rng().gen(),
    };
    info!("seed: {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    println!("Type: {}", config.kind);
    println!("Keys: {}", args.num_keys);
    println!("Queries: {}", args.num_queries);
    println!();

    println!("Generating keys...");
    let mut keys: Vec<Key> = Vec::with_capacity(args.num_keys);
    for _ in tqdm!(0..args.num_keys) {
        keys.push(data::random_key(&mut rng));
    }

    println!("Building tree...");
    let build_start = Instant::now();
    let tree = match Tree::build(config, &keys) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("build failed: {}", e);
            process::exit(1);
        }
    };
    drop(keys);

    println!("Time: {:.3} sec", build_start.elapsed().as_secs_f64());
    println!("Nodes: {}", tree.node_count());
    println!("Tree size: {}", tree.tree_size());

    let mut results = ResultAccumulator::new();

    for &dist in &args.distances {
        let mut total_hits: u64 = 0;
        let mut total_examined: u64 = 0;

        let batch_start = Instant::now();

        println!();
        println!("Distance: {}", dist);

        for _ in 0..args.num_queries {
            let ref_key = data::random_key(&mut rng);

            results.clear();
            let examined = match tree.query(ref_key, dist, &mut results) {
                Ok(examined) => examined,
                Err(e) => {
                    eprintln!("query failed: {}", e);
                    process::exit(1);
                }
            };

            total_examined += examined as u64;
            total_hits += results.len() as u64;

            if args.print {
                println!("Query: {}", data::key_bits(ref_key));
                for &hit in &results {
                    println!("       {}", data::key_bits_masked(hit, ref_key));
                }
            }
        }

        let elapsed = batch_start.elapsed().as_secs_f64();
        let queries = args.num_queries as f64;

        println!("Rate: {:.0} query/sec", queries / elapsed);
        println!("Time: {:.6} msec/query", 1000.0 * elapsed / queries);
        println!("Hits: {:.3}", total_hits as f64 / queries);
        println!(
            "Coverage: {:.3}%",
            100.0 * total_examined as f64 / (args.num_keys as f64 * queries)
        );
        match total_hits {
            0 => println!("Cmp/result: n/a"),
            _ => println!("Cmp/result: {:.3}", total_examined as f64 / total_hits as f64),
        }
    }
}
