// Performance measurement for RbTree instances. Measure:
// * Initial load of N random values.
// * Membership lookup of every loaded value.
// * Remove every loaded value, in load order.
//
// Usage: rbtree-index [N], log level from RBTREE_LOG (default info).

use std::{env, error::Error, time::Instant};

use log::info;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use rbtree_index::RbTree;

const DEFAULT_COUNT: usize = 1_000_000;

fn main() -> Result<(), Box<dyn Error>> {
    let level = match env::var("RBTREE_LOG").as_ref().map(String::as_str) {
        Ok("error") => LevelFilter::Error,
        Ok("warn") => LevelFilter::Warn,
        Ok("debug") => LevelFilter::Debug,
        Ok("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;

    let count = match env::args().nth(1) {
        Some(arg) => arg.parse::<usize>()?,
        None => DEFAULT_COUNT,
    };

    let mut rng = SmallRng::from_seed([7; 16]);
    let values: Vec<u64> = (0..count).map(|_| rng.gen()).collect();

    let start = Instant::now();
    let index: RbTree<u64> = RbTree::load_from("perf", values.iter().cloned());
    info!("load {} entries in {:?}", index.len(), start.elapsed());

    let stats = index.validate().map_err(|err| err.to_string())?;
    info!("blacks {:?}", stats.blacks());
    if let Some(depths) = stats.depths() {
        depths.pretty_print("");
    }

    let start = Instant::now();
    let found = values.iter().filter(|v| index.contains(*v)).count();
    info!("contains {} entries in {:?}", found, start.elapsed());

    let mut index = index;
    let start = Instant::now();
    let removed = values.iter().filter_map(|v| index.remove(v)).count();
    info!("remove {} entries in {:?}", removed, start.elapsed());

    Ok(())
}
