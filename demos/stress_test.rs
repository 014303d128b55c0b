//! Builds diagrams for batches of random sites, logging progress instead
//! of rendering them. Adapted from the source crate's own stress-test
//! example; the piston viewer it paired with is out of scope here.

use log::info;
use rand::Rng;
use sweepline_voronoi::{SweepLine, Voronoi};

const BATCHES: usize = 1_000;
const SITES_PER_BATCH: usize = 10_000;
const WIDTH: i64 = 1_000_000;
const HEIGHT: i64 = 1_000_000;

fn main() {
    env_logger_shim();

    let mut rng = rand::thread_rng();
    for batch in 0..BATCHES {
        let mut vmap = Voronoi::new(WIDTH, HEIGHT);
        let mut placed = 0;
        while placed < SITES_PER_BATCH {
            let x = rng.gen_range(0, WIDTH);
            let y = rng.gen_range(0, HEIGHT);
            if vmap.add_site(x, y).is_ok() {
                placed += 1;
            }
        }

        let mut sweep = SweepLine::new();
        sweep.load(&mut vmap);
        sweep.run(&mut vmap);

        info!(
            "batch {}/{}: {} sites, {} cells completed",
            batch + 1,
            BATCHES,
            placed,
            vmap.cells().count(),
        );
    }
}

/// A minimal `log::Log` that writes to stderr, installed once at
/// startup. The library crate itself never does this.
fn env_logger_shim() {
    struct StderrLogger;

    impl log::Log for StderrLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Info
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                eprintln!("{} - {}", record.level(), record.args());
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: StderrLogger = StderrLogger;
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(log::LevelFilter::Info));
}
