use clap::Parser;
use log::debug;

mod args;
mod pool;

fn main() {
    let a = args::Args::parse();
    if a.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    debug!("arguments: {:?}", a);
    if let Err(e) = pool::run(&a) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
