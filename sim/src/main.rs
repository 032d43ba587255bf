use std::path::PathBuf;

use clap::Parser;
use sim::init::{init, SimConfig};
use sim::scene::load_scene;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// RON scene file; the built-in scene is used when omitted
    #[arg(short, long)]
    scene: Option<PathBuf>,

    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    #[arg(long, default_value_t = 60.0)]
    tick_rate: f64,

    /// Log a body report every N ticks, 0 to disable
    #[arg(short, long, default_value_t = 60)]
    report_every: u64,
}

fn main() {
    let args = Args::parse();

    if !(args.tick_rate.is_finite() && args.tick_rate > 0.0 && args.tick_rate <= 1000.0) {
        eprintln!("Error: tick_rate must be in (0, 1000] Hz.");
        eprintln!("Got: {}", args.tick_rate);
        std::process::exit(1);
    }

    let scene = match load_scene(args.scene.as_deref()) {
        Ok(scene) => scene,
        Err(err) => {
            eprintln!("Failed to load scene: {err}");
            std::process::exit(1);
        }
    };

    let exit = init(
        scene,
        SimConfig {
            ticks: args.ticks,
            tick_rate: args.tick_rate,
            report_every: args.report_every,
        },
    );
    if exit.is_error() {
        std::process::exit(1);
    }
}
