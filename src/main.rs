//! # Voxel World Demo Entry Point
//!
//! Runs the headless walk from the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info VOXEL_WORLD_CONFIG=world.json cargo run --release
//! ```

use log::error;

fn main() {
    if let Err(err) = voxel_world::run() {
        error!("{err}");
        eprintln!("voxel-world: {err}");
        std::process::exit(1);
    }
}
