// Loads a checkpoint and prints the network it describes.
//
//   ironnet path/to/epoch_5.json
//
// Training demos live under demos/:
//   cargo run --example xor
use std::env;
use std::process::ExitCode;

use ironnet::Network;

fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = env::args().nth(1) else {
        println!("ironnet: a from-scratch feed-forward network trainer.");
        println!("usage: ironnet <checkpoint.json>");
        println!("Run `cargo run --example xor` to see the XOR demo.");
        return ExitCode::SUCCESS;
    };

    match Network::load_json(&path) {
        Ok(network) => {
            print!("{network}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("could not load {path}: {e}");
            ExitCode::FAILURE
        }
    }
}
