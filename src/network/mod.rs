pub mod checkpoint;
pub mod network;

pub use checkpoint::{CheckpointSink, DirectoryCheckpoints};
pub use network::Network;
