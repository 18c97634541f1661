pub mod tcp;

pub use tcp::{Connection, Listener};
