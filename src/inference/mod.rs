pub mod builder;
pub mod client;
pub mod decoder;
pub mod types;

pub use builder::*;
pub use client::*;
pub use decoder::*;
pub use types::*;
