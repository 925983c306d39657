// src/stream/mod.rs
//! Streaming interface model: fixed-point elements, single-pass channels,
//! and the adapter that frames corpus rows onto them.

pub mod element;
pub mod channel;
pub mod adapter;

pub use element::{Fixed, FixedSpec};
pub use channel::{Channel, ChannelError};
pub use adapter::{fill_zero, from_channel, invoke_kernel, to_channel};
