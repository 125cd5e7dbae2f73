//! 中継サーバとの通信

pub mod fetch;

pub use fetch::{FetchTransport, DEFAULT_ENDPOINT};
