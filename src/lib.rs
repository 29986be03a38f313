pub mod codec;
pub mod commands;
pub mod config;
pub mod connection;
pub mod encoder;
pub mod frame;
pub mod list;
pub mod server;
pub mod store;
pub mod value;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
