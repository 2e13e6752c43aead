pub mod models;
pub mod storage;
pub mod auth;
pub mod gateway;
pub mod service;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod singleflight;

pub use client::RemoteClient;
pub use config::Config;
pub use error::{Error, Result};
