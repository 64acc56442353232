//! Price comparison across AliExpress and Taobao, normalized to KRW

pub mod app;
pub mod config;
pub mod server;
pub mod services;
pub mod sources;
pub mod types;
