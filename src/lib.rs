// Clearmark Library
// Synchronous HTTP front for an asynchronous watermark-removal job API

pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod job_client;
pub mod logging;
pub mod pipeline;
pub mod poller;
pub mod proxy;
pub mod relay;
pub mod security;
pub mod server;
pub mod staging;
pub mod upload;
