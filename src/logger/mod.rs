//! Logger module
//!
//! Provides logging utilities for the service including:
//! - Server lifecycle logging
//! - Per-request audit events
//! - Error and warning logging
//! - Console plus severity-partitioned file sinks

mod format;
pub mod writer;

pub use format::{LogLevel, LogRecord, RequestEvent};

use crate::config::Config;
use std::net::SocketAddr;

/// Service name used before the writer is initialized
const FALLBACK_SERVICE: &str = "calculator-microservice";

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(&config.logging)
}

fn emit(level: LogLevel, message: &str) {
    if let Some(w) = writer::get() {
        w.write(level, message);
    } else {
        writer::write_console(&LogRecord::new(level, message, FALLBACK_SERVICE));
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    emit(LogLevel::Info, &format!("Server is running on http://{addr}"));
    if let Some(workers) = config.server.workers {
        emit(LogLevel::Info, &format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.combined_log_file {
        emit(LogLevel::Info, &format!("Combined log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        emit(LogLevel::Info, &format!("Error log: {path}"));
    }
}

/// Audit line written for every inbound request
pub fn log_request(event: &RequestEvent) {
    emit(LogLevel::Info, &event.message());
}

pub fn log_response(method: &str, path: &str, status: u16) {
    emit(LogLevel::Debug, &format!("{method} {path} - {status}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    emit(LogLevel::Debug, &format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    emit(
        LogLevel::Error,
        &format!("Failed to serve connection: {err:?}"),
    );
}

pub fn log_store_connected(backend: &str) {
    emit(LogLevel::Info, &format!("Connected to {backend} store"));
}

pub fn log_store_connect_failed(err: &impl std::fmt::Display) {
    emit(
        LogLevel::Error,
        &format!("Error connecting to store: {err}"),
    );
}

pub fn log_shutdown() {
    emit(LogLevel::Info, "Shutdown requested, no longer accepting connections");
}

pub fn log_error(message: &str) {
    emit(LogLevel::Error, message);
}

pub fn log_warning(message: &str) {
    emit(LogLevel::Warn, message);
}

pub fn log_info(message: &str) {
    emit(LogLevel::Info, message);
}
