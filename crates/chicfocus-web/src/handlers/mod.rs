//! HTTP / WebSocket 핸들러.

pub mod market;
pub mod status;
pub mod ws;
