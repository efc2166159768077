//! Execution modes
//!
//! 目前只有 HTTP 服务器模式；`config generate` 等子命令在 `crate::cli` 中处理。

pub mod server;

pub use server::run_server;
