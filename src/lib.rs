//! UseThisLink - a session-aware URL shortener
//!
//! Anonymous visitors are identified by a session cookie; registered users
//! verify their email with a one-time password and keep the links they
//! created before logging in.
//!
//! # Architecture
//! - `api`: HTTP handlers and middleware (session cookie, request id)
//! - `services`: shortening, auth, analytics, GeoIP, mail, QR codes
//! - `storage`: SeaORM backend (SQLite / MySQL / PostgreSQL)
//! - `config`: TOML + environment configuration
//! - `runtime`: server startup and shutdown
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
