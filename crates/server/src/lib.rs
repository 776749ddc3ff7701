//! # Edulib Server Library
//!
//! This crate serves an educational library directory over HTTP.
//!
//! ## Overview
//!
//! - **Configuration**: TOML file with environment overrides
//! - **HTTP**: axum routes for the library tree and file downloads
//! - **Logging**: tracing subscriber setup
//!
//! Path containment, classification and listing live in the [`library`]
//! crate; this crate only maps its outcomes to HTTP.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use library::LibraryManager;
//! use server::{http, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default()?;
//!     let library = Arc::new(LibraryManager::open(
//!         &config.library.root,
//!         config.library_options(),
//!     )?);
//!
//!     let app = http::router(library, &config.server);
//!     let listener = tokio::net::TcpListener::bind(config.bind_addr()?).await?;
//!     http::serve(listener, app, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and defaults
//! - [`http`]: Router, handlers and server loop
//! - [`logging`]: Tracing initialisation

pub mod config;
pub mod http;
pub mod logging;

// Re-export library for convenience
pub use library;

pub use config::{Config, ConfigError};
pub use http::{router, serve, AppState, ErrorBody, HealthBody, LibraryListing};
