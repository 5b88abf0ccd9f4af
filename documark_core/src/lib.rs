//! `documark_core` is the core library for the documark documentation
//! templating engine. It expands named placeholder markers embedded in
//! source-code doc comments into full documentation blocks pulled from a
//! template registry, rewriting files in place.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source file
//!   → Comment locator (finds `/** ... */` doc comments attached to declarations)
//!   → Marker lexer (tokenizes comment interiors, extracts `{documentary:name}` markers)
//!   → Resolver (looks templates up in the registry, expands nested markers)
//!   → Rewriter (splices rendered comments back into the file in one pass)
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Configuration loading from `documark.toml`, including
//!   template paths and exclude/include patterns.
//! - [`registry`] — Template definition loading from JSON and TOML files.
//! - [`project`] — Project scanning and directory walking.
//!
//! ## Key Types
//!
//! - [`MarkerReference`] — A parsed marker with its template name, optional
//!   selector, and spelling.
//! - [`TemplateRegistry`] — The loaded name-to-template map.
//! - [`ProjectContext`] — A scanned project together with its loaded
//!   registry, ready for checking or updating.
//! - [`CheckResult`] — Result of checking a project for stale comments.
//! - [`UpdateResult`] — Result of computing expansions for marker comments.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use documark_core::project::scan_project_with_config;
//! use documark_core::{check_project, compute_updates, write_updates};
//! use std::path::Path;
//!
//! let ctx = scan_project_with_config(Path::new(".")).unwrap();
//!
//! // Check for stale marker comments
//! let result = check_project(&ctx).unwrap();
//! if !result.is_ok() {
//!     eprintln!("{} stale comment(s) found", result.stale.len());
//! }
//!
//! // Expand all marker comments
//! let updates = compute_updates(&ctx).unwrap();
//! write_updates(&updates).unwrap();
//! ```

pub use engine::*;
pub use error::*;
pub use lexer::*;
pub use locator::*;
pub use position::*;
pub use project::*;
pub use registry::*;
pub use resolver::*;
pub use rewriter::*;

pub mod config;
mod engine;
mod error;
pub mod lexer;
pub mod locator;
mod position;
pub mod project;
pub mod registry;
mod resolver;
mod rewriter;
