//! Layered resource directory resolution.
//!
//! Applications that install files under several roots at once (a
//! writable per-user root, XDG config/data directories, one or more
//! installation prefixes) need one answer to "where do icons live?".
//! This crate maps logical resource *types* to the ordered set of real
//! directories that currently provide them, most local root first.
//!
//! - Types are registered as relative suffix templates
//!   (`icon` → `share/icons/`), optionally indirected through another
//!   type (`%data/myapp/` means "every `data` directory, plus
//!   `myapp/`").
//! - [`ResourceDirs::resolve`] composes roots × templates, filters by
//!   existence, dedupes preserving priority order, and memoizes per
//!   type.
//! - [`ResourceDirs::find_all`] enumerates files below those
//!   directories with per-segment `*`/`?` wildcards.
//! - [`ResourceDirs::save_location`] picks (and creates) the writable
//!   directory for new files of a type.
//! - Restriction flags can hide the writable root from individual
//!   types, for locked-down deployments.
//!
//! # Example
//!
//! ```
//! use strata_dirs::{ResourceDirs, RootPool};
//!
//! let mut dirs = ResourceDirs::new();
//! dirs.add_root(RootPool::Primary, "/home/u/.app", false);
//! dirs.add_root(RootPool::Primary, "/usr", false);
//! dirs.add_template("icon", None, "share/icons/", false);
//!
//! // The writable home root always comes first, whether or not it
//! // exists on disk yet; read-only roots must exist to be listed.
//! let resolved = dirs.resolve("icon");
//! assert_eq!(resolved[0], std::path::PathBuf::from("/home/u/.app/share/icons"));
//! ```
//!
//! Registration (`&mut self`) happens during single-threaded start-up;
//! afterwards the read side (`&self`) may be shared freely across
//! threads.

mod cache;
pub mod config;
pub mod pools;
mod registry;
mod restrict;
pub mod save;
pub mod search;
pub mod service;

pub use config::DirsConfig;
pub use pools::RootPool;
pub use save::{SaveError, make_dir};
pub use search::SearchOptions;
pub use service::ResourceDirs;
