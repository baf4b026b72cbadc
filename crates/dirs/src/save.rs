//! Save-location resolution: the one writable directory for new files
//! of a resource type, created on demand.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::registry::Template;
use crate::service::ResourceDirs;

/// Failure to materialize a save location.
///
/// Advisory only: [`ResourceDirs::save_location`] still returns the
/// intended path so callers can attempt the write and surface a
/// conventional I/O error there.
#[derive(Debug, Error)]
pub enum SaveError {
	/// The computed save path was not absolute, usually because the
	/// type's pool has no home root.
	#[error("save path is not absolute: {0}")]
	Relative(PathBuf),

	/// The directory chain could not be created.
	#[error("could not create {path}: {source}")]
	Create {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

/// Recursively creates `dir` with the given unix mode bits, subject to
/// the process umask. Relative paths are rejected.
pub fn make_dir(dir: &Path, mode: u32) -> Result<(), SaveError> {
	if !dir.is_absolute() {
		return Err(SaveError::Relative(dir.to_path_buf()));
	}
	let mut builder = fs::DirBuilder::new();
	builder.recursive(true);
	#[cfg(unix)]
	{
		use std::os::unix::fs::DirBuilderExt;
		builder.mode(mode);
	}
	#[cfg(not(unix))]
	let _ = mode;
	builder.create(dir).map_err(|source| SaveError::Create {
		path: dir.to_path_buf(),
		source,
	})
}

impl ResourceDirs {
	/// The writable directory for new files of `ty`, with `suffix`
	/// appended.
	///
	/// The base is the type's lowest-priority template anchored at the
	/// home root of its pool (resolving `%base` templates through the
	/// base type's own save location), falling back to the last
	/// registered absolute directory and finally the bare home root.
	/// The base is cached per type.
	///
	/// With `create` set, missing directories along the path are
	/// created with mode 0700. Creation failure is logged and the
	/// intended path is returned regardless, so best-effort callers can
	/// try the write anyway.
	pub fn save_location(&self, ty: &str, suffix: &str, create: bool) -> PathBuf {
		let base = match self.cache.save_dir(ty) {
			Some(base) => base,
			None => {
				let mut visited = FxHashSet::default();
				let base = self.save_base(ty, &mut visited);
				self.cache.store_save_dir(ty, base.clone());
				base
			}
		};

		let full = if suffix.is_empty() {
			base
		} else {
			base.join(suffix)
		};

		if create && !full.is_dir() {
			match make_dir(&full, 0o700) {
				// The new directory must become visible to resolve().
				Ok(()) => self.cache.remove_dirs(ty),
				Err(error) => {
					warn!(path = %full.display(), %error, "could not create save location");
				}
			}
		}
		full
	}

	fn save_base(&self, ty: &str, visited: &mut FxHashSet<Box<str>>) -> PathBuf {
		if !visited.insert(Box::from(ty)) {
			warn!(resource = ty, "cyclic template indirection in save location");
			return self.pool_home(ty);
		}

		if let Some(template) = self.registry.templates(ty).last() {
			return match template {
				Template::Literal(rel) => self.pool_home(ty).join(rel),
				Template::Indirect { base, rest } => self.save_base(base, visited).join(rest),
			};
		}
		if let Some(abs) = self.registry.absolutes(ty).last() {
			return abs.path.clone();
		}
		debug!(resource = ty, "unregistered type, saving under the bare home root");
		self.pool_home(ty)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pools::RootPool;

	#[test]
	fn test_make_dir_rejects_relative_paths() {
		assert!(matches!(
			make_dir(Path::new("relative/dir"), 0o700),
			Err(SaveError::Relative(_))
		));
	}

	#[test]
	fn test_save_location_creates_directory_chain() {
		let temp = tempfile::tempdir().unwrap();
		let home = temp.path().join("home");

		let mut dirs = ResourceDirs::new();
		dirs.add_root(RootPool::Primary, &home, false);
		dirs.add_template("config", None, "share/config/", false);

		let location = dirs.save_location("config", "colors", true);
		assert_eq!(location, home.join("share/config/colors"));
		assert!(location.is_dir());
	}

	#[test]
	fn test_save_location_without_create_reports_path_only() {
		let temp = tempfile::tempdir().unwrap();
		let home = temp.path().join("home");

		let mut dirs = ResourceDirs::new();
		dirs.add_root(RootPool::Primary, &home, false);
		dirs.add_template("config", None, "share/config/", false);

		let location = dirs.save_location("config", "colors", false);
		assert_eq!(location, home.join("share/config/colors"));
		assert!(!location.exists());
	}

	#[test]
	fn test_save_location_uses_lowest_priority_template() {
		let temp = tempfile::tempdir().unwrap();
		let home = temp.path().join("home");

		let mut dirs = ResourceDirs::new();
		dirs.add_root(RootPool::Primary, &home, false);
		dirs.add_template("data", None, "share/apps/", false);
		dirs.add_template("data", None, "share/data/", true);

		// The priority template is searched first but saves go to the
		// list's last entry.
		assert_eq!(
			dirs.save_location("data", "", false),
			home.join("share/apps")
		);
	}

	#[test]
	fn test_save_location_resolves_indirection_through_base_type() {
		let temp = tempfile::tempdir().unwrap();
		let home = temp.path().join("home");

		let mut dirs = ResourceDirs::new();
		dirs.add_root(RootPool::Primary, &home, false);
		dirs.add_template("data", None, "share/apps/", false);
		dirs.add_template("appdata", Some("data"), "myapp/", false);

		assert_eq!(
			dirs.save_location("appdata", "", false),
			home.join("share/apps/myapp")
		);
	}
}
