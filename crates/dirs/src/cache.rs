//! Memoized resolution results.
//!
//! Two maps behind one facade: resolved directory lists per type, and
//! the computed save base directory per type. Both sit behind mutexes so
//! the read-then-populate sequence in the resolver is safe from multiple
//! threads.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub(crate) struct DirCache {
	dirs: Mutex<FxHashMap<Box<str>, Arc<[PathBuf]>>>,
	saves: Mutex<FxHashMap<Box<str>, PathBuf>>,
}

impl DirCache {
	pub(crate) fn dirs(&self, ty: &str) -> Option<Arc<[PathBuf]>> {
		self.dirs.lock().get(ty).cloned()
	}

	pub(crate) fn store_dirs(&self, ty: &str, dirs: Arc<[PathBuf]>) {
		self.dirs.lock().insert(Box::from(ty), dirs);
	}

	pub(crate) fn save_dir(&self, ty: &str) -> Option<PathBuf> {
		self.saves.lock().get(ty).cloned()
	}

	pub(crate) fn store_save_dir(&self, ty: &str, dir: PathBuf) {
		self.saves.lock().insert(Box::from(ty), dir);
	}

	/// Drops both tiers for one type. Used when the type's templates or
	/// absolute dirs change.
	pub(crate) fn remove(&self, ty: &str) {
		self.dirs.lock().remove(ty);
		self.saves.lock().remove(ty);
	}

	/// Drops only the directory list for one type. Used after the save
	/// location created a directory that resolution should now see.
	pub(crate) fn remove_dirs(&self, ty: &str) {
		self.dirs.lock().remove(ty);
	}

	/// Drops everything. Used when a root is added or restrictions are
	/// first activated, since any type may be affected.
	pub(crate) fn clear(&self) {
		self.dirs.lock().clear();
		self.saves.lock().clear();
	}
}
