use std::path::{Path, PathBuf};

/// Which ordered list of search roots a resource type draws from.
///
/// The pool is picked from the type name: `xdgdata-*` types use
/// [`RootPool::XdgData`], `xdgconf-*` types use [`RootPool::XdgConfig`],
/// everything else uses [`RootPool::Primary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootPool {
	/// Home root plus installation roots.
	Primary,
	/// XDG config roots.
	XdgConfig,
	/// XDG data roots.
	XdgData,
}

/// Ordered root prefixes for one pool.
///
/// The first entry is the writable home root and is also the save target,
/// so it always stays first: priority insertion places new roots directly
/// behind it.
#[derive(Debug, Default, Clone)]
pub(crate) struct PrefixList {
	roots: Vec<PathBuf>,
}

impl PrefixList {
	/// Adds a root. Returns whether the list changed; empty paths and
	/// roots already present are ignored.
	pub(crate) fn add(&mut self, path: PathBuf, priority: bool) -> bool {
		if path.as_os_str().is_empty() || self.roots.contains(&path) {
			return false;
		}
		if priority && !self.roots.is_empty() {
			self.roots.insert(1, path);
		} else {
			self.roots.push(path);
		}
		true
	}

	/// Roots in search order, most local first.
	pub(crate) fn iter(&self) -> impl Iterator<Item = &Path> {
		self.roots.iter().map(PathBuf::as_path)
	}

	/// The writable home root.
	pub(crate) fn home(&self) -> Option<&Path> {
		self.roots.first().map(PathBuf::as_path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_priority_insert_stays_behind_home() {
		let mut pool = PrefixList::default();
		assert!(pool.add(PathBuf::from("/home/u/.app"), false));
		assert!(pool.add(PathBuf::from("/usr"), false));
		assert!(pool.add(PathBuf::from("/opt/app"), true));

		let roots: Vec<_> = pool.iter().collect();
		assert_eq!(
			roots,
			[
				Path::new("/home/u/.app"),
				Path::new("/opt/app"),
				Path::new("/usr")
			]
		);
		assert_eq!(pool.home(), Some(Path::new("/home/u/.app")));
	}

	#[test]
	fn test_priority_insert_into_empty_pool_becomes_home() {
		let mut pool = PrefixList::default();
		assert!(pool.add(PathBuf::from("/usr"), true));
		assert_eq!(pool.home(), Some(Path::new("/usr")));
	}

	#[test]
	fn test_duplicate_and_empty_roots_are_ignored() {
		let mut pool = PrefixList::default();
		assert!(pool.add(PathBuf::from("/usr"), false));
		assert!(!pool.add(PathBuf::from("/usr"), false));
		// Path comparison is component-based, so a trailing slash is
		// the same root.
		assert!(!pool.add(PathBuf::from("/usr/"), true));
		assert!(!pool.add(PathBuf::new(), false));
		assert_eq!(pool.iter().count(), 1);
	}
}
