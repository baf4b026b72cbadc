//! The resource directory service and its core resolution algorithm.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::cache::DirCache;
use crate::pools::{PrefixList, RootPool};
use crate::registry::{AbsoluteDir, Template, TypeRegistry, pool_for_type};
use crate::restrict::Restrictions;

/// Locates the directories and files belonging to logical resource
/// types across layered search roots.
///
/// One instance is meant to be created during start-up, populated via
/// the `&mut self` registration methods, and then shared behind an
/// `Arc` or reference. The read side ([`resolve`](Self::resolve),
/// [`find_all`](Self::find_all), [`save_location`](Self::save_location),
/// [`is_restricted`](Self::is_restricted)) takes `&self` and is safe to
/// call from multiple threads; its caches sit behind a mutex. The
/// borrow checker keeps registration and concurrent reads apart, which
/// is exactly the setup-then-freeze lifecycle the service expects.
///
/// Resolution never fails: an unknown type or a suffix that exists
/// under none of the roots yields an empty list, not an error.
#[derive(Debug, Default)]
pub struct ResourceDirs {
	pub(crate) primary: PrefixList,
	pub(crate) xdg_config: PrefixList,
	pub(crate) xdg_data: PrefixList,
	pub(crate) registry: TypeRegistry,
	pub(crate) restrictions: Restrictions,
	pub(crate) cache: DirCache,
}

impl ResourceDirs {
	/// Creates an empty service with no roots and no types registered.
	///
	/// Most callers want [`ResourceDirs::from_config`] instead, which
	/// also installs the built-in type table.
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn pool(&self, pool: RootPool) -> &PrefixList {
		match pool {
			RootPool::Primary => &self.primary,
			RootPool::XdgConfig => &self.xdg_config,
			RootPool::XdgData => &self.xdg_data,
		}
	}

	fn pool_mut(&mut self, pool: RootPool) -> &mut PrefixList {
		match pool {
			RootPool::Primary => &mut self.primary,
			RootPool::XdgConfig => &mut self.xdg_config,
			RootPool::XdgData => &mut self.xdg_data,
		}
	}

	/// The writable home root of the pool `ty` is associated with.
	pub(crate) fn pool_home(&self, ty: &str) -> PathBuf {
		self.pool(pool_for_type(ty))
			.home()
			.map(Path::to_path_buf)
			.unwrap_or_default()
	}

	/// Adds a search root to a pool. The first root added to a pool
	/// becomes its writable home root; priority roots are inserted
	/// directly behind it.
	///
	/// Empty and already-present paths are silently ignored. Adding a
	/// root invalidates the whole resolution cache, since any type may
	/// draw from any pool.
	pub fn add_root(&mut self, pool: RootPool, path: impl Into<PathBuf>, priority: bool) {
		if self.pool_mut(pool).add(path.into(), priority) {
			self.cache.clear();
		}
	}

	/// Registers a relative template for `ty`, optionally indirected
	/// through `basetype` (stored as `%basetype/relpath`). Priority
	/// templates are consulted first.
	///
	/// Returns false if an identical template already existed. On
	/// success only `ty`'s cache entries are invalidated.
	pub fn add_template(
		&mut self,
		ty: &str,
		basetype: Option<&str>,
		relpath: &str,
		priority: bool,
	) -> bool {
		let added = self.registry.add_template(ty, basetype, relpath, priority);
		if added {
			self.cache.remove(ty);
		}
		added
	}

	/// Registers an absolute directory for `ty`. Priority directories
	/// are returned ahead of every root-derived entry.
	///
	/// Returns false if the directory was already registered. On
	/// success only `ty`'s cache entries are invalidated.
	pub fn add_absolute_dir(&mut self, ty: &str, path: impl Into<PathBuf>, priority: bool) -> bool {
		let added = self.registry.add_absolute_dir(ty, path.into(), priority);
		if added {
			self.cache.remove(ty);
		}
		added
	}

	/// Merges restriction flags into the policy; entries mapped to
	/// `false` are ignored. Restrictions are append-only for the
	/// lifetime of the service.
	///
	/// Any newly added flag invalidates the whole resolution cache,
	/// since cached lists may already contain the now-hidden home root.
	pub fn activate_restrictions<I, S>(&mut self, flags: I)
	where
		I: IntoIterator<Item = (S, bool)>,
		S: Into<Box<str>>,
	{
		if self.restrictions.activate(flags) {
			self.cache.clear();
		}
	}

	/// Whether the writable home root is hidden for this exact query,
	/// via the `all` flag, a flag naming `ty`, or a `data_<subdir>`
	/// flag matching the first segment of `rel_path`.
	pub fn is_restricted(&self, ty: &str, rel_path: &str) -> bool {
		self.restrictions.is_restricted(ty, rel_path)
	}

	/// Resolves `ty` to its ordered list of directories, most local
	/// first.
	///
	/// The home root's candidates are always included even when they do
	/// not exist yet (they are the save target); every other candidate
	/// must be an existing directory. The ordering is deterministic and
	/// stable until the registries change, and index 0 is the most
	/// local applicable directory. Unknown types resolve to an empty
	/// list.
	pub fn resolve(&self, ty: &str) -> Vec<PathBuf> {
		let mut visited = FxHashSet::default();
		let mut truncated = false;
		self.resolve_inner(
			ty,
			self.restrictions.type_restricted(ty),
			true,
			&mut visited,
			&mut truncated,
		)
		.to_vec()
	}

	/// Candidate directories for a query with a relative path attached.
	///
	/// A `data` query whose sub-path hits a `data_<subdir>` flag is
	/// resolved restricted and bypasses the cache in both directions.
	pub(crate) fn candidates(&self, ty: &str, rel_path: &str) -> Vec<PathBuf> {
		if ty == "data" && self.restrictions.data_subpath_restricted(rel_path) {
			let mut visited = FxHashSet::default();
			let mut truncated = false;
			self.resolve_inner(ty, true, false, &mut visited, &mut truncated)
				.to_vec()
		} else {
			self.resolve(ty)
		}
	}

	fn resolve_inner(
		&self,
		ty: &str,
		restricted: bool,
		cacheable: bool,
		visited: &mut FxHashSet<Box<str>>,
		truncated: &mut bool,
	) -> Arc<[PathBuf]> {
		if cacheable {
			if let Some(dirs) = self.cache.dirs(ty) {
				return dirs;
			}
		}
		if !visited.insert(Box::from(ty)) {
			warn!(resource = ty, "cyclic template indirection, skipping");
			*truncated = true;
			return Arc::from(Vec::<PathBuf>::new());
		}

		let mut out: Vec<PathBuf> = Vec::new();
		let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
		let absolutes = self.registry.absolutes(ty);

		for abs in absolutes.iter().filter(|abs| abs.priority) {
			push_absolute(abs, &mut out, &mut seen);
		}

		let templates = self.registry.templates(ty);
		if !templates.is_empty() {
			let pool = self.pool(pool_for_type(ty));
			for (index, root) in pool.iter().enumerate() {
				let local = index == 0;
				if local && restricted {
					continue;
				}
				for template in templates {
					let Template::Literal(rel) = template else {
						continue;
					};
					let path = root.join(rel);
					// The home root is the save target, keep it even
					// if it does not exist yet.
					if (local || path.is_dir()) && seen.insert(path.clone()) {
						out.push(path);
					}
				}
			}

			for template in templates {
				let Template::Indirect { base, rest } = template else {
					continue;
				};
				let base_restricted = self.restrictions.type_restricted(base);
				let base_dirs = self.resolve_inner(base, base_restricted, true, visited, truncated);
				for (index, base_dir) in base_dirs.iter().enumerate() {
					// An empty rest aliases the base directory itself.
					let path = if rest.is_empty() {
						base_dir.clone()
					} else {
						base_dir.join(rest)
					};
					let local = index == 0 && !restricted;
					if (local || path.is_dir()) && seen.insert(path.clone()) {
						out.push(path);
					}
				}
			}
		}

		for abs in absolutes.iter().filter(|abs| !abs.priority) {
			push_absolute(abs, &mut out, &mut seen);
		}

		visited.remove(ty);
		debug!(resource = ty, count = out.len(), "resolved resource directories");

		let dirs: Arc<[PathBuf]> = Arc::from(out);
		// A list cut short by the cycle guard is not the list a clean
		// resolution would produce, so it must not outlive this call.
		if cacheable && !*truncated {
			self.cache.store_dirs(ty, dirs.clone());
		}
		dirs
	}

	/// Finds the first root of `ty` containing `filename` as a regular
	/// file and returns the joined path. An absolute `filename` is
	/// returned unchanged.
	pub fn find_resource(&self, ty: &str, filename: &str) -> Option<PathBuf> {
		self.find_resource_dir(ty, filename)
			.map(|dir| dir.join(filename))
	}

	/// Like [`find_resource`](Self::find_resource), but returns the
	/// containing directory instead of the joined path. An absolute
	/// `filename` yields its parent directory, without an existence
	/// check.
	pub fn find_resource_dir(&self, ty: &str, filename: &str) -> Option<PathBuf> {
		let path = Path::new(filename);
		if path.is_absolute() {
			return path.parent().map(Path::to_path_buf);
		}
		self.candidates(ty, filename)
			.into_iter()
			.find(|dir| dir.join(filename).is_file())
	}

	/// Every existing `root + reldir` directory for `ty`, most local
	/// first. An absolute `reldir` short-circuits to a plain existence
	/// check on that one directory.
	pub fn find_dirs(&self, ty: &str, reldir: &str) -> Vec<PathBuf> {
		let rel = Path::new(reldir);
		if rel.is_absolute() {
			if rel.is_dir() {
				return vec![rel.to_path_buf()];
			}
			return Vec::new();
		}
		self.candidates(ty, reldir)
			.into_iter()
			.map(|dir| dir.join(reldir))
			.filter(|dir| dir.is_dir())
			.collect()
	}

	/// Strips the most local matching root of `ty` from `abs_path`,
	/// turning it back into a type-relative path. Returns the input
	/// unchanged when no root matches.
	pub fn relative_location(&self, ty: &str, abs_path: &Path) -> PathBuf {
		for dir in self.resolve(ty) {
			if let Ok(rest) = abs_path.strip_prefix(&dir) {
				return rest.to_path_buf();
			}
		}
		abs_path.to_path_buf()
	}

	/// Every registered type key, sorted.
	pub fn all_types(&self) -> Vec<String> {
		self.registry.types()
	}
}

fn push_absolute(abs: &AbsoluteDir, out: &mut Vec<PathBuf>, seen: &mut FxHashSet<PathBuf>) {
	if abs.path.is_dir() && seen.insert(abs.path.clone()) {
		out.push(abs.path.clone());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unknown_type_resolves_to_empty_list() {
		let dirs = ResourceDirs::new();
		assert!(dirs.resolve("nonesuch").is_empty());
	}

	#[test]
	fn test_cyclic_indirection_terminates() {
		let mut dirs = ResourceDirs::new();
		dirs.add_root(RootPool::Primary, "/tmp", false);
		dirs.add_template("alpha", Some("beta"), "a/", false);
		dirs.add_template("beta", Some("alpha"), "b/", false);
		// The offending templates are skipped, not an error.
		assert!(dirs.resolve("alpha").is_empty());
		assert!(dirs.resolve("beta").is_empty());
	}

	#[test]
	fn test_cycle_truncated_lists_are_not_cached() {
		let build = || {
			let mut dirs = ResourceDirs::new();
			dirs.add_root(RootPool::Primary, "/nonexistent/home", false);
			dirs.add_template("alpha", None, "a/", false);
			dirs.add_template("alpha", Some("beta"), "b/", false);
			dirs.add_template("beta", Some("alpha"), "x/", false);
			dirs
		};

		let fresh = build();
		let beta_alone = fresh.resolve("beta");
		assert_eq!(beta_alone, [PathBuf::from("/nonexistent/home/a/x")]);

		// Resolving alpha first truncates beta inside the expansion;
		// that partial list must not leak into later beta lookups.
		let ordered = build();
		ordered.resolve("alpha");
		assert_eq!(ordered.resolve("beta"), beta_alone);
	}

	#[test]
	fn test_absolute_filename_yields_parent_directory() {
		let dirs = ResourceDirs::new();
		assert_eq!(
			dirs.find_resource_dir("config", "/some/where/app.rc"),
			Some(PathBuf::from("/some/where"))
		);
		assert_eq!(
			dirs.find_resource("config", "/some/where/app.rc"),
			Some(PathBuf::from("/some/where/app.rc"))
		);
	}

	#[test]
	fn test_self_referential_type_terminates() {
		let mut dirs = ResourceDirs::new();
		dirs.add_template("narcissus", Some("narcissus"), "me/", false);
		assert!(dirs.resolve("narcissus").is_empty());
	}

	#[test]
	fn test_home_root_kept_without_existing_directory() {
		let mut dirs = ResourceDirs::new();
		dirs.add_root(RootPool::Primary, "/nonexistent/home", false);
		dirs.add_template("icon", None, "share/icons/", false);
		assert_eq!(
			dirs.resolve("icon"),
			[PathBuf::from("/nonexistent/home/share/icons")]
		);
	}

	#[test]
	fn test_restriction_hides_home_root() {
		let mut dirs = ResourceDirs::new();
		dirs.add_root(RootPool::Primary, "/nonexistent/home", false);
		dirs.add_template("icon", None, "share/icons/", false);
		assert_eq!(dirs.resolve("icon").len(), 1);

		dirs.activate_restrictions([("icon", true)]);
		assert!(dirs.is_restricted("icon", ""));
		assert!(dirs.resolve("icon").is_empty());
	}
}
