//! Restriction policy: flags that hide the writable home root from
//! resolution for a type or a type+subdirectory.

use rustc_hash::FxHashSet;

/// Monotonic restriction flag set.
///
/// Flags are keyed by a bare type name (hides the home root for that
/// type), by `data_<subdir>` (hides it only for `data` queries whose
/// relative path starts with `<subdir>`), or by `all`. Once activated,
/// flags can be added but never removed.
#[derive(Debug, Default)]
pub(crate) struct Restrictions {
	active: bool,
	flags: FxHashSet<Box<str>>,
}

impl Restrictions {
	/// Merges in restriction flags; entries mapped to `false` are
	/// ignored. Returns whether any flag is newly set, which is the
	/// caller's cue to invalidate cached resolutions.
	pub(crate) fn activate<I, S>(&mut self, flags: I) -> bool
	where
		I: IntoIterator<Item = (S, bool)>,
		S: Into<Box<str>>,
	{
		let mut added = false;
		for (name, restricted) in flags {
			if restricted {
				added |= self.flags.insert(name.into());
			}
		}
		self.active |= added;
		added
	}

	/// Whether the home root is hidden for this exact query.
	pub(crate) fn is_restricted(&self, ty: &str, rel_path: &str) -> bool {
		self.type_restricted(ty) || (ty == "data" && self.data_subpath_restricted(rel_path))
	}

	/// Type-level check only (`all` or the bare type name). This is the
	/// cacheable tier; sub-path flags are checked separately.
	pub(crate) fn type_restricted(&self, ty: &str) -> bool {
		self.active && (self.flags.contains("all") || self.flags.contains(ty))
	}

	/// Whether a `data_<subdir>` flag matches the first segment of
	/// `rel_path`. Results depending on this are never cached.
	pub(crate) fn data_subpath_restricted(&self, rel_path: &str) -> bool {
		if !self.active || rel_path.is_empty() {
			return false;
		}
		let first = rel_path.split('/').next().unwrap_or(rel_path);
		self.flags.contains(format!("data_{first}").as_str())
	}
}
