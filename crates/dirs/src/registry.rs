//! Resource type registry: relative suffix templates and directly
//! registered absolute directories, keyed by type name.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::pools::RootPool;

/// Picks the root pool for a type from its naming convention.
pub(crate) fn pool_for_type(ty: &str) -> RootPool {
	if ty.starts_with("xdgdata-") {
		RootPool::XdgData
	} else if ty.starts_with("xdgconf-") {
		RootPool::XdgConfig
	} else {
		RootPool::Primary
	}
}

/// One relative suffix registered for a resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Template {
	/// Plain suffix, appended to every root of the type's pool.
	Literal(String),
	/// `%base/rest` indirection: resolve `base` first, then append
	/// `rest` to each of its directories.
	Indirect { base: String, rest: String },
}

impl Template {
	/// Parses the stored template form. A leading `%` marks an
	/// indirection; the text up to the first `/` names the base type.
	fn parse(raw: &str) -> Self {
		if let Some(stripped) = raw.strip_prefix('%') {
			let (base, rest) = match stripped.split_once('/') {
				Some((base, rest)) => (base, rest),
				None => (stripped, ""),
			};
			Template::Indirect {
				base: base.to_string(),
				rest: rest.trim_end_matches('/').to_string(),
			}
		} else {
			Template::Literal(raw.trim_end_matches('/').to_string())
		}
	}
}

/// An explicitly registered absolute directory for a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AbsoluteDir {
	pub(crate) path: PathBuf,
	/// Priority absolutes are emitted ahead of root-derived entries.
	pub(crate) priority: bool,
}

/// Per-type template and absolute-directory lists.
///
/// Template lists keep priority entries at the front, so resolution
/// walks them highest-priority-first. The save location uses the last
/// (lowest priority) entry.
#[derive(Debug, Default)]
pub(crate) struct TypeRegistry {
	relatives: FxHashMap<Box<str>, Vec<Template>>,
	absolutes: FxHashMap<Box<str>, Vec<AbsoluteDir>>,
}

impl TypeRegistry {
	/// Registers a relative template for `ty`. With a base type the
	/// template becomes the `%basetype/relpath` indirection form.
	///
	/// Returns false if an identical template was already registered.
	pub(crate) fn add_template(
		&mut self,
		ty: &str,
		basetype: Option<&str>,
		relpath: &str,
		priority: bool,
	) -> bool {
		if relpath.is_empty() {
			return false;
		}
		let raw = match basetype {
			Some(base) => format!("%{base}/{relpath}"),
			None => relpath.to_string(),
		};
		let template = Template::parse(&raw);

		let rels = self.relatives.entry(Box::from(ty)).or_default();
		if rels.contains(&template) {
			return false;
		}
		if priority {
			rels.insert(0, template);
		} else {
			rels.push(template);
		}
		true
	}

	/// Registers an absolute directory for `ty`.
	///
	/// Returns false if the directory was already registered.
	pub(crate) fn add_absolute_dir(&mut self, ty: &str, path: PathBuf, priority: bool) -> bool {
		if ty.is_empty() || path.as_os_str().is_empty() {
			return false;
		}
		let dirs = self.absolutes.entry(Box::from(ty)).or_default();
		if dirs.iter().any(|dir| dir.path == path) {
			return false;
		}
		let entry = AbsoluteDir { path, priority };
		if priority {
			dirs.insert(0, entry);
		} else {
			dirs.push(entry);
		}
		true
	}

	pub(crate) fn templates(&self, ty: &str) -> &[Template] {
		self.relatives.get(ty).map_or(&[], Vec::as_slice)
	}

	pub(crate) fn absolutes(&self, ty: &str) -> &[AbsoluteDir] {
		self.absolutes.get(ty).map_or(&[], Vec::as_slice)
	}

	/// Every registered type key, sorted.
	pub(crate) fn types(&self) -> Vec<String> {
		let mut types: Vec<String> = self
			.relatives
			.keys()
			.chain(self.absolutes.keys())
			.map(|key| key.to_string())
			.collect();
		types.sort();
		types.dedup();
		types
	}
}
