//! Glob-aware file enumeration under the resolved directories of a
//! resource type.
//!
//! A filter like `oxygen/*/apps/*.png` is split into a directory
//! portion and a filename portion. The directory portion is walked
//! segment by segment under every candidate root; segments without a
//! wildcard are descended into directly, wildcard segments fan out over
//! a directory listing. The filename portion then selects regular files
//! in the final directories, optionally recursing below them.

use std::fs;
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use globset::{GlobBuilder, GlobMatcher};
use rustc_hash::FxHashSet;
use tracing::warn;

use crate::service::ResourceDirs;

bitflags! {
	/// Options for [`ResourceDirs::find_all`].
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct SearchOptions: u8 {
		/// Also collect matching files from every subdirectory below
		/// the directories selected by the filter.
		const RECURSIVE = 1 << 0;
		/// Keep only the first file found for each root-relative path,
		/// so a local root hides the same file in more global roots.
		const NO_DUPLICATES = 1 << 1;
	}
}

/// A single path segment or filename pattern.
///
/// Wildcard-free patterns stay literal so a lookup can be one metadata
/// call instead of a directory listing.
enum FilePattern {
	Literal(String),
	Glob(GlobMatcher),
	/// A pattern that failed to compile matches nothing.
	Never,
}

impl FilePattern {
	fn new(pattern: &str) -> Self {
		if !pattern.contains(['*', '?']) {
			return FilePattern::Literal(pattern.to_string());
		}
		match GlobBuilder::new(pattern).literal_separator(true).build() {
			Ok(glob) => FilePattern::Glob(glob.compile_matcher()),
			Err(error) => {
				warn!(pattern, %error, "unusable wildcard pattern, it will match nothing");
				FilePattern::Never
			}
		}
	}

	fn matches(&self, name: &str) -> bool {
		match self {
			FilePattern::Literal(literal) => literal == name,
			FilePattern::Glob(matcher) => matcher.is_match(name),
			FilePattern::Never => false,
		}
	}

	fn as_literal(&self) -> Option<&str> {
		match self {
			FilePattern::Literal(literal) => Some(literal),
			_ => None,
		}
	}
}

/// Directory kind and file kind of one directory entry, following
/// symlinks the way the walk needs.
fn entry_kinds(entry: &fs::DirEntry, path: &Path) -> (bool, bool) {
	match entry.file_type() {
		Ok(kind) if !kind.is_symlink() => (kind.is_dir(), kind.is_file()),
		_ => match fs::metadata(path) {
			Ok(meta) => (meta.is_dir(), meta.is_file()),
			Err(_) => (false, false),
		},
	}
}

/// Reads a directory into a name-sorted entry list, so one call walks a
/// stable order and never re-reads a directory mid-walk.
fn sorted_entries(dir: &Path) -> Vec<fs::DirEntry> {
	let Ok(reader) = fs::read_dir(dir) else {
		return Vec::new();
	};
	let mut entries: Vec<fs::DirEntry> = reader.filter_map(Result::ok).collect();
	entries.sort_by_key(fs::DirEntry::file_name);
	entries
}

struct Walk {
	pattern: FilePattern,
	recursive: bool,
	unique: bool,
	found: Vec<PathBuf>,
	relative: Vec<String>,
	seen: FxHashSet<String>,
}

impl Walk {
	fn new(pattern: FilePattern, options: SearchOptions) -> Self {
		Self {
			pattern,
			recursive: options.contains(SearchOptions::RECURSIVE),
			unique: options.contains(SearchOptions::NO_DUPLICATES),
			found: Vec::new(),
			relative: Vec::new(),
			seen: FxHashSet::default(),
		}
	}

	fn record(&mut self, path: PathBuf, relative: String) {
		if self.unique && !self.seen.insert(relative.clone()) {
			return;
		}
		self.found.push(path);
		self.relative.push(relative);
	}

	/// Collects matching regular files in `dir` (and below it when
	/// recursive). `rel_part` is the path walked so far, relative to
	/// the candidate root.
	fn lookup_directory(&mut self, dir: &Path, rel_part: &str) {
		if !self.recursive {
			if let Some(name) = self.pattern.as_literal() {
				// Just one file to check for, no listing needed.
				let name = name.to_string();
				let path = dir.join(&name);
				if path.is_file() {
					self.record(path, format!("{rel_part}{name}"));
				}
				return;
			}
		}

		for entry in sorted_entries(dir) {
			let name = entry.file_name().to_string_lossy().into_owned();
			if name.ends_with('~') {
				continue;
			}
			let path = entry.path();
			let (is_dir, is_file) = entry_kinds(&entry, &path);
			if self.recursive && is_dir {
				self.lookup_directory(&path, &format!("{rel_part}{name}/"));
			}
			if !self.pattern.matches(&name) {
				continue;
			}
			if is_file {
				self.record(path, format!("{rel_part}{name}"));
			}
		}
	}

	/// Walks the directory portion of the filter below `prefix`,
	/// consuming `rel_path` segment by segment, then hands the final
	/// directories to [`lookup_directory`](Self::lookup_directory).
	fn lookup_prefix(&mut self, prefix: &Path, rel_path: &str, rel_part: &str) {
		if rel_path.is_empty() {
			self.lookup_directory(prefix, rel_part);
			return;
		}
		let (segment, rest) = match rel_path.split_once('/') {
			Some(parts) => parts,
			None => (rel_path, ""),
		};
		if segment.is_empty() {
			self.lookup_prefix(prefix, rest, rel_part);
			return;
		}

		if segment.contains(['*', '?']) {
			let segment_pattern = FilePattern::new(segment);
			for entry in sorted_entries(prefix) {
				let name = entry.file_name().to_string_lossy().into_owned();
				if name.ends_with('~') || !segment_pattern.matches(&name) {
					continue;
				}
				let path = entry.path();
				let (is_dir, _) = entry_kinds(&entry, &path);
				if is_dir {
					self.lookup_prefix(&path, rest, &format!("{rel_part}{name}/"));
				}
			}
		} else {
			// Wildcard-free segment: descend without listing. If the
			// directory does not exist the final read_dir finds out.
			self.lookup_prefix(&prefix.join(segment), rest, &format!("{rel_part}{segment}/"));
		}
	}
}

impl ResourceDirs {
	/// Enumerates every file matching `filter` under the resolved
	/// directories of `ty`, most local root first.
	///
	/// The portion of `filter` after the last `/` is the filename
	/// pattern (empty means `*`); the portion before it is a relative
	/// directory path whose segments may themselves contain `*` or `?`.
	/// An absolute `filter` ignores `ty` and walks from the filesystem
	/// root instead.
	pub fn find_all(&self, ty: &str, filter: &str, options: SearchOptions) -> Vec<PathBuf> {
		self.run_search(ty, filter, options).found
	}

	/// Like [`find_all`](Self::find_all), but pairs every match with
	/// its path relative to the candidate root it was found under.
	pub fn find_all_with_relative(
		&self,
		ty: &str,
		filter: &str,
		options: SearchOptions,
	) -> Vec<(PathBuf, String)> {
		let walk = self.run_search(ty, filter, options);
		walk.found.into_iter().zip(walk.relative).collect()
	}

	fn run_search(&self, ty: &str, filter: &str, options: SearchOptions) -> Walk {
		let (mut filter_path, filter_file) = match filter.rfind('/') {
			Some(slash) => (&filter[..slash + 1], &filter[slash + 1..]),
			None => ("", filter),
		};

		let candidates = if Path::new(filter).is_absolute() {
			filter_path = filter_path.trim_start_matches('/');
			vec![PathBuf::from("/")]
		} else {
			self.candidates(ty, filter)
		};

		let file_pattern = if filter_file.is_empty() {
			FilePattern::new("*")
		} else {
			FilePattern::new(filter_file)
		};

		let mut walk = Walk::new(file_pattern, options);
		for candidate in candidates {
			walk.lookup_prefix(&candidate, filter_path, "");
		}
		walk
	}
}
