//! Start-up wiring: the configuration boundary and the built-in
//! resource type table.
//!
//! How the fields of [`DirsConfig`] get populated (environment
//! variables, config files, command line) is the caller's business;
//! this crate only consumes the resulting paths.

use std::path::PathBuf;

use crate::pools::RootPool;
use crate::service::ResourceDirs;

/// Search roots and restriction flags gathered by the embedding
/// application before the service is built.
///
/// The first entry of each group is the writable one. Empty paths are
/// ignored, so unset optional roots can stay `PathBuf::new()`.
#[derive(Debug, Clone, Default)]
pub struct DirsConfig {
	/// Writable home root of the primary pool.
	pub home_root: PathBuf,
	/// Read-only installation roots, highest priority first.
	pub install_roots: Vec<PathBuf>,
	/// Writable XDG config root.
	pub xdg_config_home: PathBuf,
	/// System XDG config roots.
	pub xdg_config_roots: Vec<PathBuf>,
	/// Writable XDG data root.
	pub xdg_data_home: PathBuf,
	/// System XDG data roots.
	pub xdg_data_roots: Vec<PathBuf>,
	/// Restriction flags; entries mapped to `false` are ignored.
	pub restrictions: Vec<(String, bool)>,
}

/// Built-in resource types: `(type, basetype, relative suffix)`.
const DEFAULT_TYPES: &[(&str, Option<&str>, &str)] = &[
	("config", None, "share/config/"),
	("data", None, "share/apps/"),
	("html", None, "share/doc/HTML/"),
	("icon", None, "share/icons/"),
	("pixmap", None, "share/pixmaps/"),
	("sound", None, "share/sounds/"),
	("locale", None, "share/locale/"),
	("services", None, "share/services/"),
	("servicetypes", None, "share/servicetypes/"),
	("wallpaper", None, "share/wallpapers/"),
	("templates", None, "share/templates/"),
	("emoticons", None, "share/emoticons/"),
	// Merged: XDG autostart entries plus the application-specific ones.
	("autostart", None, "share/autostart/"),
	("autostart", Some("xdgconf-autostart"), "/"),
	("lib", None, "lib/"),
	("module", Some("lib"), "modules/"),
	("cgi", None, "cgi-bin/"),
	("xdgdata-apps", None, "applications/"),
	("xdgdata-icon", None, "icons/"),
	("xdgdata-pixmap", None, "pixmaps/"),
	("xdgdata-dirs", None, "desktop-directories/"),
	("xdgdata-mime", None, "mime/"),
	("xdgconf-menu", None, "menus/"),
	("xdgconf-autostart", None, "autostart/"),
];

impl ResourceDirs {
	/// Builds a service from gathered start-up inputs: seeds the three
	/// root pools, installs the built-in type table and activates the
	/// configured restrictions.
	pub fn from_config(config: DirsConfig) -> Self {
		let mut dirs = Self::new();

		dirs.add_root(RootPool::Primary, config.home_root, false);
		for root in config.install_roots {
			dirs.add_root(RootPool::Primary, root, false);
		}

		dirs.add_root(RootPool::XdgConfig, config.xdg_config_home, false);
		for root in config.xdg_config_roots {
			dirs.add_root(RootPool::XdgConfig, root, false);
		}

		dirs.add_root(RootPool::XdgData, config.xdg_data_home, false);
		for root in config.xdg_data_roots {
			dirs.add_root(RootPool::XdgData, root, false);
		}

		dirs.install_default_types();
		dirs.activate_restrictions(config.restrictions);
		dirs
	}

	/// Registers the built-in type table. Already-registered templates
	/// are left alone, so calling this after custom registrations is
	/// harmless.
	pub fn install_default_types(&mut self) {
		for &(ty, basetype, relpath) in DEFAULT_TYPES {
			self.add_template(ty, basetype, relpath, true);
		}
	}
}
