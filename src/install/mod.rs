//! Installation into, and removal from, an install scheme.

pub mod record;
pub mod uninstall;
pub mod wheel;

pub use record::record_legacy_install;
pub use uninstall::{find_installed, uninstall_distribution, uninstall_egg_link, InstalledDist};
pub use wheel::{install_wheel, parse_entry_points, EntryPoint, INSTALLER};
