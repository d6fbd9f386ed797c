//! iOS localization: generates `<locale>.lproj/InfoPlist.strings` files,
//! maintains `Info.plist`, and keeps the Xcode project graph in sync.

pub mod discovery;
pub mod plist;
pub mod strings;
pub mod update;

pub use discovery::{IosProjectPaths, locate_ios_project};
pub use plist::{PlistDict, PlistValue, parse_plist, read_plist, render_plist, write_plist};
pub use strings::{parse_strings, read_strings_file, render_strings};
pub use update::{IosReport, PlistMode, update_ios};
