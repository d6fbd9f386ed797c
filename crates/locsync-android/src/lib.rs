//! Android localization: merges locale string maps into the native
//! resource tree's `strings.xml` files.

pub mod folders;
pub mod strings_xml;
pub mod update;

pub use folders::resource_folders;
pub use strings_xml::{
    parse_strings_xml, read_strings_file, render_strings_xml, write_strings_file,
};
pub use update::{AndroidReport, android_res_dir, update_android};
