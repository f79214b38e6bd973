pub mod fs;

pub use fs::{find_files, find_files_with_extension, move_file, remove_dir_all_if_exists, remove_file_if_exists};
