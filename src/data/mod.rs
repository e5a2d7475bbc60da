pub mod config_file;
pub mod export_csv;
pub mod people;
pub mod validate;
