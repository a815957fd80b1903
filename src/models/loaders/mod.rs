pub mod source_loader;
pub mod toml_loader;

pub use source_loader::load_sources;
pub use toml_loader::load_naming_config;
