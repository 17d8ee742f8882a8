pub mod toml_loader;

pub use toml_loader::{load_contest_from_toml, parse_contest_toml};
