/// Database connection and table creation
pub mod database;

/// Settings loading from travel.toml and the environment
pub mod settings;
