pub mod credentials;

pub use credentials::{ load_api_key, ConfigError };
