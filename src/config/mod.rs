//! Configuration module
//!
//! Loads, parses and validates the TOML configuration. Every section has
//! defaults, so an empty file (or `Config::default()`) is a usable config.
//!
//! # Example
//!
//! ```no_run
//! use dealer_locator::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("dealer-locator.toml")).unwrap();
//! println!("Deep crawl bound: {}", config.discovery.max_pages);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    BrandEntry, Config, DiscoveryConfig, FetcherConfig, GroupProfile, PathsConfig, ResolvedPaths,
    TaxonomyConfig, DEFAULT_API_PATHS, DEFAULT_DIRECTORY_PATHS, DEFAULT_RENDERED_PATHS,
    DEFAULT_SITEMAP_PATHS,
};

pub use parser::load_config;
