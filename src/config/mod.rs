//! Configuration module for Polk-Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use polk_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("polk.toml")).unwrap();
//! println!("Crawler will stop after {} images", config.crawler.max_items);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig, SelectorConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
