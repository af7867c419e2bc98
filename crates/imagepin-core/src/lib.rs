//! Core types and configuration for imagepin.
//!
//! This crate defines the `imagepin.toml` schema ([`ImagepinConfig`]),
//! the [`ParameterSet`] handed to the template patcher, image references,
//! and shared error types.

pub mod config;
pub mod error;
pub mod image;
pub mod params;

pub use config::{ImageConfig, ImagepinConfig, ProjectConfig, TemplateConfig};
pub use error::{Error, Result};
pub use image::ImageRef;
pub use params::ParameterSet;
