//! Asset delivery tooling for the Lumen lighting site
//!
//! Builds Cloudinary delivery URLs for the site's images and videos, and
//! pushes the local asset set to Cloudinary in one sequential, throttled run.

pub mod app;
pub mod cdn;
pub mod delivery;
pub mod error;
pub mod manifest;
pub mod models;
pub mod report;

pub use error::{Error, Result};
