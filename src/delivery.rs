//! Delivery URL construction
//!
//! Builds Cloudinary delivery URLs of the shape
//! `<host>/<cloud>/<image|video>/upload/<directives>/<public_id>`.
//! Everything here is a pure string computation: nothing is validated and
//! nothing touches the network, so malformed ids or values surface only when
//! the CDN is asked for them.

use crate::models::AssetKind;
use std::fmt::Display;

pub const DEFAULT_DELIVERY_HOST: &str = "https://res.cloudinary.com";

pub const DEFAULT_QUALITY: &str = "auto:good";
pub const DEFAULT_FORMAT: &str = "auto";
pub const DEFAULT_WIDTH: &str = "auto";
pub const DEFAULT_CROP: &str = "scale";

/// Recognized options, their directive prefix and default, in emission order.
const IMAGE_DIRECTIVES: &[(&str, &str, &str)] = &[
    ("quality", "q", DEFAULT_QUALITY),
    ("format", "f", DEFAULT_FORMAT),
    ("width", "w", DEFAULT_WIDTH),
    ("crop", "c", DEFAULT_CROP),
];

const VIDEO_DIRECTIVES: &[(&str, &str, &str)] = &[
    ("quality", "q", DEFAULT_QUALITY),
    ("format", "f", DEFAULT_FORMAT),
    ("width", "w", DEFAULT_WIDTH),
];

/// Insertion-ordered transformation options.
///
/// Setting a key that is already present replaces its value without moving
/// it, so extras keep the position they were first given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOptions {
    entries: Vec<(String, String)>,
}

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quality(self, value: impl Display) -> Self {
        self.set("quality", value)
    }

    pub fn format(self, value: impl Display) -> Self {
        self.set("format", value)
    }

    pub fn width(self, value: impl Display) -> Self {
        self.set("width", value)
    }

    pub fn crop(self, value: impl Display) -> Self {
        self.set("crop", value)
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for TransformOptions
where
    K: Into<String>,
    V: Display,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = TransformOptions::new();
        for (key, value) in iter {
            options.insert(key, value);
        }
        options
    }
}

/// Ordered directive list for `kind`: recognized options with their defaults
/// first, then every other option as `key_value` in insertion order.
pub fn directives(kind: AssetKind, options: &TransformOptions) -> Vec<String> {
    let recognized = match kind {
        AssetKind::Image => IMAGE_DIRECTIVES,
        AssetKind::Video => VIDEO_DIRECTIVES,
    };

    let mut out: Vec<String> = recognized
        .iter()
        .map(|(name, prefix, default)| {
            format!("{}_{}", prefix, options.get(name).unwrap_or(*default))
        })
        .collect();

    out.extend(
        options
            .iter()
            .filter(|(key, _)| !recognized.iter().any(|(name, _, _)| name == key))
            .map(|(key, value)| format!("{}_{}", key, value)),
    );

    out
}

/// Builds delivery URLs for one CDN account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryUrlBuilder {
    base_url: String,
}

impl DeliveryUrlBuilder {
    pub fn new(cloud_name: &str) -> Self {
        Self::with_host(DEFAULT_DELIVERY_HOST, cloud_name)
    }

    pub fn with_host(host: &str, cloud_name: &str) -> Self {
        Self {
            base_url: format!("{}/{}", host.trim_end_matches('/'), cloud_name),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, kind: AssetKind, public_id: &str, options: &TransformOptions) -> String {
        format!(
            "{}/{}/upload/{}/{}",
            self.base_url,
            kind.resource_type(),
            directives(kind, options).join(","),
            public_id
        )
    }

    pub fn image_url(&self, public_id: &str, options: &TransformOptions) -> String {
        self.url(AssetKind::Image, public_id, options)
    }

    pub fn video_url(&self, public_id: &str, options: &TransformOptions) -> String {
        self.url(AssetKind::Video, public_id, options)
    }
}
