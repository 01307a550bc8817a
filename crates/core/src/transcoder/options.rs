//! Open-ended conversion options passed through to transcoders.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration bag for a single conversion.
///
/// The orchestrator never looks inside; transcoders read the keys they
/// understand through the typed accessors. Keys are accepted in snake_case and
/// camelCase (`maintain_aspect_ratio` / `maintainAspectRatio`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversionOptions(Map<String, Value>);

impl ConversionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a key, returning the updated bag.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Parses options from a JSON object string.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn lookup(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|k| self.0.get(*k))
    }

    /// Lossy-encoder quality in `0.0..=1.0`.
    ///
    /// Values above 1 are read as percentages.
    pub fn quality(&self) -> Option<f32> {
        let q = self.lookup(&["quality"])?.as_f64()? as f32;
        let q = if q > 1.0 { q / 100.0 } else { q };
        Some(q.clamp(0.0, 1.0))
    }

    pub fn width(&self) -> Option<u32> {
        self.dimension(&["width"])
    }

    pub fn height(&self) -> Option<u32> {
        self.dimension(&["height"])
    }

    fn dimension(&self, keys: &[&str]) -> Option<u32> {
        let value = self.lookup(keys)?.as_u64()?;
        u32::try_from(value).ok().filter(|v| *v > 0)
    }

    pub fn maintain_aspect_ratio(&self) -> bool {
        self.lookup(&["maintain_aspect_ratio", "maintainAspectRatio"])
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Audio bitrate in kbps, from `128`, `"128"` or `"128k"`.
    pub fn bitrate_kbps(&self) -> Option<u32> {
        match self.lookup(&["bitrate", "bitrate_kbps", "bitrateKbps"])? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s
                .trim()
                .trim_end_matches(['k', 'K'])
                .parse::<u32>()
                .ok(),
            _ => None,
        }
    }

    pub fn compression_level(&self) -> Option<u8> {
        let level = self
            .lookup(&["compression_level", "compressionLevel"])?
            .as_u64()?;
        u8::try_from(level).ok()
    }

    /// Field delimiter for tabular documents, as given.
    pub fn delimiter(&self) -> Option<&str> {
        self.lookup(&["delimiter"])?.as_str()
    }

    /// Whether the first CSV row names the columns. Defaults to true.
    pub fn include_header(&self) -> bool {
        self.lookup(&["include_header", "includeHeader"])
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    pub fn minify(&self) -> bool {
        self.lookup(&["minify"]).and_then(Value::as_bool).unwrap_or(false)
    }
}

impl From<Map<String, Value>> for ConversionOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
