use serde::{Deserialize, Deserializer};

/// How an [`Emitter`](super::Emitter) writes a response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Body read size. `None` writes the whole body at once and ignores
    /// `Content-Range`. Zero is read as `None`.
    #[serde(deserialize_with = "non_zero_length")]
    pub buffer_length: Option<usize>,
    /// Refuse to emit a second response through the same emitter.
    pub strict: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self { buffer_length: None, strict: true }
    }
}

fn non_zero_length<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<usize>::deserialize(deserializer)?.filter(|length| *length > 0))
}

impl EmitterConfig {
    pub fn with_buffer_length(mut self, buffer_length: usize) -> Self {
        self.buffer_length = (buffer_length > 0).then_some(buffer_length);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_with_defaults() {
        let config: EmitterConfig = serde_json::from_str(r#"{"buffer_length": 4096}"#).unwrap();
        assert_eq!(config, EmitterConfig { buffer_length: Some(4096), strict: true });

        let config: EmitterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EmitterConfig::default());
    }

    #[test]
    fn zero_buffer_means_unbuffered() {
        assert_eq!(EmitterConfig::default().with_buffer_length(0).buffer_length, None);
        assert_eq!(EmitterConfig::default().with_buffer_length(8).buffer_length, Some(8));

        let config: EmitterConfig = serde_json::from_str(r#"{"buffer_length": 0}"#).unwrap();
        assert_eq!(config.buffer_length, None);

        let config: EmitterConfig = serde_json::from_str(r#"{"buffer_length": null, "strict": false}"#).unwrap();
        assert_eq!(config, EmitterConfig { buffer_length: None, strict: false });
    }
}
