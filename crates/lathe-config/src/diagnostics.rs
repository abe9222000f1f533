use serde::de::DeserializeOwned;

/// Diagnostics produced while loading and validating a Lathe config.
///
/// Loading is best effort: callers always get a `LatheConfig` when
/// deserialization succeeds, plus the issues found along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    /// Keys present in the input that the config schema does not know, as
    /// dotted paths (`relations.namming`).
    pub unknown_keys: Vec<String>,
    pub warnings: Vec<ConfigWarning>,
}

impl ConfigDiagnostics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unknown_keys.is_empty() && self.warnings.is_empty()
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `logging.level` is neither a level nor a valid filter directive.
    LoggingLevelInvalid { value: String },
    InvalidValue { toml_path: String, message: String },
}

pub(crate) fn deserialize_toml_with_unknown_keys<T: DeserializeOwned>(
    text: &str,
) -> Result<(T, Vec<String>), toml::de::Error> {
    let mut unknown = Vec::<String>::new();
    let deserializer = toml::de::Deserializer::new(text);
    let value = serde_ignored::deserialize(deserializer, |path| {
        unknown.push(path.to_string().trim_start_matches('.').to_string());
    })?;
    unknown.sort();
    unknown.dedup();
    Ok((value, unknown))
}
