use std::path::Path;
use serde::de::DeserializeOwned;
use crate::error::ConfigError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(origin: &str, src: &str) -> Result<T, ConfigError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let json_path = err.path().to_string();
        ConfigError::Parse {
            origin: origin.to_string(),
            json_path,
            message: err.into_inner().to_string(),
        }
    })
}

pub fn from_file_with_path<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let origin = path.to_string_lossy().to_string();
    let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: origin.clone(),
        source,
    })?;
    from_str_with_path(&origin, &src)
}
