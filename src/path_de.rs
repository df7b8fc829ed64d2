use serde::de::DeserializeOwned;

use crate::error::CatalogError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(
    src: &str,
    origin: &str,
) -> Result<T, CatalogError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let json_path = err.path().to_string();
        CatalogError::Parse {
            origin: origin.to_string(),
            json_path,
            message: err.into_inner().to_string(),
        }
    })
}
