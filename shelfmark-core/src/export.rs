//! JSON import/export of the whole catalog.

use serde_json::Value;

use crate::error::{ImportError, LibraryError};
use crate::model::Catalog;

/// File name offered for catalog exports
pub const EXPORT_FILE_NAME: &str = "library.json";

/// Serialize the catalog in its persisted shape (a JSON array of books)
pub fn to_json(catalog: &Catalog) -> serde_json::Result<String> {
    serde_json::to_string_pretty(catalog)
}

/// Parse an imported document into a catalog without touching any state
pub fn parse_catalog(json: &str) -> Result<Catalog, LibraryError> {
    let value: Value = serde_json::from_str(json).map_err(ImportError::Parse)?;
    if !value.is_array() {
        return Err(ImportError::NotAnArray.into());
    }
    let catalog: Catalog = serde_json::from_value(value).map_err(ImportError::Shape)?;
    catalog.check_ids()?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_export_uses_persisted_field_names() {
        let catalog = parse_catalog(
            r#"[{"id":"1","title":"T","author":"A","pages":120,
                "annotations":[{"id":"2","page":3,"type":"question","text":"why"}]}]"#,
        )
        .unwrap();
        let json = to_json(&catalog).unwrap();

        assert!(json.contains("\"type\": \"question\""));
        assert!(json.contains("\"pages\": 120"));
        assert!(json.contains("\"annotations\""));
    }

    #[test]
    fn test_object_document_is_rejected() {
        let err = parse_catalog(r#"{"books":[]}"#).unwrap_err();
        assert!(matches!(err, LibraryError::Import(ImportError::NotAnArray)));
        assert_eq!(err.user_message(), "Invalid JSON file.");
    }

    #[test]
    fn test_malformed_document_is_a_parse_error() {
        let err = parse_catalog("[{").unwrap_err();
        assert!(matches!(err, LibraryError::Import(ImportError::Parse(_))));
        assert_eq!(err.user_message(), "Could not read the JSON file.");
    }

    #[test]
    fn test_wrong_record_shape() {
        let err = parse_catalog(r#"[{"title":"no id"}]"#).unwrap_err();
        assert!(matches!(err, LibraryError::Import(ImportError::Shape(_))));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = parse_catalog(
            r#"[{"id":"1","title":"a","author":"b"},{"id":"1","title":"c","author":"d"}]"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LibraryError::Validation(ValidationError::DuplicateBookId(_))
        ));
    }

    #[test]
    fn test_empty_array_is_an_empty_catalog() {
        assert!(parse_catalog("[]").unwrap().is_empty());
    }
}
