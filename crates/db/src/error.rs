use mongodb::bson::oid::ObjectId;
use thiserror::Error;

/// Failures raised by the document store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The identifier is not a well-formed ObjectId.
    #[error("Cast to ObjectId failed for value \"{value}\"")]
    InvalidId { value: String },

    /// The document was rejected before being written.
    #[error("{0}")]
    Invalid(String),

    /// A save targeted a document that no longer exists.
    #[error("No document found for id \"{0}\"")]
    DocumentNotFound(String),

    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),
}

impl StoreError {
    /// Stable error kind reported to API clients.
    pub fn name(&self) -> &'static str {
        match self {
            StoreError::InvalidId { .. } => "CastError",
            StoreError::Invalid(_) => "ValidationError",
            StoreError::DocumentNotFound(_) => "DocumentNotFoundError",
            StoreError::Driver(_) => "MongoError",
        }
    }
}

/// Parse a path identifier into an ObjectId.
pub fn parse_object_id(value: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(value).map_err(|_| StoreError::InvalidId {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_object_ids() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn malformed_ids_are_cast_errors() {
        let err = parse_object_id("not-an-id").unwrap_err();
        assert_eq!(err.name(), "CastError");
        assert_eq!(
            err.to_string(),
            "Cast to ObjectId failed for value \"not-an-id\""
        );
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let err = StoreError::Invalid("title: Path `title` is required.".to_string());
        assert_eq!(err.name(), "ValidationError");
        assert_eq!(err.to_string(), "title: Path `title` is required.");
    }
}
