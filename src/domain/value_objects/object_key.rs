use crate::domain::errors::ValidationError;

const MAX_OBJECT_KEY_LEN: usize = 1024;

/// A validated object key (path) within a bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validate and wrap an object key
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        if value.len() > MAX_OBJECT_KEY_LEN {
            return Err(ValidationError::ObjectKeyTooLong {
                actual: value.len(),
                max: MAX_OBJECT_KEY_LEN,
            });
        }

        if let Some(c) = value.chars().find(|c| c.is_ascii_control()) {
            return Err(ValidationError::InvalidObjectKeyCharacter(c));
        }

        if value.starts_with('/') {
            return Err(ValidationError::ObjectKeyStartsWithSlash);
        }

        if value.ends_with('/') {
            return Err(ValidationError::ObjectKeyEndsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::ObjectKeyContainsDoubleSlash);
        }

        if value.split('/').any(|segment| segment == "." || segment == "..") {
            return Err(ValidationError::ObjectKeyRelativeSegment);
        }

        Ok(Self(value))
    }

    /// Build the key an upload is stored under: `"{prefix}/{file_name}"`.
    ///
    /// The join is literal. A file name containing `/` adds path segments,
    /// and the joined result must still pass [`ObjectKey::new`].
    pub fn from_upload(prefix: &str, file_name: &str) -> Result<Self, ValidationError> {
        Self::new(format!("{}/{}", prefix, file_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything after the last '/'
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or(&self.0, |idx| &self.0[idx + 1..])
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ObjectKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_object_key() {
        assert!(ObjectKey::new("file.txt").is_ok());
        assert!(ObjectKey::new("docs/a.txt").is_ok());
        assert!(ObjectKey::new("deep/folder/structure/file.txt").is_ok());
        assert!(ObjectKey::new("dotted..name.txt").is_ok());
    }

    #[test]
    fn test_invalid_object_key() {
        assert_eq!(ObjectKey::new(""), Err(ValidationError::EmptyObjectKey));
        assert_eq!(
            ObjectKey::new("/leading-slash"),
            Err(ValidationError::ObjectKeyStartsWithSlash)
        );
        assert_eq!(
            ObjectKey::new("trailing/"),
            Err(ValidationError::ObjectKeyEndsWithSlash)
        );
        assert_eq!(
            ObjectKey::new("double//slash"),
            Err(ValidationError::ObjectKeyContainsDoubleSlash)
        );
        assert_eq!(
            ObjectKey::new("null\0byte"),
            Err(ValidationError::InvalidObjectKeyCharacter('\0'))
        );
        assert_eq!(
            ObjectKey::new("tab\there"),
            Err(ValidationError::InvalidObjectKeyCharacter('\t'))
        );
        assert!(ObjectKey::new("x".repeat(1025)).is_err());
    }

    #[test]
    fn test_reserved_url_characters_are_allowed() {
        for raw in ["docs/report#1.txt", "docs/100%.txt", "a[1]/b{2}~c.txt"] {
            assert_eq!(ObjectKey::new(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn test_relative_segments_rejected() {
        assert_eq!(
            ObjectKey::new("docs/../secrets.txt"),
            Err(ValidationError::ObjectKeyRelativeSegment)
        );
        assert_eq!(
            ObjectKey::new("./a.txt"),
            Err(ValidationError::ObjectKeyRelativeSegment)
        );
    }

    #[test]
    fn test_from_upload_joins_prefix_and_name() {
        let key = ObjectKey::from_upload("docs", "a.txt").unwrap();
        assert_eq!(key.as_str(), "docs/a.txt");
        assert_eq!(key.file_name(), "a.txt");

        let nested = ObjectKey::from_upload("docs", "sub/b.txt").unwrap();
        assert_eq!(nested.as_str(), "docs/sub/b.txt");
    }

    #[test]
    fn test_from_upload_rejects_unsafe_names() {
        assert!(ObjectKey::from_upload("", "a.txt").is_err());
        assert!(ObjectKey::from_upload("docs", "").is_err());
        assert!(ObjectKey::from_upload("docs", "../escape.txt").is_err());
    }
}
