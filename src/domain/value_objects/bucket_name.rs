use crate::domain::errors::ValidationError;

const MIN_BUCKET_NAME_LEN: usize = 3;
const MAX_BUCKET_NAME_LEN: usize = 63;

/// A bucket name that satisfies S3 naming rules
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketName(String);

impl BucketName {
    /// Validate and wrap a bucket name
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.len() < MIN_BUCKET_NAME_LEN {
            return Err(ValidationError::BucketNameTooShort {
                actual: value.len(),
                min: MIN_BUCKET_NAME_LEN,
            });
        }

        if value.len() > MAX_BUCKET_NAME_LEN {
            return Err(ValidationError::BucketNameTooLong {
                actual: value.len(),
                max: MAX_BUCKET_NAME_LEN,
            });
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
        {
            return Err(ValidationError::BucketNameInvalidCharacter(c));
        }

        if value.starts_with('-') {
            return Err(ValidationError::BucketNameInvalidStart);
        }

        if value.ends_with('-') {
            return Err(ValidationError::BucketNameInvalidEnd);
        }

        if value.contains("--") {
            return Err(ValidationError::BucketNameConsecutiveHyphens);
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for BucketName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for BucketName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bucket_names() {
        assert!(BucketName::new("b1b").is_ok());
        assert!(BucketName::new("uploads").is_ok());
        assert!(BucketName::new("123bucket").is_ok());
        assert!(BucketName::new("team-a-uploads-2024").is_ok());
    }

    #[test]
    fn test_length_limits() {
        assert_eq!(
            BucketName::new("b1"),
            Err(ValidationError::BucketNameTooShort { actual: 2, min: 3 })
        );
        assert_eq!(
            BucketName::new("a".repeat(64)),
            Err(ValidationError::BucketNameTooLong { actual: 64, max: 63 })
        );
        assert!(BucketName::new("a".repeat(63)).is_ok());
    }

    #[test]
    fn test_invalid_bucket_names() {
        assert_eq!(
            BucketName::new("-bucket"),
            Err(ValidationError::BucketNameInvalidStart)
        );
        assert_eq!(
            BucketName::new("bucket-"),
            Err(ValidationError::BucketNameInvalidEnd)
        );
        assert_eq!(
            BucketName::new("Bucket"),
            Err(ValidationError::BucketNameInvalidCharacter('B'))
        );
        assert_eq!(
            BucketName::new("my_bucket"),
            Err(ValidationError::BucketNameInvalidCharacter('_'))
        );
        assert_eq!(
            BucketName::new("my--bucket"),
            Err(ValidationError::BucketNameConsecutiveHyphens)
        );
    }

    #[test]
    fn test_dots_are_rejected_so_ip_addresses_cannot_pass() {
        // Dots are not in the allowed alphabet, so an IPv4-shaped name fails on the character check.
        assert_eq!(
            BucketName::new("192.168.1.1"),
            Err(ValidationError::BucketNameInvalidCharacter('.'))
        );
    }

    #[test]
    fn test_from_str() {
        let name: BucketName = "uploads".parse().unwrap();
        assert_eq!(name.as_str(), "uploads");
        assert_eq!(name.to_string(), "uploads");
    }
}
