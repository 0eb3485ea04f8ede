//! Tests for error display and conversions

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::path::PathBuf;
    use wavemap::io::error::{invalid_parameter, GenerationError};

    // Tests invalid parameter errors carry name, value, and reason
    // Verified by dropping the reason from the message
    #[test]
    fn test_invalid_parameter_display() {
        let error = invalid_parameter("scale", &0, &"pixel scale must be at least 1");
        let message = error.to_string();
        assert!(message.contains("scale"));
        assert!(message.contains('0'));
        assert!(message.contains("at least 1"));
    }

    // Tests catalog and generation errors render their detail
    // Verified by swapping the two message prefixes
    #[test]
    fn test_catalog_and_generation_display() {
        let catalog = GenerationError::InvalidCatalog {
            reason: "catalog produced no variants".to_string(),
        };
        assert!(catalog.to_string().contains("no variants"));

        let generation = GenerationError::Generation {
            message: "unresolvable contradiction after 3 restarts.".to_string(),
        };
        assert!(generation.to_string().contains("after 3 restarts."));
    }

    // Tests filesystem errors expose their source for chaining
    // Verified by returning None from source
    #[test]
    fn test_filesystem_source_chain() {
        let error = GenerationError::FileSystem {
            path: PathBuf::from("/tmp/catalog.json"),
            operation: "read catalog",
            source: std::io::Error::other("disk gone"),
        };
        assert!(error.to_string().contains("read catalog"));
        assert!(error.source().is_some());
    }
}
