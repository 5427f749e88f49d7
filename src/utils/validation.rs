use crate::utils::error::{PackagerError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(PackagerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PackagerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PackagerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(PackagerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PackagerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PackagerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Rejects values that would be split apart when handed to a tool as one
/// space-separated option string.
pub fn validate_no_whitespace(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;
    if value.chars().any(char::is_whitespace) {
        return Err(PackagerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot contain whitespace".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("modules.download_base_url", "https://example.com").is_ok());
        assert!(validate_url("modules.download_base_url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("modules.download_base_url", "").is_err());
        assert!(validate_url("modules.download_base_url", "invalid-url").is_err());
        assert!(validate_url("modules.download_base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("paths.dist_dir", "dist").is_ok());
        assert!(validate_path("paths.dist_dir", "").is_err());
        assert!(validate_path("paths.dist_dir", "di\0st").is_err());
    }

    #[test]
    fn test_validate_no_whitespace() {
        assert!(validate_no_whitespace("installer.java_options", "-Xmx1g").is_ok());
        assert!(validate_no_whitespace("installer.java_options", "-Xmx1g -Xms1g").is_err());
        assert!(validate_no_whitespace("installer.java_options", "  ").is_err());
    }
}
