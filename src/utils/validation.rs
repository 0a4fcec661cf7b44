use crate::utils::error::{DeployError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DeployError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 資源群組名稱規則：1-90 字元，允許英數、底線、連字號、句點、括號，結尾不可為句點
pub fn validate_resource_group_name(field_name: &str, name: &str) -> Result<()> {
    let invalid = |reason: String| DeployError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: name.to_string(),
        reason,
    };

    if name.is_empty() || name.len() > 90 {
        return Err(invalid("Name must be 1-90 characters long".to_string()));
    }
    if name.ends_with('.') {
        return Err(invalid("Name cannot end with a period".to_string()));
    }
    for c in name.chars() {
        if !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '(' | ')')) {
            return Err(invalid(format!("Character '{}' is not allowed", c)));
        }
    }
    Ok(())
}

/// DNS 形式的名稱規則（webapp、container、dns label 共用）：
/// 2-60 字元，英數與連字號，開頭結尾必須是英數
pub fn validate_dns_name(field_name: &str, name: &str) -> Result<()> {
    let invalid = |reason: String| DeployError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: name.to_string(),
        reason,
    };

    if name.len() < 2 || name.len() > 60 {
        return Err(invalid("Name must be 2-60 characters long".to_string()));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(invalid(
            "Name cannot start or end with a hyphen".to_string(),
        ));
    }
    for c in name.chars() {
        if !(c.is_ascii_alphanumeric() || c == '-') {
            return Err(invalid(format!("Character '{}' is not allowed", c)));
        }
    }
    Ok(())
}

/// 容器登錄所名稱規則：5-50 個英數字元
pub fn validate_registry_name(field_name: &str, name: &str) -> Result<()> {
    let invalid = |reason: String| DeployError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: name.to_string(),
        reason,
    };

    if name.len() < 5 || name.len() > 50 {
        return Err(invalid("Name must be 5-50 characters long".to_string()));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("Only alphanumeric characters are allowed".to_string()));
    }
    Ok(())
}

pub fn validate_port(field_name: &str, port: u16) -> Result<()> {
    if port == 0 {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: port.to_string(),
            reason: "Port must be between 1 and 65535".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: f64, min_value: f64) -> Result<()> {
    if value < min_value {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| DeployError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DeployError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api.base_url", "https://example.com").is_ok());
        assert!(validate_url("api.base_url", "http://example.com").is_ok());
        assert!(validate_url("api.base_url", "").is_err());
        assert!(validate_url("api.base_url", "invalid-url").is_err());
        assert!(validate_url("api.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_resource_group_name() {
        assert!(validate_resource_group_name("azure.resource_group", "analyzer-rg").is_ok());
        assert!(validate_resource_group_name("azure.resource_group", "rg_prod.01(eu)").is_ok());
        assert!(validate_resource_group_name("azure.resource_group", "").is_err());
        assert!(validate_resource_group_name("azure.resource_group", "ends-with.").is_err());
        assert!(validate_resource_group_name("azure.resource_group", "has space").is_err());
        assert!(validate_resource_group_name("azure.resource_group", &"x".repeat(91)).is_err());
    }

    #[test]
    fn test_validate_dns_name() {
        assert!(validate_dns_name("webapp.name", "analyzer-api").is_ok());
        assert!(validate_dns_name("webapp.name", "a").is_err());
        assert!(validate_dns_name("webapp.name", "-leading").is_err());
        assert!(validate_dns_name("webapp.name", "trailing-").is_err());
        assert!(validate_dns_name("webapp.name", "under_score").is_err());
    }

    #[test]
    fn test_validate_registry_name() {
        assert!(validate_registry_name("registry.name", "analyzeracr01").is_ok());
        assert!(validate_registry_name("registry.name", "abcd").is_err());
        assert!(validate_registry_name("registry.name", "has-hyphen").is_err());
    }

    #[test]
    fn test_validate_port() {
        assert!(validate_port("app.port", 8000).is_ok());
        assert!(validate_port("app.port", 0).is_err());
    }
}
