//! `${VAR}` expansion for string settings.

use crate::ConfigError;

/// Expand environment variable references in a config value.
///
/// - `${VAR}` expands to the value of VAR and fails if it is unset
/// - `${VAR:-default}` falls back to `default` when VAR is unset
///
/// Bare `$VAR` is left alone; only the braced form is recognized.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a variable that could not be resolved.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_plain_value_unchanged() {
        let result = expand_env("https://blog.example.com", "site.base_url").unwrap();
        assert_eq!(result, "https://blog.example.com");
    }

    #[test]
    fn test_expand_set_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("QUILL_TEST_EXPAND_HOST", "blog.example.com");
        }
        let result = expand_env("https://${QUILL_TEST_EXPAND_HOST}/", "site.base_url").unwrap();
        assert_eq!(result, "https://blog.example.com/");
        unsafe {
            std::env::remove_var("QUILL_TEST_EXPAND_HOST");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("QUILL_TEST_EXPAND_UNSET");
        }
        let result = expand_env("${QUILL_TEST_EXPAND_UNSET:-My Blog}", "site.title").unwrap();
        assert_eq!(result, "My Blog");
    }

    #[test]
    fn test_expand_missing_var_reports_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("QUILL_TEST_EXPAND_MISSING");
        }
        let err = expand_env("${QUILL_TEST_EXPAND_MISSING}", "site.title").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable error in site.title: ${QUILL_TEST_EXPAND_MISSING} not set"
        );
    }
}
