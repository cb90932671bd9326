//! `${VAR}` expansion for credential and URL fields.
//!
//! Only the braced form is recognised so that tokens containing a bare `$`
//! pass through untouched.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` is the dotted config path reported when a variable is unset.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar {
            name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.name),
    })
}

/// Expand a field in place.
pub(crate) fn expand_in_place(value: &mut String, field: &str) -> Result<(), ConfigError> {
    *value = expand_env(value, field)?;
    Ok(())
}

/// Variable referenced without a default and missing from the environment.
struct UnsetVar {
    name: String,
}
