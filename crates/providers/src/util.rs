//! Shared helpers for gateway adapters: transport error mapping,
//! credential resolution and log redaction.

use council_domain::config::AuthConfig;
use council_domain::error::{Error, Result};

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Resolve the API key from an [`AuthConfig`].
///
/// Precedence:
/// 1. `key` field (plaintext, warns)
/// 2. `service` + `account` → OS keychain via `keyring`
/// 3. `env` field
/// 4. `{SERVICE}_{ACCOUNT}` uppercased, for headless keychain setups
///
/// Returns `None` when nothing yields a non-empty key. A missing key is
/// not fatal at construction time; the turn fails fast instead.
pub fn resolve_api_key(auth: &AuthConfig) -> Option<String> {
    if let Some(key) = auth.key.as_deref().filter(|k| !k.is_empty()) {
        tracing::warn!(
            "API key loaded from plaintext config field 'key'; \
             prefer 'env' or keychain instead"
        );
        return Some(key.to_string());
    }

    if let (Some(service), Some(account)) = (&auth.service, &auth.account) {
        match resolve_from_keychain(service, account) {
            Ok(secret) if !secret.is_empty() => return Some(secret),
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(
                    service = %service,
                    account = %account,
                    error = %e,
                    "keychain lookup failed, falling through to env"
                );
            }
        }
    }

    if let Some(env_var) = &auth.env {
        if let Some(val) = non_empty_env(env_var) {
            return Some(val);
        }
    }

    if let (Some(service), Some(account)) = (&auth.service, &auth.account) {
        let fallback_var = keychain_fallback_env_name(service, account);
        if let Some(val) = non_empty_env(&fallback_var) {
            tracing::info!(env_var = %fallback_var, "API key resolved from keychain fallback env var");
            return Some(val);
        }
    }

    None
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read a secret from the OS keychain.
pub fn resolve_from_keychain(service: &str, account: &str) -> Result<String> {
    let entry = keyring::Entry::new(service, account)
        .map_err(|e| Error::Auth(format!("keyring entry creation failed: {e}")))?;
    entry
        .get_password()
        .map_err(|e| Error::Auth(format!("keyring get_password failed: {e}")))
}

/// Store a secret in the OS keychain.
pub fn store_in_keychain(service: &str, account: &str, secret: &str) -> Result<()> {
    let entry = keyring::Entry::new(service, account)
        .map_err(|e| Error::Auth(format!("keyring entry creation failed: {e}")))?;
    entry
        .set_password(secret)
        .map_err(|e| Error::Auth(format!("keyring set_password failed: {e}")))
}

/// Build the headless fallback env var name for a keychain service/account.
///
/// `("council", "gemini-api-key")` → `"COUNCIL_GEMINI_API_KEY"`.
pub fn keychain_fallback_env_name(service: &str, account: &str) -> String {
    format!(
        "{}_{}",
        service.to_uppercase().replace('-', "_"),
        account.to_uppercase().replace('-', "_"),
    )
}

/// Redact the `key=` query parameter from a URL for safe logging.
pub(crate) fn redact_url_key(url: &str) -> String {
    if let Some(idx) = url.find("key=") {
        let prefix = &url[..idx + 4];
        let rest = &url[idx + 4..];
        let end = rest.find('&').unwrap_or(rest.len());
        format!("{prefix}[REDACTED]{}", &rest[end..])
    } else {
        url.to_string()
    }
}
