use std::io::Write;

use council_domain::config::{Config, ConfigSeverity};
use council_providers::util::store_in_keychain;

/// Parse and validate the config, printing any issues.
///
/// Returns `false` when errors are found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    println!("\n{error_count} error(s), {warning_count} warning(s) in {config_path}");

    error_count == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    let output = toml::to_string_pretty(config)
        .map_err(|e| anyhow::anyhow!("serializing config: {e}"))?;
    print!("{output}");
    Ok(())
}

/// Prompt for the API key without echo and store it in the OS keychain.
pub fn set_secret(config: &Config) -> anyhow::Result<()> {
    let auth = &config.gateway.auth;
    let (Some(service), Some(account)) = (&auth.service, &auth.account) else {
        anyhow::bail!("set gateway.auth.service and gateway.auth.account first");
    };

    eprint!("API key for {service}/{account}: ");
    std::io::stderr().flush().ok();
    let secret = rpassword::read_password()?;
    let secret = secret.trim();
    if secret.is_empty() {
        anyhow::bail!("no key entered");
    }

    store_in_keychain(service, account, secret)?;
    eprintln!("Stored.");
    Ok(())
}
