//! Terminal styling and the masked API key prompt.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Password;
use tarjama_core::{Credential, Provider};

/// Returns a `ColorfulTheme` that draws on stderr.
///
/// - Prompt prefix: cyan `?`
/// - Success prefix: green `✓`
/// - Error prefix: red `✗`
pub fn tarjama_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Ask for the API key of `provider` without echoing it.
///
/// Returns `None` if the user submits an empty value.
pub fn prompt_for_key(provider: Provider) -> anyhow::Result<Option<Credential>> {
    let dim = Style::new().for_stderr().dim();
    eprintln!(
        "  {}",
        dim.apply_to(format!(
            "Get a {} API key at {}",
            provider.label(),
            provider.key_url()
        ))
    );

    let key: String = Password::with_theme(&tarjama_theme())
        .with_prompt(format!("Enter your {} API key", provider.label()))
        .allow_empty_password(true)
        .interact()?;

    let credential = Credential::new(key.trim());
    if credential.is_empty() {
        return Ok(None);
    }
    Ok(Some(credential))
}
