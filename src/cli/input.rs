use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Password};

pub fn prompt_pin() -> Result<String> {
    let pin = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("PIN")
        .with_confirmation("Confirm PIN", "PINs do not match")
        .interact()
        .context("Failed to read PIN")?;

    validate_pin(&pin)?;
    Ok(pin)
}

pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.is_empty() {
        return Err(anyhow::anyhow!("PIN cannot be empty"));
    }
    Ok(())
}
