use anyhow::{Context, Result};

use crate::cli::input;
use crate::context::TouchIdContext;
use crate::domain::endpoints::TokenKind;
use crate::domain::{LocalConfigStore, RuntimeMode};

pub fn handle_status(ctx: &TouchIdContext) -> Result<()> {
    println!("\nTouch ID Status:");
    println!("  Runtime: {}", ctx.manager.runtime());
    println!("  Platform: {}", ctx.config.platform);
    println!("  Server: {}", ctx.config.url_root);
    println!("  Device ID: {}", ctx.store.id());
    println!(
        "  Available: {}",
        if ctx.manager.is_available() { "yes" } else { "no" }
    );
    println!(
        "  Enabled: {}",
        if ctx.manager.is_enabled() { "yes" } else { "no" }
    );
    Ok(())
}

pub async fn handle_enable(ctx: &TouchIdContext, pin: Option<String>) -> Result<()> {
    if !ctx.manager.is_available() {
        return Err(anyhow::anyhow!(
            "Touch ID is not available on this device"
        ));
    }

    let pin = match ctx.manager.runtime() {
        RuntimeMode::Hybrid => match pin {
            Some(pin) => {
                input::validate_pin(&pin)?;
                pin
            }
            None => input::prompt_pin()?,
        },
        RuntimeMode::Web => {
            if pin.is_some() {
                println!("⚠ --pin is ignored in the web runtime");
            }
            String::new()
        }
    };

    ctx.manager
        .enable(&pin)
        .await
        .context("Failed to enable Touch ID")?;
    println!("✓ Touch ID enabled");
    Ok(())
}

pub async fn handle_disable(ctx: &TouchIdContext) -> Result<()> {
    ctx.manager
        .disable()
        .await
        .context("Failed to disable Touch ID")?;
    println!("✓ Touch ID disabled");
    Ok(())
}

pub async fn handle_token(ctx: &TouchIdContext, kind: TokenKind) -> Result<()> {
    let token = match kind {
        TokenKind::Public => ctx.manager.public_token().await,
        TokenKind::Private => ctx.manager.private_token().await,
    }
    .with_context(|| format!("Failed to obtain {} token", kind.field()))?;

    println!("{}", token);
    Ok(())
}

pub async fn handle_verify(ctx: &TouchIdContext) -> Result<()> {
    ctx.manager
        .verify_user()
        .await
        .context("Biometric verification failed")?;
    println!("✓ Verified");
    Ok(())
}
