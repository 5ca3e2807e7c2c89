//! Configuration command.

use anyhow::Result;

use crate::context::Context;

/// Print the effective configuration.
pub fn show(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Configuration");
    println!("{}", ctx.config.to_toml()?);
    Ok(())
}
