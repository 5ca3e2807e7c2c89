//! Cart commands.

use anyhow::{bail, Result};
use turbo_cart::{current_cart, CartError, CartStore, NewCartItem};

use super::{AddArgs, AdjustArgs};
use crate::context::Context;

/// Print the cart.
pub async fn show(ctx: &Context) -> Result<()> {
    let provider = ctx.open_cart().await?;
    let cart = provider.handle().read();

    ctx.output.header("Cart");
    ctx.output.cart(&cart);
    Ok(())
}

/// Add one unit of a product.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let title = args.title.unwrap_or_else(|| args.id.clone());
    let item = NewCartItem::new(args.id.clone(), title, args.image_url, args.price);

    apply(ctx, move |cart| {
        let quantity = cart.add_to_cart(item)?;
        Ok(format!("Added {} (quantity {})", args.id, quantity))
    })
    .await
}

/// Increase a product's quantity.
pub async fn increment(args: AdjustArgs, ctx: &Context) -> Result<()> {
    apply(ctx, move |cart| {
        let quantity = cart.increment(&args.id)?;
        Ok(format!("{} quantity is now {}", args.id, quantity))
    })
    .await
}

/// Decrease a product's quantity.
pub async fn decrement(args: AdjustArgs, ctx: &Context) -> Result<()> {
    apply(ctx, move |cart| {
        Ok(match cart.decrement(&args.id)? {
            Some(quantity) => format!("{} quantity is now {}", args.id, quantity),
            None => format!("Removed {}", args.id),
        })
    })
    .await
}

/// Run one mutation inside the session's provider scope and persist it.
async fn apply<F>(ctx: &Context, mutate: F) -> Result<()>
where
    F: FnOnce(&CartStore) -> Result<String, CartError>,
{
    let provider = ctx.open_cart().await?;

    let (message, snapshot, stats) = provider
        .scope(async {
            let cart = current_cart()?;
            let message = mutate(&*cart)?;
            cart.flush().await;
            Ok::<_, CartError>((message, cart.read(), cart.write_stats()))
        })
        .await?;

    if ctx.output.is_verbose() {
        ctx.output.debug(&format!(
            "Writes: {} scheduled, {} completed, {} failed, {} coalesced",
            stats.scheduled, stats.completed, stats.failed, stats.coalesced
        ));
    }

    if stats.failed > 0 {
        ctx.output.cart(&snapshot);
        bail!("Cart changed but could not be saved to {}", ctx.data_dir().display());
    }

    ctx.output.success(&message);
    ctx.output.cart(&snapshot);
    Ok(())
}
