//! Cart drawer commands.
//!
//! # Usage
//!
//! ```bash
//! booksearch cart show
//! booksearch cart add 3            # result #3 of the last search
//! booksearch cart add OL45883W
//! booksearch cart remove 1         # item #1 as listed by `cart show`
//! booksearch cart clear
//! booksearch cart checkout
//! ```

use std::fmt::Write as _;

use booksearch_core::{Cart, CartError, CartStore, CatalogItem, Price};

use super::books::{catalog_item_from_details, describe};
use super::{CommandError, Context, Target, search_result, search_result_for};

/// Print the cart and its total.
///
/// # Errors
///
/// Returns [`CommandError::NotSignedIn`] for an anonymous client.
pub fn show(ctx: &Context) -> Result<(), CommandError> {
    ctx.require_session()?;
    let cart = CartStore::new(&ctx.store).load();

    #[allow(clippy::print_stdout)]
    {
        print!("{}", format_cart(&cart));
    }
    Ok(())
}

/// Add a result number or work id at a freshly drawn list price.
///
/// Adding something already in the cart prints a notice and changes nothing.
///
/// # Errors
///
/// Returns [`CommandError::NotSignedIn`] for an anonymous client, an error if
/// the target cannot be resolved, or a storage error.
pub async fn add(ctx: &Context, target: &str) -> Result<(), CommandError> {
    ctx.require_session()?;
    let item = resolve_item(ctx, Target::parse(target)?).await?;
    let price = Price::random_list_price(&mut rand::rng());

    let message = match CartStore::new(&ctx.store).add(item, price) {
        Ok(cart) => format!(
            "Added at {price}. Cart: {} item(s), {}.",
            cart.len(),
            cart.total()
        ),
        Err(e @ CartError::AlreadyPresent { .. }) => e.to_string(),
        Err(e) => return Err(e.into()),
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{message}");
    }
    Ok(())
}

/// Remove a cart position or work id. Removing something absent is not an error.
///
/// # Errors
///
/// Returns [`CommandError::NotSignedIn`] for an anonymous client, an error if
/// the position does not exist, or a storage error.
pub fn remove(ctx: &Context, target: &str) -> Result<(), CommandError> {
    ctx.require_session()?;
    let store = CartStore::new(&ctx.store);

    let key = match Target::parse(target)? {
        Target::Position(position) => position
            .checked_sub(1)
            .and_then(|index| store.load().entries().get(index).map(|e| e.key().to_owned()))
            .ok_or(CommandError::NoSuchCartItem { position })?,
        Target::Work(id) => id.key(),
    };

    let cart = store.remove(&key)?;

    #[allow(clippy::print_stdout)]
    {
        println!("Removed. Cart: {} item(s), {}.", cart.len(), cart.total());
    }
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns [`CommandError::NotSignedIn`] for an anonymous client, or a
/// storage error.
pub fn clear(ctx: &Context) -> Result<(), CommandError> {
    ctx.require_session()?;
    CartStore::new(&ctx.store).clear()?;

    #[allow(clippy::print_stdout)]
    {
        println!("Cart cleared.");
    }
    Ok(())
}

/// Confirm the purchase and empty the cart. Nothing is charged.
///
/// # Errors
///
/// Returns [`CommandError::NotSignedIn`] for an anonymous client, or a
/// storage error (in which case no purchase is confirmed).
pub fn checkout(ctx: &Context) -> Result<(), CommandError> {
    ctx.require_session()?;

    let message = match CartStore::new(&ctx.store).checkout()? {
        Some(receipt) => format!(
            "Purchase complete! {} item(s), total {}.",
            receipt.item_count, receipt.total
        ),
        None => "Your cart is empty.".to_owned(),
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{message}");
    }
    Ok(())
}

async fn resolve_item(ctx: &Context, target: Target) -> Result<CatalogItem, CommandError> {
    match target {
        Target::Position(position) => search_result(&ctx.store, position),
        Target::Work(id) => {
            if let Some(item) = search_result_for(&ctx.store, &id) {
                return Ok(item);
            }
            let details = ctx.api.work_details(&id).await?;
            Ok(catalog_item_from_details(&id, &details))
        }
    }
}

fn format_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty.\n".to_owned();
    }

    let mut out = String::new();
    for (index, entry) in cart.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:<60} {:>8}",
            index + 1,
            describe(&entry.item),
            entry.price.to_string()
        );
    }
    let _ = writeln!(out, "\nTotal: {}", cart.total());
    out
}
