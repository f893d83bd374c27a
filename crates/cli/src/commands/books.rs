//! Catalog commands: `search` and `details`.
//!
//! A failed catalog request is reported and rendered as an empty listing (or
//! a details page with whatever is already known) rather than aborting.

use std::fmt::Write as _;

use booksearch_core::{
    Cart, CartStore, CatalogItem, CoverSize, WorkDetails, WorkId, cover_url,
};

use super::{
    CommandError, Context, Target, save_last_search, search_result, search_result_for,
};
use crate::api::ApiError;

/// Search the catalog and remember the listing for `#n` references.
///
/// # Errors
///
/// Returns [`CommandError::NotSignedIn`] for an anonymous client, or a
/// validation error for a blank query.
pub async fn search(ctx: &Context, terms: &[String]) -> Result<(), CommandError> {
    ctx.require_session()?;
    let query = terms.join(" ");

    let (items, num_found) = match ctx.api.search(&query).await {
        Ok(results) => (results.docs, results.num_found),
        Err(e @ ApiError::Validation(_)) => return Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, %query, "search failed");
            #[allow(clippy::print_stdout)]
            {
                println!("Search failed: {e}");
            }
            (Vec::new(), 0)
        }
    };

    save_last_search(&ctx.store, &items);
    let cart = CartStore::new(&ctx.store).load();

    #[allow(clippy::print_stdout)]
    {
        print!("{}", format_listing(&query, &items, num_found, &cart));
    }
    Ok(())
}

/// Show extended information for a result number or work id.
///
/// # Errors
///
/// Returns [`CommandError::NotSignedIn`] for an anonymous client, or an
/// error if the target cannot be resolved.
pub async fn details(ctx: &Context, target: &str) -> Result<(), CommandError> {
    ctx.require_session()?;

    let (id, item) = match Target::parse(target)? {
        Target::Position(position) => {
            let item = search_result(&ctx.store, position)?;
            (WorkId::parse(&item.key)?, Some(item))
        }
        Target::Work(id) => {
            let item = search_result_for(&ctx.store, &id);
            (id, item)
        }
    };

    let details = match ctx.api.work_details(&id).await {
        Ok(details) => details,
        Err(e) => {
            tracing::warn!(error = %e, work_id = %id, "failed to load work details");
            #[allow(clippy::print_stdout)]
            {
                println!("Could not load full details: {e}");
            }
            WorkDetails::default()
        }
    };

    let cart = CartStore::new(&ctx.store).load();

    #[allow(clippy::print_stdout)]
    {
        print!("{}", format_details(&id, item.as_ref(), &details, &cart));
    }
    Ok(())
}

/// Build a cart-ready item for a work that is not in the last listing.
pub(super) fn catalog_item_from_details(id: &WorkId, details: &WorkDetails) -> CatalogItem {
    CatalogItem {
        key: id.key(),
        title: details
            .title
            .clone()
            .unwrap_or_else(|| id.as_str().to_owned()),
        author_names: Vec::new(),
        first_publish_year: None,
        cover_image_id: details.primary_cover(),
    }
}

/// One-line summary: `Dune by Frank Herbert (1965)`.
pub(super) fn describe(item: &CatalogItem) -> String {
    let mut line = item.title.clone();
    if let Some(author) = item.primary_author() {
        let _ = write!(line, " by {author}");
    }
    if let Some(year) = item.first_publish_year {
        let _ = write!(line, " ({year})");
    }
    line
}

fn format_listing(query: &str, items: &[CatalogItem], num_found: u64, cart: &Cart) -> String {
    if items.is_empty() {
        return format!("No books found for \"{query}\".\n");
    }

    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        let marker = if cart.contains(&item.key) { "  [in cart]" } else { "" };
        let _ = writeln!(out, "{:>3}. {}{marker}", index + 1, describe(item));
    }
    let _ = writeln!(
        out,
        "\nShowing {} of {num_found} results. Use `booksearch details <n>` or `booksearch cart add <n>`.",
        items.len()
    );
    out
}

fn format_details(
    id: &WorkId,
    item: Option<&CatalogItem>,
    details: &WorkDetails,
    cart: &Cart,
) -> String {
    let title = details
        .title
        .as_deref()
        .or_else(|| item.map(|i| i.title.as_str()))
        .unwrap_or_else(|| id.as_str());

    let mut out = format!("{title}\n");

    if let Some(item) = item {
        if !item.author_names.is_empty() {
            let _ = writeln!(out, "Author: {}", item.author_names.join(", "));
        }
        if let Some(year) = item.first_publish_year {
            let _ = writeln!(out, "First published: {year}");
        }
    }

    let cover = details
        .primary_cover()
        .or_else(|| item.and_then(|i| i.cover_image_id));
    if let Some(cover) = cover {
        let _ = writeln!(out, "Cover: {}", cover_url(cover, CoverSize::Large));
    }

    let _ = writeln!(out, "\n{}\n", details.description_or_default());

    let subjects = details.displayed_subjects();
    if !subjects.is_empty() {
        let _ = writeln!(out, "Subjects: {}", subjects.join(", "));
    }

    match cart.get(&id.key()) {
        Some(entry) => {
            let _ = writeln!(out, "In your cart at {}.", entry.price);
        }
        None => {
            let _ = writeln!(out, "Add to cart: booksearch cart add {id}");
        }
    }
    out
}
