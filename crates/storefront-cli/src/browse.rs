//! Read-only catalog browsing handlers.
//!
//! Each handler runs against an already opened `Catalog` and prints either an
//! aligned table or, with `--json`, the serialized records.

use anyhow::anyhow;
use storefront_core::query::{self, CatalogQuery, FilterCriteria, PriceRange};
use storefront_core::{Catalog, Facet, Product, SortKey, RELATED_PRODUCTS_LIMIT};

use crate::ProductsArgs;

const NAME_WIDTH: usize = 32;

/// Translate `products` flags into an engine query. Unknown sort keys fall
/// back to catalog order.
pub(crate) fn build_query(args: &ProductsArgs) -> CatalogQuery {
    CatalogQuery {
        search: args.search.clone().unwrap_or_default(),
        filter: FilterCriteria {
            category: args.category.clone(),
            price_range: PriceRange::from_bounds(args.min_price, args.max_price),
            in_stock_only: args.in_stock,
            featured_only: args.featured,
        },
        sort: SortKey::parse_lenient(&args.sort),
    }
}

/// Run a storefront query and print the matching products.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub(crate) fn run_products(catalog: &Catalog, args: &ProductsArgs) -> anyhow::Result<()> {
    let query = build_query(args);
    let results = query::run_query(catalog.products(), &query);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("no products match; try clearing some filters");
        return Ok(());
    }

    println!("{}", product_header());
    for product in &results {
        println!("{}", product_row(product));
    }
    println!("{} of {} products", results.len(), catalog.len());

    Ok(())
}

/// Print the category index with product counts.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub(crate) fn run_categories(catalog: &Catalog, json: bool) -> anyhow::Result<()> {
    let counts = query::category_counts(catalog.products());

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    if counts.is_empty() {
        println!("catalog has no products");
        return Ok(());
    }

    println!("{:<20}PRODUCTS", "CATEGORY");
    for entry in &counts {
        println!("{:<20}{}", entry.name, entry.count);
    }

    Ok(())
}

/// Print a single product, its stock status and up to four related products.
///
/// # Errors
///
/// Returns an error if `id` is not in the catalog.
pub(crate) fn run_show(catalog: &Catalog, id: &str, json: bool) -> anyhow::Result<()> {
    let product = catalog
        .get(id)
        .ok_or_else(|| anyhow!("product '{id}' not found"))?;
    let related = catalog.related(id, RELATED_PRODUCTS_LIMIT);

    if json {
        let body = serde_json::json!({
            "product": product,
            "stock_status": product.stock_status(),
            "related": related,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("{} ({})", product.name, product.id);
    println!("  category: {}", product.category);
    println!("  price:    {:.2}", product.price);
    println!(
        "  rating:   {} ({} reviews)",
        product.rating, product.reviews
    );
    println!("  stock:    {}", product.stock_status());
    if product.featured {
        println!("  featured");
    }
    for facet in Facet::ALL {
        if let Some(options) = product.variants.options(facet) {
            println!("  {facet}: {}", options.join(", "));
        }
    }
    println!("  added:    {}", product.created_at.format("%Y-%m-%d"));
    if let Some(updated_at) = product.updated_at {
        println!("  edited:   {}", updated_at.format("%Y-%m-%d"));
    }
    println!();
    println!("{}", product.description);

    if !related.is_empty() {
        println!();
        println!("related:");
        for other in &related {
            println!("  {:<6}{}", other.id, other.name);
        }
    }

    Ok(())
}

fn product_header() -> String {
    format!(
        "{:<6}{:<34}{:<16}{:>10}  {:<14}RATING",
        "ID", "NAME", "CATEGORY", "PRICE", "STOCK"
    )
}

fn product_row(product: &Product) -> String {
    format!(
        "{:<6}{:<34}{:<16}{:>10}  {:<14}{}",
        product.id,
        truncate(&product.name, NAME_WIDTH),
        product.category,
        format!("{:.2}", product.price),
        product.stock_status().to_string(),
        product.rating
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars - 3).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[path = "browse_test.rs"]
mod tests;
