use std::path::Path;

use anyhow::Context;
use storefront_core::query;

/// Load a catalog file and report what it contains.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub(crate) fn run_validate(path: &Path) -> anyhow::Result<()> {
    let catalog = storefront_core::load_catalog(path)
        .with_context(|| format!("catalog {} is invalid", path.display()))?;

    let categories = query::category_index(catalog.products()).len();
    let featured = catalog.featured().len();
    let out_of_stock = catalog
        .products()
        .iter()
        .filter(|p| !p.is_in_stock())
        .count();

    println!(
        "{}: ok ({} products, {categories} categories, {featured} featured, {out_of_stock} out of stock)",
        path.display(),
        catalog.len()
    );

    Ok(())
}
