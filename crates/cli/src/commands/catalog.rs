//! Catalog browsing commands.

use petal_core::ProductId;
use petal_storefront::Storefront;
use petal_storefront::api::Product;
use petal_storefront::error::Result;

use super::money;

/// List one page of products.
pub async fn products(storefront: &Storefront, page: u32) -> Result<()> {
    let products = storefront.api().products(page).await?;
    tracing::debug!(count = products.len(), page, "Fetched products");
    print_products(&products);
    Ok(())
}

/// Search products by text.
pub async fn search(storefront: &Storefront, query: &str) -> Result<()> {
    let products = storefront.api().search_products(query).await?;
    if products.is_empty() {
        println!("No products match \"{query}\".");
    }
    print_products(&products);
    Ok(())
}

/// Show one product in detail.
pub async fn product(storefront: &Storefront, id: &ProductId) -> Result<()> {
    let product = storefront.api().product(id).await?;

    println!("{} ({})", product.name, product.id);
    match product.original_price {
        Some(original) if original > product.price => {
            println!("{} (was {})", money(product.price), money(original));
        }
        _ => println!("{}", money(product.price)),
    }
    if let Some(description) = &product.description {
        println!("{description}");
    }
    if !product.sizes.is_empty() {
        println!("Sizes: {}", product.sizes.join(", "));
    }
    if !product.colors.is_empty() {
        let colors: Vec<&str> = product.colors.iter().map(|c| c.color_name.as_str()).collect();
        println!("Colors: {}", colors.join(", "));
    }
    if product.stock == Some(0) {
        println!("Out of stock");
    }
    Ok(())
}

/// List categories and their sub-categories.
pub async fn categories(storefront: &Storefront) -> Result<()> {
    let (categories, sub_categories) = tokio::try_join!(
        storefront.api().categories(),
        storefront.api().sub_categories()
    )?;

    for category in &categories {
        println!("{}  {}", category.id, category.name);
        for sub in sub_categories
            .iter()
            .filter(|s| s.category.as_ref().is_some_and(|c| c.id() == &category.id))
        {
            println!("    {}  {}", sub.id, sub.name);
        }
    }
    Ok(())
}

fn print_products(products: &[Product]) {
    for product in products {
        println!("{}  {}  {}", product.id, product.name, money(product.price));
    }
}
