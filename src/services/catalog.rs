//! Home, shop and product pages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use std::collections::BTreeMap;
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::aggregates::product::{rating_percentage, rating_stars};
use crate::domain::aggregates::DisplayFields;
use crate::domain::events::{CatalogEvent, DomainEvent};
use crate::error::{AppError, Result};
use crate::store::catalog::{self, ProductFilter, Ranking, PRODUCT_SORT_COLUMNS};
use crate::store::models::{Category, Colour, Inventory, NamedCount, Product, ProductImage, Size};
use crate::store::{activity, settings, sort_column, Page, SortDir};
use crate::AppState;

pub const SHOP_PAGE_SIZE: i64 = 9;

/// A product as rendered in lists and detail pages.
#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub details: Option<String>,
    pub price: Decimal,
    pub total_order: i32,
    pub category_name: String,
    #[serde(flatten)]
    pub display: DisplayFields,
}

async fn cards(conn: &mut PgConnection, products: Vec<Product>, top_rating: i32) -> sqlx::Result<Vec<ProductCard>> {
    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    let mut names = catalog::category_names(conn, &ids).await?;
    Ok(products
        .into_iter()
        .map(|p| ProductCard {
            display: DisplayFields::derive(p.id, p.price, p.total_rating, top_rating),
            category_name: names.remove(&p.id).unwrap_or_default().join(", "),
            id: p.id,
            sku: p.sku,
            name: p.name,
            image: p.image,
            description: p.description,
            details: p.details,
            price: p.price,
            total_order: p.total_order,
        })
        .collect())
}

#[derive(Debug, Serialize)]
pub struct HomeComponent {
    pub categories: Vec<Category>,
    pub settings: BTreeMap<String, String>,
}

pub async fn home_component(state: &AppState) -> Result<HomeComponent> {
    let mut conn = state.db.acquire().await?;
    Ok(HomeComponent {
        categories: catalog::active_categories(&mut conn, false, None).await?,
        settings: settings::all(&mut conn).await?,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub categories: Vec<Category>,
    pub products: Vec<ProductCard>,
    pub best_ratings: Vec<ProductCard>,
    pub top_sellings: Vec<ProductCard>,
}

#[instrument(skip(state))]
pub async fn home_page(state: &AppState) -> Result<HomePage> {
    let mut conn = state.db.acquire().await?;
    let top = catalog::top_rating(&mut conn).await?;

    let categories = catalog::active_categories(&mut conn, true, Some(3)).await?;
    let newest = catalog::ranked_products(&mut conn, Ranking::Newest, 4, None).await?;
    let best = catalog::ranked_products(&mut conn, Ranking::BestRated, 3, None).await?;
    let selling = catalog::ranked_products(&mut conn, Ranking::TopSelling, 3, None).await?;

    Ok(HomePage {
        categories,
        products: cards(&mut conn, newest, top).await?,
        best_ratings: cards(&mut conn, best, top).await?,
        top_sellings: cards(&mut conn, selling, top).await?,
    })
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewsletterRequest {
    #[validate(email(message = "email is not valid"))]
    pub email: String,
}

pub async fn subscribe_newsletter(state: &AppState, req: &NewsletterRequest, ip_address: &str) -> Result<()> {
    req.validate()?;
    let mut conn = state.db.acquire().await?;
    catalog::add_newsletter(&mut conn, &req.email, ip_address).await?;
    info!(ip_address, "newsletter subscription stored");
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopFilter {
    pub categories: Vec<NamedCount>,
    pub brands: Vec<NamedCount>,
    pub top_sellings: Vec<ProductCard>,
    pub price_min: Decimal,
    pub price_max: Decimal,
}

pub async fn shop_filter(state: &AppState) -> Result<ShopFilter> {
    let mut conn = state.db.acquire().await?;
    let top = catalog::top_rating(&mut conn).await?;
    let selling = catalog::ranked_products(&mut conn, Ranking::TopSelling, 3, None).await?;
    let (price_min, price_max) = catalog::price_range(&mut conn).await?;
    Ok(ShopFilter {
        categories: catalog::category_counts(&mut conn).await?,
        brands: catalog::brand_counts(&mut conn).await?,
        top_sellings: cards(&mut conn, selling, top).await?,
        price_min,
        price_max,
    })
}

/// Query string of the shop list. Id lists arrive comma separated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "order_by")]
    pub order_by: Option<String>,
    #[serde(rename = "order_dir")]
    pub order_dir: Option<String>,
}

/// Parses `"1, 2,x,3"` into `[1, 2, 3]`; unparsable entries are skipped.
pub fn parse_id_list(raw: Option<&str>) -> Vec<i64> {
    raw.unwrap_or_default().split(',').filter_map(|s| s.trim().parse().ok()).collect()
}

impl ShopQuery {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            categories: parse_id_list(self.category.as_deref()),
            brands: parse_id_list(self.brand.as_deref()),
            price_min: self.price_min,
            price_max: self.price_max,
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn sort(&self, filter: &ProductFilter) -> &'static str {
        let default = if filter.has_price_range() { "price" } else { "id" };
        sort_column(self.order_by.as_deref(), PRODUCT_SORT_COLUMNS, default)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopList {
    pub list: Vec<ProductCard>,
    pub total_all: i64,
    pub total_filtered: i64,
    pub limit: i64,
    pub page: i64,
}

#[instrument(skip(state))]
pub async fn shop_list(state: &AppState, query: &ShopQuery) -> Result<ShopList> {
    if let (Some(min), Some(max)) = (query.price_min, query.price_max) {
        if min > max {
            return Err(AppError::Validation("priceMin must not exceed priceMax".into()));
        }
    }
    let filter = query.filter();
    let sort = query.sort(&filter);
    let dir = SortDir::parse(query.order_dir.as_deref());
    let page = Page::new(query.page, query.limit, SHOP_PAGE_SIZE);

    let mut conn = state.db.acquire().await?;
    let top = catalog::top_rating(&mut conn).await?;
    let total_all = catalog::count_published(&mut conn).await?;
    let total_filtered = catalog::count_filtered(&mut conn, &filter).await?;
    let products = catalog::list_filtered(&mut conn, &filter, sort, dir, page).await?;

    Ok(ShopList {
        list: cards(&mut conn, products, top).await?,
        total_all,
        total_filtered,
        limit: page.limit,
        page: page.page,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub product: ProductCard,
    pub images: Vec<ProductImage>,
    pub product_related: Vec<ProductCard>,
    pub sizes: Vec<Size>,
    pub colours: Vec<Colour>,
    pub inventories: Vec<Inventory>,
}

#[instrument(skip(state))]
pub async fn product_page(state: &AppState, product_id: i64) -> Result<ProductPage> {
    let mut conn = state.db.acquire().await?;
    let product = catalog::published_product(&mut conn, product_id).await?.ok_or_else(|| AppError::not_found("Product"))?;
    let top = catalog::top_rating(&mut conn).await?;
    let related = catalog::ranked_products(&mut conn, Ranking::TopSelling, 3, Some(product_id)).await?;

    let mut product = cards(&mut conn, vec![product], top).await?;
    let product = product.pop().ok_or_else(|| AppError::not_found("Product"))?;
    Ok(ProductPage {
        product,
        images: catalog::images(&mut conn, product_id).await?,
        product_related: cards(&mut conn, related, top).await?,
        sizes: catalog::active_sizes(&mut conn).await?,
        colours: catalog::active_colours(&mut conn).await?,
        inventories: catalog::inventories(&mut conn, product_id).await?,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub review: Option<String>,
    /// Stars relative to the best review of the product.
    pub rating: u8,
    pub percentage: u8,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub async fn reviews(state: &AppState, product_id: i64) -> Result<Vec<ReviewView>> {
    let mut conn = state.db.acquire().await?;
    let rows = catalog::reviews(&mut conn, product_id).await?;
    let top = rows.iter().map(|r| r.rating).max().unwrap_or(0);
    Ok(rows
        .into_iter()
        .map(|r| ReviewView {
            id: r.id,
            user_id: r.user_id,
            name: [r.first_name, r.last_name].into_iter().flatten().collect::<Vec<_>>().join(" "),
            review: r.review,
            rating: rating_stars(r.rating, top),
            percentage: rating_percentage(r.rating, top),
            created_at: r.created_at,
        })
        .collect())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(length(min = 1, max = 2000, message = "review is required"))]
    pub review: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
}

#[instrument(skip(state, req), fields(rating = req.rating))]
pub async fn create_review(state: &AppState, user_id: i64, product_id: i64, req: &ReviewRequest) -> Result<()> {
    req.validate()?;
    let mut tx = state.db.begin().await?;
    let product = catalog::published_product(&mut tx, product_id).await?.ok_or_else(|| AppError::not_found("Product"))?;
    catalog::create_review(&mut tx, product_id, user_id, req.rating, req.review.trim()).await?;

    let event = DomainEvent::Catalog(CatalogEvent::ReviewCreated { user_id, product_id, product_name: product.name });
    activity::record(&mut tx, &event).await?;
    tx.commit().await?;
    state.events.publish(&event).await;
    Ok(())
}

#[instrument(skip(state))]
pub async fn add_to_wishlist(state: &AppState, user_id: i64, product_id: i64) -> Result<()> {
    let mut tx = state.db.begin().await?;
    catalog::published_product(&mut tx, product_id).await?.ok_or_else(|| AppError::not_found("Product"))?;
    catalog::add_to_wishlist(&mut tx, user_id, product_id).await?;

    let event = DomainEvent::Catalog(CatalogEvent::WishlistAdded { user_id, product_id });
    activity::record(&mut tx, &event).await?;
    tx.commit().await?;
    state.events.publish(&event).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list(Some("1, 2,x,,3")), vec![1, 2, 3]);
        assert!(parse_id_list(None).is_empty());
    }

    #[test]
    fn test_shop_sort_defaults() {
        let query = ShopQuery::default();
        assert_eq!(query.sort(&query.filter()), "id");

        let priced = ShopQuery { price_min: Some(dec!(10)), ..Default::default() };
        assert_eq!(priced.sort(&priced.filter()), "price");

        let explicit = ShopQuery { order_by: Some("total_rating".into()), price_max: Some(dec!(99)), ..Default::default() };
        assert_eq!(explicit.sort(&explicit.filter()), "total_rating");

        let hostile = ShopQuery { order_by: Some("price desc; --".into()), ..Default::default() };
        assert_eq!(hostile.sort(&hostile.filter()), "id");
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let query = ShopQuery { search: Some("   ".into()), ..Default::default() };
        assert!(query.filter().search.is_none());
    }

    #[test]
    fn test_review_rating_bounds() {
        let ok = ReviewRequest { review: "Great fit".into(), rating: 5 };
        assert!(ok.validate().is_ok());
        assert!(ReviewRequest { rating: 6, ..ok.clone() }.validate().is_err());
        assert!(ReviewRequest { rating: 0, ..ok }.validate().is_err());
    }
}
