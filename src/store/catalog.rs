use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;

use crate::store::models::{Category, Colour, Inventory, NamedCount, Payment, Product, ProductImage, Review, Size, WishlistProduct};
use crate::store::{like_pattern, Page, SortDir};

const PRODUCT_COLUMNS: &str = "products.id, products.brand_id, products.image, products.sku, products.name, products.price, products.total_order, products.total_rating, products.description, products.details, products.status, products.published_at";
const PUBLISHED: &str = "products.status = 1 AND products.published_at <= NOW()";

pub const PRODUCT_SORT_COLUMNS: &[&str] = &["id", "name", "price", "total_order", "total_rating", "published_at", "created_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking { Newest, BestRated, TopSelling }

impl Ranking {
    fn order_by(&self) -> &'static str {
        match self {
            Self::Newest => "products.id DESC",
            Self::BestRated => "products.total_rating DESC, products.id DESC",
            Self::TopSelling => "products.total_order DESC, products.id DESC",
        }
    }
}

/// Published products ranked one way, optionally leaving one product out.
pub async fn ranked_products(conn: &mut PgConnection, ranking: Ranking, limit: i64, exclude: Option<i64>) -> sqlx::Result<Vec<Product>> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE {PUBLISHED} AND products.id <> COALESCE($2::BIGINT, 0) ORDER BY {} LIMIT $1",
        ranking.order_by()
    ))
    .bind(limit).bind(exclude).fetch_all(conn).await
}

pub async fn published_product(conn: &mut PgConnection, id: i64) -> sqlx::Result<Option<Product>> {
    sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE {PUBLISHED} AND products.id = $1"))
        .bind(id).fetch_optional(conn).await
}

/// Highest `total_rating` among published products; the reference for star ratings.
pub async fn top_rating(conn: &mut PgConnection) -> sqlx::Result<i32> {
    let (top,): (Option<i32>,) = sqlx::query_as(&format!("SELECT MAX(products.total_rating) FROM products WHERE {PUBLISHED}"))
        .fetch_one(conn).await?;
    Ok(top.unwrap_or(0))
}

pub async fn price_range(conn: &mut PgConnection) -> sqlx::Result<(Decimal, Decimal)> {
    let (min, max): (Option<Decimal>, Option<Decimal>) = sqlx::query_as(&format!("SELECT MIN(products.price), MAX(products.price) FROM products WHERE {PUBLISHED}"))
        .fetch_one(conn).await?;
    Ok((min.unwrap_or_default(), max.unwrap_or_default()))
}

/// Category names per product, in name order.
pub async fn category_names(conn: &mut PgConnection, product_ids: &[i64]) -> sqlx::Result<HashMap<i64, Vec<String>>> {
    let rows: Vec<(i64, String)> = sqlx::query_as(
        "SELECT products_categories.product_id, categories.name FROM products_categories INNER JOIN categories ON categories.id = products_categories.category_id WHERE products_categories.product_id = ANY($1) ORDER BY categories.name",
    )
    .bind(product_ids).fetch_all(conn).await?;
    let mut names: HashMap<i64, Vec<String>> = HashMap::new();
    for (product_id, name) in rows { names.entry(product_id).or_default().push(name); }
    Ok(names)
}

pub async fn active_categories(conn: &mut PgConnection, displayed_only: bool, limit: Option<i64>) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>("SELECT id, image, name, description, displayed FROM categories WHERE status = 1 AND (NOT $1 OR displayed = 1) ORDER BY name ASC LIMIT $2")
        .bind(displayed_only).bind(limit).fetch_all(conn).await
}

pub async fn category_counts(conn: &mut PgConnection) -> sqlx::Result<Vec<NamedCount>> {
    sqlx::query_as::<_, NamedCount>(
        "SELECT categories.id, categories.name, COUNT(*) AS total FROM categories INNER JOIN products_categories ON products_categories.category_id = categories.id GROUP BY categories.id, categories.name ORDER BY categories.name ASC",
    )
    .fetch_all(conn).await
}

pub async fn brand_counts(conn: &mut PgConnection) -> sqlx::Result<Vec<NamedCount>> {
    sqlx::query_as::<_, NamedCount>(
        "SELECT brands.id, brands.name, COUNT(*) AS total FROM brands INNER JOIN products ON products.brand_id = brands.id GROUP BY brands.id, brands.name ORDER BY brands.name ASC",
    )
    .fetch_all(conn).await
}

pub async fn images(conn: &mut PgConnection, product_id: i64) -> sqlx::Result<Vec<ProductImage>> {
    sqlx::query_as::<_, ProductImage>("SELECT id, product_id, path, sort FROM products_images WHERE product_id = $1 ORDER BY sort ASC, id DESC")
        .bind(product_id).fetch_all(conn).await
}

pub async fn active_sizes(conn: &mut PgConnection) -> sqlx::Result<Vec<Size>> {
    sqlx::query_as::<_, Size>("SELECT id, name, description FROM sizes WHERE status = 1 ORDER BY name ASC").fetch_all(conn).await
}

pub async fn active_colours(conn: &mut PgConnection) -> sqlx::Result<Vec<Colour>> {
    sqlx::query_as::<_, Colour>("SELECT id, code, name, description FROM colours WHERE status = 1 ORDER BY name ASC").fetch_all(conn).await
}

pub async fn active_payments(conn: &mut PgConnection) -> sqlx::Result<Vec<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT id, name, description FROM payments WHERE status = 1 ORDER BY name ASC").fetch_all(conn).await
}

pub async fn active_payment(conn: &mut PgConnection, id: i64) -> sqlx::Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT id, name, description FROM payments WHERE status = 1 AND id = $1")
        .bind(id).fetch_optional(conn).await
}

pub async fn inventories(conn: &mut PgConnection, product_id: i64) -> sqlx::Result<Vec<Inventory>> {
    sqlx::query_as::<_, Inventory>("SELECT id, product_id, size_id, colour_id, stock FROM products_inventories WHERE product_id = $1 ORDER BY id")
        .bind(product_id).fetch_all(conn).await
}

pub async fn find_variant(conn: &mut PgConnection, product_id: i64, size_id: i64, colour_id: i64) -> sqlx::Result<Option<Inventory>> {
    sqlx::query_as::<_, Inventory>("SELECT id, product_id, size_id, colour_id, stock FROM products_inventories WHERE product_id = $1 AND size_id = $2 AND colour_id = $3 ORDER BY id DESC LIMIT 1")
        .bind(product_id).bind(size_id).bind(colour_id).fetch_optional(conn).await
}

pub async fn reviews(conn: &mut PgConnection, product_id: i64) -> sqlx::Result<Vec<Review>> {
    sqlx::query_as::<_, Review>(
        "SELECT products_reviews.id, products_reviews.product_id, products_reviews.user_id, users.first_name, users.last_name, products_reviews.rating, products_reviews.review, products_reviews.created_at FROM products_reviews INNER JOIN users ON users.id = products_reviews.user_id WHERE products_reviews.product_id = $1 ORDER BY products_reviews.id DESC",
    )
    .bind(product_id).fetch_all(conn).await
}

pub async fn create_review(conn: &mut PgConnection, product_id: i64, user_id: i64, rating: i32, review: &str) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO products_reviews (product_id, user_id, rating, review, status) VALUES ($1, $2, $3, $4, 1)")
        .bind(product_id).bind(user_id).bind(rating).bind(review).execute(&mut *conn).await?;
    sqlx::query("UPDATE products SET total_rating = total_rating + $2, updated_at = NOW() WHERE id = $1")
        .bind(product_id).bind(rating).execute(conn).await?;
    Ok(())
}

pub async fn wishlist(conn: &mut PgConnection, user_id: i64) -> sqlx::Result<Vec<WishlistProduct>> {
    sqlx::query_as::<_, WishlistProduct>(
        "SELECT products.id, products.image, products.name, products.price FROM products INNER JOIN products_wishlists ON products_wishlists.product_id = products.id WHERE products_wishlists.user_id = $1 ORDER BY products.name",
    )
    .bind(user_id).fetch_all(conn).await
}

pub async fn add_to_wishlist(conn: &mut PgConnection, user_id: i64, product_id: i64) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO products_wishlists (user_id, product_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(user_id).bind(product_id).execute(conn).await?;
    Ok(())
}

pub async fn remove_from_wishlist(conn: &mut PgConnection, user_id: i64, product_id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM products_wishlists WHERE user_id = $1 AND product_id = $2")
        .bind(user_id).bind(product_id).execute(conn).await?;
    Ok(())
}

pub async fn add_newsletter(conn: &mut PgConnection, email: &str, ip_address: &str) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO newsletters (email, ip_address, status) VALUES ($1, $2, 1)")
        .bind(email.trim()).bind(ip_address).execute(conn).await?;
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub categories: Vec<i64>,
    pub brands: Vec<i64>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn has_price_range(&self) -> bool { self.price_min.is_some() || self.price_max.is_some() }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE ").push(PUBLISHED);
        if !self.categories.is_empty() {
            qb.push(" AND EXISTS (SELECT 1 FROM products_categories WHERE products_categories.product_id = products.id AND products_categories.category_id = ANY(")
                .push_bind(self.categories.clone()).push("))");
        }
        if !self.brands.is_empty() {
            qb.push(" AND products.brand_id = ANY(").push_bind(self.brands.clone()).push(")");
        }
        if let Some(min) = self.price_min { qb.push(" AND products.price >= ").push_bind(min); }
        if let Some(max) = self.price_max { qb.push(" AND products.price <= ").push_bind(max); }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            qb.push(" AND (products.name ILIKE ").push_bind(pattern.clone())
                .push(" OR products.sku ILIKE ").push_bind(pattern.clone())
                .push(" OR products.description ILIKE ").push_bind(pattern).push(")");
        }
    }
}

pub async fn count_published(conn: &mut PgConnection) -> sqlx::Result<i64> {
    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM products WHERE {PUBLISHED}")).fetch_one(conn).await?;
    Ok(total)
}

pub async fn count_filtered(conn: &mut PgConnection, filter: &ProductFilter) -> sqlx::Result<i64> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
    filter.push_where(&mut qb);
    let (total,): (i64,) = qb.build_query_as().fetch_one(conn).await?;
    Ok(total)
}

/// `sort` must come from [`PRODUCT_SORT_COLUMNS`].
pub async fn list_filtered(conn: &mut PgConnection, filter: &ProductFilter, sort: &'static str, dir: SortDir, page: Page) -> sqlx::Result<Vec<Product>> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
    filter.push_where(&mut qb);
    qb.push(format!(" ORDER BY products.{sort} {}, products.id DESC", dir.as_sql()))
        .push(" LIMIT ").push_bind(page.limit)
        .push(" OFFSET ").push_bind(page.offset());
    qb.build_query_as::<Product>().fetch_all(conn).await
}

/// The payment method attached to a freshly opened cart: the first active one.
pub async fn default_payment(conn: &mut PgConnection) -> sqlx::Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT id, name, description FROM payments WHERE status = 1 ORDER BY id ASC LIMIT 1")
        .fetch_optional(conn).await
}
