use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::pagination::PageSource;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{Product, ProductCursor, ProductRecord, Review, ReviewDraft};
use crate::schema::{products, reviews};

use super::models::{NewReviewRow, ProductFields, ProductRow, ReviewRow};

#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn fields(record: &ProductRecord) -> ProductFields<'_> {
    ProductFields {
        code: record.draft.code.trim(),
        name: record.draft.name.trim(),
        description: record.draft.description.trim(),
        price: &record.draft.price,
        unmissable_offer: record.draft.unmissable_offer,
        image_url: &record.image_url,
    }
}

impl PageSource for DieselProductRepository {
    type Item = Product;
    type Filter = ();
    type Cursor = ProductCursor;

    fn count(&self, _: &()) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(products::table.count().get_result(&mut conn)?)
    }

    fn cursor_at(&self, _: &(), position: i64) -> Result<Option<ProductCursor>, DomainError> {
        let mut conn = self.pool.get()?;
        let key = products::table
            .select((products::code, products::id))
            .order((products::code.asc(), products::id.asc()))
            .offset(position)
            .first::<(String, Uuid)>(&mut conn)
            .optional()?;
        Ok(key.map(|(code, id)| ProductCursor { code, id }))
    }

    fn page_after(
        &self,
        _: &(),
        after: Option<&ProductCursor>,
        limit: i64,
    ) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = products::table
            .select(ProductRow::as_select())
            .order((products::code.asc(), products::id.asc()))
            .limit(limit)
            .into_boxed();
        if let Some(c) = after {
            query = query.filter(
                products::code
                    .gt(c.code.clone())
                    .or(products::code.eq(c.code.clone()).and(products::id.gt(c.id))),
            );
        }
        let rows = query.load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn cursor_of(item: &Product) -> ProductCursor {
        ProductCursor::from(item)
    }
}

impl ProductRepository for DieselProductRepository {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn insert(&self, record: ProductRecord) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(products::table)
            .values((products::id.eq(Uuid::new_v4()), fields(&record)))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update(&self, id: Uuid, record: ProductRecord) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(products::table.find(id))
            .set((fields(&record), products::updated_at.eq(Utc::now())))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        row.map(Product::from).ok_or(DomainError::NotFound)
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        // Reviews go with the product (ON DELETE CASCADE).
        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    fn add_review(&self, product_id: Uuid, review: ReviewDraft) -> Result<Review, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(reviews::table)
            .values(&NewReviewRow {
                id: Uuid::new_v4(),
                product_id,
                reviewer_name: &review.reviewer_name,
                rating: review.rating,
                comment: &review.comment,
            })
            .returning(ReviewRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = reviews::table
            .filter(reviews::product_id.eq(product_id))
            .select(ReviewRow::as_select())
            .order((reviews::review_date.desc(), reviews::id.desc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Review::from).collect())
    }
}
