use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Double;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use productsmgmt_core::pagination::{
    PaginatedResult, PaginationRequest, ProductSortField, SortDirection,
};
use productsmgmt_core::products::{Product, ProductRepositoryTrait};
use productsmgmt_core::{Error, Result};

use super::model::{NewProductDB, ProductChangesDB, ProductDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{is_unique_violation, StorageError};
use crate::schema::products;

pub struct ProductRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ProductRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ProductRepository { pool, writer }
    }

    fn first_where_code(&self, product_code: &str) -> Result<Option<ProductDB>> {
        let mut conn = get_connection(&self.pool)?;
        let row = products::table
            .filter(products::code.eq(product_code))
            .select(ProductDB::as_select())
            .first::<ProductDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row)
    }
}

#[async_trait]
impl ProductRepositoryTrait for ProductRepository {
    fn load(&self, product_id: i64) -> Result<Product> {
        let mut conn = get_connection(&self.pool)?;
        let row = products::table
            .find(product_id)
            .select(ProductDB::as_select())
            .first::<ProductDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| Error::ProductNotFound(format!("Product with id {} not found", product_id)))?;
        Ok(Product::try_from(row)?)
    }

    fn find_by_code(&self, product_code: &str) -> Result<Option<Product>> {
        match self.first_where_code(product_code)? {
            Some(row) => Ok(Some(Product::try_from(row)?)),
            None => Ok(None),
        }
    }

    fn code_exists(&self, product_code: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let exists = diesel::select(diesel::dsl::exists(
            products::table.filter(products::code.eq(product_code)),
        ))
        .get_result::<bool>(&mut conn)
        .map_err(StorageError::from)?;
        Ok(exists)
    }

    fn find_all(&self, request: &PaginationRequest) -> Result<PaginatedResult<Product>> {
        request.validate()?;
        let mut conn = get_connection(&self.pool)?;

        let total = products::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;

        let mut query = products::table
            .select(ProductDB::as_select())
            .into_boxed();

        let descending = request.direction == SortDirection::Desc;
        // Prices are stored as text; order them numerically.
        let price = || sql::<Double>("CAST(price AS REAL)");
        query = match (request.sort_by, descending) {
            (ProductSortField::Id, false) => query.order(products::id.asc()),
            (ProductSortField::Id, true) => query.order(products::id.desc()),
            (ProductSortField::Code, false) => query.order(products::code.asc()),
            (ProductSortField::Code, true) => query.order(products::code.desc()),
            (ProductSortField::Name, false) => query.order(products::name.asc()),
            (ProductSortField::Name, true) => query.order(products::name.desc()),
            (ProductSortField::Price, false) => query.order(price().asc()),
            (ProductSortField::Price, true) => query.order(price().desc()),
        };

        let rows = query
            .then_order_by(products::id.asc())
            .offset(request.offset())
            .limit(request.size)
            .load::<ProductDB>(&mut conn)
            .map_err(StorageError::from)?;

        let items = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(PaginatedResult::new(items, total, request.size))
    }

    async fn insert(&self, product: Product) -> Result<Product> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Product> {
                let mut new_product_db = NewProductDB::from(&product);
                new_product_db.version = 1;

                let result_db = diesel::insert_into(products::table)
                    .values(&new_product_db)
                    .returning(ProductDB::as_returning())
                    .get_result::<ProductDB>(conn)
                    .map_err(|e| {
                        if is_unique_violation(&e) {
                            Error::DuplicateProductCode(new_product_db.code.clone())
                        } else {
                            StorageError::from(e).into()
                        }
                    })?;
                debug!("Inserted product {} with id {}", result_db.code, result_db.id);
                Ok(Product::try_from(result_db)?)
            })
            .await
    }

    async fn save(&self, product: Product, expected_version: i64) -> Result<Product> {
        let product_id = product.id;
        let changes = ProductChangesDB::versioned(&product, expected_version + 1);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Product> {
                let updated = diesel::update(
                    products::table
                        .filter(products::id.eq(product_id))
                        .filter(products::version.eq(expected_version)),
                )
                .set(&changes)
                .returning(ProductDB::as_returning())
                .get_result::<ProductDB>(conn)
                .optional()
                .map_err(StorageError::from)?;

                if let Some(row) = updated {
                    return Ok(Product::try_from(row)?);
                }

                let actual_version = products::table
                    .find(product_id)
                    .select(products::version)
                    .first::<i64>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                match actual_version {
                    None => Err(Error::ProductNotFound(format!("Product with id {} not found", product_id))),
                    Some(actual) => Err(Error::ConcurrentModification {
                        product_id,
                        expected_version,
                        actual_version: Some(actual),
                    }),
                }
            })
            .await
    }
}
