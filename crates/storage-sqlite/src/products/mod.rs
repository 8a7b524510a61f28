//! SQLite storage implementation for products.

mod model;
mod repository;


pub use model::{NewProductDB, ProductChangesDB, ProductDB};
pub use repository::ProductRepository;
