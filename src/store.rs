//! SQLite persistence for scraped products.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::product::Product;

const CREATE_TABLE: &str = "CREATE TABLE products (
    type TEXT,
    title TEXT,
    price TEXT,
    description TEXT
)";

const INSERT_PRODUCT: &str = "INSERT INTO products VALUES (?1, ?2, ?3, ?4)";

/// A single connection to the products database.
pub struct ProductStore {
    conn: Connection,
}

impl ProductStore {
    /// Opens the database file, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database {}", path.display()))?;
        Ok(Self { conn })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Creates the `products` table.
    ///
    /// There is no existence check: running against a database that already
    /// holds the table fails with "table products already exists".
    pub fn create_table(&self) -> Result<()> {
        self.conn
            .execute(CREATE_TABLE, [])
            .context("failed to create products table")?;
        Ok(())
    }

    /// Inserts one row outside of any explicit transaction.
    pub fn insert(&self, product: &Product) -> Result<()> {
        insert_row(&self.conn, product)
    }

    /// Inserts all products in a single transaction and commits.
    ///
    /// Returns the number of rows written. Nothing is committed if any insert
    /// fails.
    pub fn insert_all(&mut self, products: &[Product]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for product in products {
            insert_row(&tx, product)?;
        }
        tx.commit().context("failed to commit products")?;
        Ok(products.len())
    }

    /// Reads every stored row back in insertion order.
    pub fn products(&self) -> Result<Vec<Product>> {
        let mut stmt = self
            .conn
            .prepare("SELECT type, title, price, description FROM products ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok(Product {
                category: row.get(0)?,
                title: row.get(1)?,
                price: row.get(2)?,
                description: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Closes the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("failed to close database")
    }
}

fn insert_row(conn: &Connection, product: &Product) -> Result<()> {
    conn.execute(
        INSERT_PRODUCT,
        params![
            product.category,
            product.title,
            product.price,
            product.description
        ],
    )
    .with_context(|| format!("failed to insert product {:?}", product.title))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(category: &str, title: &str, price: &str) -> Product {
        Product {
            category: category.to_string(),
            title: title.to_string(),
            price: price.to_string(),
            description: format!("{title} description"),
        }
    }

    #[test]
    fn test_insert_all_round_trips_rows() {
        let mut store = ProductStore::open_in_memory().unwrap();
        store.create_table().unwrap();

        let rows = vec![
            product("Skincare", "Glow Serum", "$42.00"),
            product("Makeup", "Lip Tint", "$18"),
        ];
        assert_eq!(store.insert_all(&rows).unwrap(), 2);
        assert_eq!(store.products().unwrap(), rows);
    }

    #[test]
    fn test_single_insert() {
        let store = ProductStore::open_in_memory().unwrap();
        store.create_table().unwrap();
        store.insert(&product("Hair", "Argan Oil", "$30")).unwrap();

        let stored = store.products().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].price, "$30");
    }

    #[test]
    fn test_price_kept_as_text() {
        let store = ProductStore::open_in_memory().unwrap();
        store.create_table().unwrap();
        store.insert(&product("Tools", "Brush", "012.50")).unwrap();

        let price: String = store
            .conn
            .query_row("SELECT price FROM products", [], |row| row.get(0))
            .unwrap();
        assert_eq!(price, "012.50");
    }

    #[test]
    fn test_insert_without_table_fails() {
        let mut store = ProductStore::open_in_memory().unwrap();
        let err = store
            .insert_all(&[product("Skincare", "Glow Serum", "$42.00")])
            .unwrap_err();
        assert!(format!("{err:#}").contains("no such table"));
    }

    #[test]
    fn test_create_table_twice_fails() {
        let path = std::env::temp_dir().join(format!(
            "beautylish-scrape-twice-{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let first = ProductStore::open(&path).unwrap();
        first.create_table().unwrap();
        first.close().unwrap();

        let second = ProductStore::open(&path).unwrap();
        let err = second.create_table().unwrap_err();
        assert!(err.downcast_ref::<rusqlite::Error>().is_some());
        assert!(format!("{err:#}").contains("already exists"));
        second.close().unwrap();

        std::fs::remove_file(&path).unwrap();
    }
}
