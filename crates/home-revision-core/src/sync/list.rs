use chrono::{DateTime, Utc};

use crate::models::Product;
use crate::utils::format_age;

/// The session's products, in server order.
#[derive(Debug, Clone, Default)]
pub struct ProductList {
    products: Vec<Product>,
    fetched_at: Option<DateTime<Utc>>,
}

impl ProductList {
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Replace everything with a fresh server listing
    pub fn replace_all(&mut self, products: Vec<Product>) {
        self.products = products;
        self.fetched_at = Some(Utc::now());
    }

    /// Swap in the new value of an existing product. Returns false if the
    /// id is no longer listed.
    pub fn replace(&mut self, product: Product) -> bool {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => {
                *slot = product;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        self.products.len() != before
    }

    pub fn clear(&mut self) {
        self.products.clear();
        self.fetched_at = None;
    }

    /// "5m ago" style age of the last listing, or "never"
    pub fn age_display(&self) -> String {
        match self.fetched_at {
            Some(at) => format_age(at, Utc::now()),
            None => "never".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;

    fn product(id: i64, title: &str) -> Product {
        Product {
            id,
            user_id: 1,
            title: title.to_string(),
            description: None,
            quantity: 1,
            target_quantity: 2,
            unit: Unit::Piece,
        }
    }

    fn listed() -> ProductList {
        let mut list = ProductList::default();
        list.replace_all(vec![product(1, "Salt"), product(2, "Sugar"), product(3, "Tea")]);
        list
    }

    #[test]
    fn test_replace_all_keeps_server_order() {
        let list = listed();
        let ids: Vec<i64> = list.products().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(list.fetched_at().is_some());
        assert_eq!(list.age_display(), "just now");
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut list = listed();
        assert!(list.remove(2));
        let ids: Vec<i64> = list.products().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(!list.remove(2));
    }

    #[test]
    fn test_replace_by_id() {
        let mut list = listed();
        assert!(list.replace(product(3, "Green tea")));
        assert_eq!(list.get(3).map(|p| p.title.as_str()), Some("Green tea"));
        assert_eq!(list.len(), 3);
        assert!(!list.replace(product(9, "Ghost")));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_later_replace_wins() {
        let mut list = listed();
        list.replace(Product { quantity: 4, ..product(1, "Salt") });
        list.replace(Product { quantity: 7, ..product(1, "Salt") });
        assert_eq!(list.get(1).map(|p| p.quantity), Some(7));
    }

    #[test]
    fn test_clear() {
        let mut list = listed();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.age_display(), "never");
    }
}
