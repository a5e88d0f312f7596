//! Stock position across a product catalog.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::Product;

/// A product at or below its reorder level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub product_id: String,
    pub shop_id: String,
    pub name: String,
    pub current_stock: i64,
    pub min_stock_level: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub product_count: usize,
    pub total_units: i64,
    /// Stock valued at buying price.
    pub stock_value: Money,
    /// Stock valued at minimum selling price.
    pub retail_value: Money,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    /// Lowest stock first.
    pub low_stock: Vec<LowStockItem>,
}

impl InventorySummary {
    pub fn compute(products: &[Product]) -> Self {
        let mut summary = InventorySummary {
            product_count: products.len(),
            ..InventorySummary::default()
        };

        for product in products {
            let units = product.current_stock.max(0);
            summary.total_units = summary.total_units.saturating_add(units);
            summary.stock_value += product.stock_value();
            summary.retail_value += product.min_selling_price.multiply_quantity(units);

            if product.is_out_of_stock() {
                summary.out_of_stock_count += 1;
            }
            if product.is_low_stock() {
                summary.low_stock.push(LowStockItem {
                    product_id: product.id.clone(),
                    shop_id: product.shop_id.clone(),
                    name: product.name.clone(),
                    current_stock: product.current_stock,
                    min_stock_level: product.min_stock_level,
                });
            }
        }

        summary.low_stock.sort_by(|a, b| {
            a.current_stock
                .cmp(&b.current_stock)
                .then_with(|| a.name.cmp(&b.name))
        });
        summary.low_stock_count = summary.low_stock.len();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::product;
    use super::*;

    #[test]
    fn test_empty_inventory() {
        assert_eq!(InventorySummary::compute(&[]), InventorySummary::default());
    }

    #[test]
    fn test_inventory_summary() {
        let products = vec![
            product("p-1", 100, 20, 5),
            product("p-2", 50, 5, 5),
            product("p-3", 10, 0, 2),
        ];
        let s = InventorySummary::compute(&products);

        assert_eq!(s.product_count, 3);
        assert_eq!(s.total_units, 25);
        assert_eq!(s.stock_value, Money::from_units(2250));
        assert_eq!(s.retail_value, Money::from_units(2500));
        assert_eq!(s.out_of_stock_count, 1);
        assert_eq!(s.low_stock_count, 2);
        assert_eq!(s.low_stock[0].product_id, "p-3");
        assert_eq!(s.low_stock[1].product_id, "p-2");
    }

    #[test]
    fn test_oversized_prices_saturate() {
        let json = r#"{
            "id": "p-1", "shopId": "s-1", "name": "Gold bar",
            "buyingPrice": 1e17, "minSellingPrice": 1e17,
            "currentStock": 10, "minStockLevel": 1,
            "createdAt": "2024-03-01T09:00:00Z", "updatedAt": "2024-03-01T09:00:00Z"
        }"#;
        let gold: crate::types::Product = serde_json::from_str(json).unwrap();
        let s = InventorySummary::compute(&[gold.clone(), gold]);

        assert_eq!(s.stock_value.cents(), i64::MAX);
        assert_eq!(s.retail_value.cents(), i64::MAX);
        assert_eq!(s.total_units, 20);
    }
}
