//! In-memory aggregations over orders: history grouping by calendar period,
//! per-group status summaries, and top-selling products.
//!
//! These are bounded, single-pass aggregations over lists already fetched
//! from the database; nothing here talks to I/O.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use terra_verde_core::{OrderStatus, ProductId};

use crate::models::{Order, OrderItem};

/// How many products the top-sellers list returns.
const TOP_PRODUCT_LIMIT: usize = 10;

/// Calendar granularity for order history grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(format!("invalid granularity: {s}")),
        }
    }
}

/// Group label for a timestamp at the given granularity.
///
/// Day labels are the localized calendar date ("15/07/2023"); month labels
/// are "<month>/<year>" with the month unpadded ("7/2023"); year labels are
/// the year ("2023").
#[must_use]
pub fn group_label(ts: DateTime<Utc>, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => ts.format("%d/%m/%Y").to_string(),
        Granularity::Month => format!("{}/{}", ts.month(), ts.year()),
        Granularity::Year => ts.year().to_string(),
    }
}

/// Per-status order counts within one group. One field per known status;
/// the typed [`OrderStatus`] makes an uncounted status unrepresentable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub shipped: usize,
    pub delivered: usize,
}

impl StatusCounts {
    /// Count one order.
    pub const fn record(&mut self, status: OrderStatus) {
        match status {
            OrderStatus::Pending => self.pending += 1,
            OrderStatus::Processing => self.processing += 1,
            OrderStatus::Shipped => self.shipped += 1,
            OrderStatus::Delivered => self.delivered += 1,
        }
    }

    /// Total orders counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.pending + self.processing + self.shipped + self.delivered
    }
}

/// One group of the order history: a label, the orders that fall under it,
/// and the derived summaries.
#[derive(Debug, Clone, Serialize)]
pub struct OrderGroup {
    /// Group label (see [`group_label`]).
    pub label: String,
    /// Sum of the grouped orders' totals.
    pub total: Decimal,
    /// Orders per status.
    pub status_counts: StatusCounts,
    /// The grouped orders, in input order.
    pub orders: Vec<Order>,
}

/// Group orders by calendar period.
///
/// Groups are sorted by label descending, lexicographically - NOT
/// calendar-aware. Unpadded month labels sort "9/2023" above "10/2023"; the
/// quirk is inherited from the original sort and kept reproducible.
///
/// An optional filter keeps only groups whose label contains the substring.
/// Every input order lands in exactly one group before filtering.
#[must_use]
pub fn group_orders(
    orders: Vec<Order>,
    granularity: Granularity,
    filter: Option<&str>,
) -> Vec<OrderGroup> {
    let mut grouped: HashMap<String, OrderGroup> = HashMap::new();

    for order in orders {
        let label = group_label(order.created_at, granularity);
        let group = grouped.entry(label.clone()).or_insert_with(|| OrderGroup {
            label,
            total: Decimal::ZERO,
            status_counts: StatusCounts::default(),
            orders: Vec::new(),
        });
        group.total += order.total;
        group.status_counts.record(order.status);
        group.orders.push(order);
    }

    let mut groups: Vec<OrderGroup> = grouped
        .into_values()
        .filter(|group| filter.is_none_or(|needle| group.label.contains(needle)))
        .collect();
    groups.sort_by(|a, b| b.label.cmp(&a.label));
    groups
}

/// Labels of the history groups currently expanded in the UI.
///
/// In-memory only; the set resets when the view reloads.
#[derive(Debug, Default)]
pub struct ExpandedGroups {
    open: HashSet<String>,
}

impl ExpandedGroups {
    /// Create an empty set (everything collapsed).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a label; returns whether it is open afterwards.
    pub fn toggle(&mut self, label: &str) -> bool {
        if self.open.remove(label) {
            false
        } else {
            self.open.insert(label.to_string());
            true
        }
    }

    /// Whether a label is currently expanded.
    #[must_use]
    pub fn is_open(&self, label: &str) -> bool {
        self.open.contains(label)
    }
}

/// Aggregate sales for one product across all orders.
#[derive(Debug, Clone, Serialize)]
pub struct TopProduct {
    /// The product.
    pub product_id: ProductId,
    /// First-seen product name; later line items never overwrite it.
    pub name: String,
    /// First-seen product image, if any.
    pub image: Option<String>,
    /// Total quantity sold.
    pub quantity: i64,
    /// Total revenue.
    pub revenue: Decimal,
}

/// The ten best-selling products by total quantity across all line items.
///
/// Sorted descending by quantity; ties fall in map-iteration order, which is
/// unspecified and not guaranteed stable between calls.
#[must_use]
pub fn top_products(items: &[OrderItem]) -> Vec<TopProduct> {
    let mut by_product: HashMap<ProductId, TopProduct> = HashMap::new();

    for item in items {
        let entry = by_product
            .entry(item.product_id)
            .or_insert_with(|| TopProduct {
                product_id: item.product_id,
                name: item.product_name.clone(),
                image: item.product_image.clone(),
                quantity: 0,
                revenue: Decimal::ZERO,
            });
        entry.quantity += i64::from(item.quantity);
        entry.revenue += item.line_total;
    }

    let mut ranked: Vec<TopProduct> = by_product.into_values().collect();
    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    ranked.truncate(TOP_PRODUCT_LIMIT);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;
    use terra_verde_core::{ClientId, OrderId, OrderItemId};

    fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 10, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    fn order(id: i32, created_at: DateTime<Utc>, status: OrderStatus, total: i64) -> Order {
        Order {
            id: OrderId::new(id),
            client_id: ClientId::new(1),
            status,
            total: Decimal::new(total, 2),
            created_at,
        }
    }

    fn item(order_id: i32, product_id: i32, name: &str, quantity: i32, cents: i64) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(order_id * 100 + product_id),
            order_id: OrderId::new(order_id),
            product_id: ProductId::new(product_id),
            product_name: name.to_string(),
            product_image: None,
            quantity,
            unit_price: Decimal::new(cents, 2),
            line_total: Decimal::new(cents * i64::from(quantity), 2),
        }
    }

    // =========================================================================
    // Labels
    // =========================================================================

    #[test]
    fn test_day_label_is_padded_date() {
        assert_eq!(group_label(ts(2023, 7, 15), Granularity::Day), "15/07/2023");
        assert_eq!(group_label(ts(2023, 7, 4), Granularity::Day), "04/07/2023");
    }

    #[test]
    fn test_month_label_is_unpadded() {
        assert_eq!(group_label(ts(2023, 7, 15), Granularity::Month), "7/2023");
        assert_eq!(group_label(ts(2023, 11, 2), Granularity::Month), "11/2023");
    }

    #[test]
    fn test_year_label() {
        assert_eq!(group_label(ts(2023, 7, 15), Granularity::Year), "2023");
    }

    // =========================================================================
    // Grouping
    // =========================================================================

    #[test]
    fn test_day_grouping_example() {
        // Two orders on 15/07/2023 and one on 14/07/2023.
        let orders = vec![
            order(1, ts(2023, 7, 15), OrderStatus::Pending, 1000),
            order(2, ts(2023, 7, 14), OrderStatus::Delivered, 2000),
            order(3, ts(2023, 7, 15), OrderStatus::Shipped, 3000),
        ];

        let groups = group_orders(orders, Granularity::Day, None);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "15/07/2023");
        assert_eq!(groups[0].orders.len(), 2);
        assert_eq!(groups[1].label, "14/07/2023");
        assert_eq!(groups[1].orders.len(), 1);
    }

    #[test]
    fn test_grouping_partitions_input() {
        let orders: Vec<Order> = (0..30)
            .map(|i| {
                order(
                    i,
                    ts(2022 + i % 3, 1 + u32::try_from(i % 12).expect("in range"), 1 + u32::try_from(i % 28).expect("in range")),
                    OrderStatus::ALL[usize::try_from(i % 4).expect("in range")],
                    100 * i64::from(i + 1),
                )
            })
            .collect();
        let input_len = orders.len();

        for granularity in [Granularity::Day, Granularity::Month, Granularity::Year] {
            let groups = group_orders(orders.clone(), granularity, None);

            let mut seen: HashSet<i32> = HashSet::new();
            for group in &groups {
                for order in &group.orders {
                    assert!(
                        seen.insert(order.id.as_i32()),
                        "order {} appears in more than one group",
                        order.id
                    );
                }
            }
            assert_eq!(seen.len(), input_len, "orders lost at {granularity:?}");
        }
    }

    #[test]
    fn test_group_totals_and_status_counts() {
        let orders = vec![
            order(1, ts(2023, 7, 15), OrderStatus::Pending, 1050),
            order(2, ts(2023, 7, 15), OrderStatus::Pending, 2000),
            order(3, ts(2023, 7, 15), OrderStatus::Delivered, 950),
        ];

        let groups = group_orders(orders, Granularity::Day, None);
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        assert_eq!(group.total, Decimal::new(4000, 2));
        assert_eq!(group.status_counts.pending, 2);
        assert_eq!(group.status_counts.delivered, 1);
        assert_eq!(group.status_counts.total(), group.orders.len());
    }

    #[test]
    fn test_status_counts_sum_to_group_size() {
        let orders: Vec<Order> = (0..17)
            .map(|i| {
                order(
                    i,
                    ts(2023, 7, 15),
                    OrderStatus::ALL[usize::try_from(i % 4).expect("in range")],
                    500,
                )
            })
            .collect();

        let groups = group_orders(orders, Granularity::Day, None);
        for group in groups {
            assert_eq!(group.status_counts.total(), group.orders.len());
        }
    }

    #[test]
    fn test_sort_is_descending_lexicographic() {
        let orders = vec![
            order(1, ts(2023, 9, 1), OrderStatus::Pending, 100),
            order(2, ts(2023, 10, 1), OrderStatus::Pending, 100),
            order(3, ts(2023, 11, 1), OrderStatus::Pending, 100),
        ];

        let groups = group_orders(orders, Granularity::Month, None);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();

        // Lexicographic, not calendar order: "9/2023" sorts above "11/2023"
        // and "10/2023" because '9' > '1'.
        assert_eq!(labels, vec!["9/2023", "11/2023", "10/2023"]);
    }

    #[test]
    fn test_filter_restricts_groups() {
        let orders = vec![
            order(1, ts(2023, 7, 15), OrderStatus::Pending, 100),
            order(2, ts(2023, 7, 14), OrderStatus::Pending, 100),
            order(3, ts(2023, 8, 1), OrderStatus::Pending, 100),
        ];

        let groups = group_orders(orders, Granularity::Day, Some("/07/"));
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["15/07/2023", "14/07/2023"]);
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_orders(Vec::new(), Granularity::Day, None).is_empty());
    }

    // =========================================================================
    // Expansion state
    // =========================================================================

    #[test]
    fn test_expanded_groups_toggle() {
        let mut expanded = ExpandedGroups::new();
        assert!(!expanded.is_open("15/07/2023"));

        assert!(expanded.toggle("15/07/2023"));
        assert!(expanded.is_open("15/07/2023"));

        assert!(!expanded.toggle("15/07/2023"));
        assert!(!expanded.is_open("15/07/2023"));
    }

    // =========================================================================
    // Top products
    // =========================================================================

    #[test]
    fn test_top_products_accumulates_per_product() {
        let items = vec![
            item(1, 10, "Tomatoes", 3, 500),
            item(2, 10, "Tomatoes", 2, 500),
            item(2, 11, "Lettuce", 4, 300),
        ];

        let top = top_products(&items);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, ProductId::new(10));
        assert_eq!(top[0].quantity, 5);
        assert_eq!(top[0].revenue, Decimal::new(2500, 2));
        assert_eq!(top[1].quantity, 4);
    }

    #[test]
    fn test_top_products_quantity_total_matches_items() {
        let items: Vec<OrderItem> = (0..40)
            .map(|i| item(i, i % 7, "Produce", 1 + i % 5, 250))
            .collect();
        let total_quantity: i64 = items.iter().map(|i| i64::from(i.quantity)).sum();

        let top = top_products(&items);
        let aggregated: i64 = top.iter().map(|p| p.quantity).sum();
        // 7 distinct products, all within the cap, so nothing is dropped.
        assert_eq!(aggregated, total_quantity);
    }

    #[test]
    fn test_top_products_caps_at_ten() {
        let items: Vec<OrderItem> = (0..15).map(|i| item(1, i, "Produce", i + 1, 100)).collect();

        let top = top_products(&items);
        assert_eq!(top.len(), 10);
        // Highest quantities survive the cut.
        assert_eq!(top[0].quantity, 15);
        assert_eq!(top[9].quantity, 6);
    }

    #[test]
    fn test_top_products_first_seen_name_wins() {
        let mut renamed = item(2, 10, "Heirloom Tomatoes", 1, 500);
        renamed.product_image = Some("new.jpg".to_string());
        let items = vec![item(1, 10, "Tomatoes", 1, 500), renamed];

        let top = top_products(&items);
        assert_eq!(top[0].name, "Tomatoes");
        assert_eq!(top[0].image, None);
    }

    #[test]
    fn test_top_products_empty() {
        assert!(top_products(&[]).is_empty());
    }
}
