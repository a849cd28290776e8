//! Client-side aggregation of vending orders into dashboard buckets and rollups.
//!
//! Every function here is a pure transform over immutable slices: the same snapshot always
//! produces the same output. Calendar boundaries ("today", "this week", hour of day) are taken
//! in the time zone passed by the caller, so the service passes `chrono::Local` and tests pass a
//! fixed offset.
//!
//! Revenue is `price × quantity` with the product price at retrieval time. Orders do not carry
//! a price snapshot, so historical revenue drifts when a price is edited.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};

use crate::config::{HourRange, MAX_DAILY_WINDOW_DAYS};
use crate::models::analytics::{
    DailyBucket, DataQuality, HourlyBucket, ProductSalesEntry, RefStatus, ResolvedOrder,
    StatusBreakdown, SummaryStats, TimeRange, UNRESOLVED_LABEL,
};
use crate::models::order::{Order, OrderStatus, ProductRef, Reference, UserRef};
use crate::models::product::Product;
use crate::models::user::User;

/// Join orders with their product and user.
///
/// Populated references win, with missing fields filled from the catalogs by id. A reference
/// that cannot be resolved yields price 0 and the `N/A` placeholder, marked `Unresolved`.
pub fn resolve_orders(orders: &[Order], products: &[Product], users: &[User]) -> Vec<ResolvedOrder> {
    let product_index: HashMap<&str, &Product> =
        products.iter().map(|p| (p.id.as_str(), p)).collect();
    let user_index: HashMap<&str, &User> = users.iter().map(|u| (u.id.as_str(), u)).collect();

    orders
        .iter()
        .map(|order| {
            let product = resolve_product(order.product.as_ref(), &product_index);
            let user = resolve_user(order.user.as_ref(), &user_index);
            ResolvedOrder {
                id: order.id.clone(),
                product_name: product.name,
                slot_number: product.slot_number,
                unit_price: product.price,
                user_name: user.name,
                rfid_tag: user.rfid_tag,
                quantity: order.quantity,
                status: order.status,
                device_response: order.device_response.clone(),
                created_at: order.created_at,
                product_ref: product.status,
                user_ref: user.status,
            }
        })
        .collect()
}

struct ProductJoin {
    name: String,
    slot_number: Option<i64>,
    price: f64,
    status: RefStatus,
}

struct UserJoin {
    name: String,
    rfid_tag: Option<String>,
    status: RefStatus,
}

fn resolve_product(
    reference: Option<&Reference<ProductRef>>,
    catalog: &HashMap<&str, &Product>,
) -> ProductJoin {
    let embedded = reference.and_then(Reference::populated);
    let listed = reference
        .and_then(|r| r.id())
        .and_then(|id| catalog.get(id).copied());

    let name = embedded
        .and_then(|doc| doc.name.clone())
        .or_else(|| listed.map(|p| p.name.clone()));

    match name {
        Some(name) => ProductJoin {
            name,
            slot_number: embedded
                .and_then(|doc| doc.slot_number)
                .or_else(|| listed.map(|p| p.slot_number)),
            price: embedded
                .and_then(|doc| doc.price)
                .or_else(|| listed.map(|p| p.price))
                .unwrap_or(0.0),
            status: RefStatus::Resolved,
        },
        None => ProductJoin {
            name: UNRESOLVED_LABEL.to_string(),
            slot_number: None,
            price: 0.0,
            status: RefStatus::Unresolved,
        },
    }
}

fn resolve_user(reference: Option<&Reference<UserRef>>, catalog: &HashMap<&str, &User>) -> UserJoin {
    let embedded = reference.and_then(Reference::populated);
    let listed = reference
        .and_then(|r| r.id())
        .and_then(|id| catalog.get(id).copied());

    let name = embedded
        .and_then(|doc| doc.name.clone())
        .or_else(|| listed.map(|u| u.name.clone()));

    match name {
        Some(name) => UserJoin {
            name,
            rfid_tag: embedded
                .and_then(|doc| doc.rfid_tag.clone())
                .or_else(|| listed.map(|u| u.rfid_tag.clone())),
            status: RefStatus::Resolved,
        },
        None => UserJoin {
            name: UNRESOLVED_LABEL.to_string(),
            rfid_tag: None,
            status: RefStatus::Unresolved,
        },
    }
}

/// One bucket per hour in `range`, zero-filled. Orders outside the range are skipped.
pub fn bucket_by_hour<Tz: TimeZone>(
    orders: &[ResolvedOrder],
    range: HourRange,
    tz: &Tz,
) -> Vec<HourlyBucket> {
    let mut buckets: Vec<HourlyBucket> = (range.start()..=range.end())
        .map(|hour| HourlyBucket {
            hour,
            hour_label: format!("{hour}:00"),
            transaction_count: 0,
            revenue_sum: 0.0,
        })
        .collect();

    for order in orders {
        let hour = order.created_at.with_timezone(tz).hour();
        if !range.contains(hour) {
            continue;
        }
        let bucket = &mut buckets[(hour - range.start()) as usize];
        bucket.transaction_count += 1;
        bucket.revenue_sum += order.revenue();
    }

    buckets
}

/// One bucket per calendar day for the `window_days` days ending on `today`, oldest first.
///
/// The window is capped at `MAX_DAILY_WINDOW_DAYS`.
pub fn bucket_by_day<Tz: TimeZone>(
    orders: &[ResolvedOrder],
    window_days: u32,
    today: NaiveDate,
    tz: &Tz,
) -> Vec<DailyBucket> {
    let window_days = window_days.min(MAX_DAILY_WINDOW_DAYS);
    let first_day = today - Duration::days(i64::from(window_days)) + Duration::days(1);

    let mut buckets: Vec<DailyBucket> = (0..window_days)
        .map(|offset| {
            let date = first_day + Duration::days(i64::from(offset));
            DailyBucket {
                date,
                date_label: date.format("%b %-d").to_string(),
                revenue_sum: 0.0,
                transaction_count: 0,
            }
        })
        .collect();

    for order in orders {
        let day = local_date(&order.created_at, tz);
        let offset = (day - first_day).num_days();
        if offset < 0 || offset >= i64::from(window_days) {
            continue;
        }
        let bucket = &mut buckets[offset as usize];
        bucket.transaction_count += 1;
        bucket.revenue_sum += order.revenue();
    }

    buckets
}

/// Units and revenue per product name, highest units first.
///
/// Products with equal units keep the order in which they were first encountered.
pub fn top_products_by_sales(orders: &[ResolvedOrder], limit: usize) -> Vec<ProductSalesEntry> {
    let mut entries: Vec<ProductSalesEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for order in orders {
        let slot = *index.entry(order.product_name.as_str()).or_insert_with(|| {
            entries.push(ProductSalesEntry {
                product_name: order.product_name.clone(),
                units_sold: 0,
                revenue_sum: 0.0,
                unresolved_reference: false,
            });
            entries.len() - 1
        });
        let entry = &mut entries[slot];
        entry.units_sold += u64::from(order.quantity);
        entry.revenue_sum += order.revenue();
        entry.unresolved_reference |= order.product_ref == RefStatus::Unresolved;
    }

    // `sort_by` is stable, which preserves encounter order among ties.
    entries.sort_by(|a, b| b.units_sold.cmp(&a.units_sold));
    entries.truncate(limit);
    entries
}

/// Headline statistics over raw lists. Resolves orders against `products` and `users` first.
pub fn compute_summary_stats<Tz: TimeZone>(
    products: &[Product],
    orders: &[Order],
    users: &[User],
    low_stock_threshold: i64,
    today: NaiveDate,
    tz: &Tz,
) -> SummaryStats {
    let resolved = resolve_orders(orders, products, users);
    summarize(products, &resolved, users, low_stock_threshold, today, tz)
}

/// Headline statistics over orders that were already resolved.
pub fn summarize<Tz: TimeZone>(
    products: &[Product],
    orders: &[ResolvedOrder],
    users: &[User],
    low_stock_threshold: i64,
    today: NaiveDate,
    tz: &Tz,
) -> SummaryStats {
    let total_revenue: f64 = orders.iter().map(ResolvedOrder::revenue).sum();
    let total_transactions = orders.len() as u64;
    let today_revenue: f64 = orders
        .iter()
        .filter(|o| local_date(&o.created_at, tz) == today)
        .map(ResolvedOrder::revenue)
        .sum();
    let low_stock_count = products
        .iter()
        .filter(|p| is_low_stock(p.stock, low_stock_threshold))
        .count() as u64;

    SummaryStats {
        total_revenue,
        total_transactions,
        low_stock_count,
        total_products: products.len() as u64,
        today_revenue,
        average_order_value: average(total_revenue, total_transactions),
        total_users: users.len() as u64,
    }
}

/// Stock strictly below the threshold needs replenishment.
pub fn is_low_stock(stock: i64, threshold: i64) -> bool {
    stock < threshold
}

/// Orders whose local calendar date falls inside `range` relative to `today`.
pub fn filter_by_range<Tz: TimeZone>(
    orders: &[ResolvedOrder],
    range: TimeRange,
    today: NaiveDate,
    tz: &Tz,
) -> Vec<ResolvedOrder> {
    orders
        .iter()
        .filter(|order| {
            let day = local_date(&order.created_at, tz);
            match range {
                TimeRange::Today => day == today,
                TimeRange::Week => day.iso_week() == today.iso_week(),
                TimeRange::Month => day.year() == today.year() && day.month() == today.month(),
            }
        })
        .cloned()
        .collect()
}

pub fn status_breakdown(orders: &[ResolvedOrder]) -> StatusBreakdown {
    let mut breakdown = StatusBreakdown::default();
    for order in orders {
        match order.status {
            OrderStatus::Pending => breakdown.pending += 1,
            OrderStatus::Dispensed => breakdown.dispensed += 1,
            OrderStatus::Failed => breakdown.failed += 1,
            OrderStatus::Unknown => breakdown.unknown += 1,
        }
    }
    let total = orders.len() as u64;
    breakdown.success_rate = average(breakdown.dispensed as f64 * 100.0, total);
    breakdown
}

/// Busiest hourly bucket; the earliest wins ties. `None` when no bucket has transactions.
pub fn peak_hour(buckets: &[HourlyBucket]) -> Option<HourlyBucket> {
    buckets
        .iter()
        .filter(|b| b.transaction_count > 0)
        .fold(None, |best: Option<&HourlyBucket>, bucket| match best {
            Some(current) if current.transaction_count >= bucket.transaction_count => Some(current),
            _ => Some(bucket),
        })
        .cloned()
}

/// Join failures among `orders`, plus records dropped before they could be joined.
pub fn data_quality(orders: &[ResolvedOrder], skipped_orders: u64) -> DataQuality {
    DataQuality {
        unresolved_products: orders
            .iter()
            .filter(|o| o.product_ref == RefStatus::Unresolved)
            .count() as u64,
        unresolved_users: orders
            .iter()
            .filter(|o| o.user_ref == RefStatus::Unresolved)
            .count() as u64,
        skipped_orders,
    }
}

/// The `count` newest orders, newest first.
pub fn recent_orders(orders: &[ResolvedOrder], count: usize) -> Vec<ResolvedOrder> {
    let mut sorted = orders.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(count);
    sorted
}

fn local_date<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

fn average(sum: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
