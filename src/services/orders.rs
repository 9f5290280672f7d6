use std::collections::HashSet;

use jiff::{
    SignedDuration, Timestamp,
    civil::{Date, DateTime},
    tz::TimeZone,
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::order::{Order, OrderStatus},
    storage::{ORDERS_KEY, Storage, StorageError},
};

const MIN_ID_NUMBER: u16 = 1000;
const MAX_ID_NUMBER: u16 = 9999;
const RANDOM_ID_ATTEMPTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    BuyerName,
    Details,
    DeliveryDate,
    Price,
    Progress,
    CreatedAt,
}

impl OrderField {
    pub fn name(self) -> &'static str {
        match self {
            OrderField::BuyerName => "buyerName",
            OrderField::Details => "details",
            OrderField::DeliveryDate => "deliveryDate",
            OrderField::Price => "price",
            OrderField::Progress => "progress",
            OrderField::CreatedAt => "createdAt",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: OrderField,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid order: {}", format_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} ({})", v.message, v.field.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn fields(&self) -> Vec<OrderField> {
        self.violations.iter().map(|v| v.field).collect()
    }

    pub fn has(&self, field: OrderField) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

#[derive(Default)]
struct Violations(Vec<FieldViolation>);

impl Violations {
    fn push(&mut self, field: OrderField, message: &str) {
        self.0.push(FieldViolation {
            field,
            message: message.to_string(),
        });
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_error(self) -> ValidationError {
        ValidationError { violations: self.0 }
    }

    fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}

#[derive(Debug, Error)]
pub enum CreateOrderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("All order ids between OR-1000 and OR-9999 are taken")]
    IdSpaceExhausted,
}

#[derive(Debug, Error)]
pub enum UpdateOrderError {
    #[error("Order '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum DeleteOrderError {
    #[error("Order '{0}' not found")]
    NotFound(String),
}

/// Result of a mutation. The in-memory change always stands; `warning` carries
/// the persistence failure if the collection could not be written.
#[derive(Debug)]
pub struct Saved<T> {
    pub value: T,
    pub warning: Option<StorageError>,
}

impl<T> Saved<T> {
    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }
}

/// Raw form input for a new order
#[derive(Debug, Clone, Default)]
pub struct NewOrderParameters {
    pub buyer_name: String,
    pub details: String,
    pub delivery_date: String,
    pub price: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListTab {
    /// Everything not yet completed
    #[default]
    Running,
    /// Completed orders
    Archive,
}

pub struct OrderStore<S: Storage> {
    orders: Vec<Order>,
    storage: S,
    time_zone: TimeZone,
}

impl<S: Storage> OrderStore<S> {
    /// Load the persisted collection, seeding the demo orders on first run.
    pub fn open(storage: S, time_zone: TimeZone, now: Timestamp) -> Result<Self, StorageError> {
        match storage.get(ORDERS_KEY)? {
            Some(raw) => {
                let orders: Vec<Order> =
                    serde_json::from_str(&raw).map_err(|e| StorageError::ParseFailed {
                        key: ORDERS_KEY.to_string(),
                        source: e,
                    })?;
                let orders = normalize_loaded(orders);
                tracing::debug!(count = orders.len(), "loaded orders");
                Ok(Self {
                    orders,
                    storage,
                    time_zone,
                })
            }
            None => {
                let store = Self {
                    orders: demo_orders(now),
                    storage,
                    time_zone,
                };
                tracing::info!(count = store.orders.len(), "no saved orders, seeded demo data");
                store.persist()?;
                Ok(store)
            }
        }
    }

    /// Orders newest-first
    pub fn list(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn time_zone(&self) -> &TimeZone {
        &self.time_zone
    }

    pub fn create(
        &mut self,
        parameters: NewOrderParameters,
        now: Timestamp,
    ) -> Result<Saved<Order>, CreateOrderError> {
        // 1. Validate every field before giving up, so the caller can show all problems
        let mut violations = Violations::default();

        let buyer_name = capitalize_first(parameters.buyer_name.trim());
        if buyer_name.is_empty() {
            violations.push(OrderField::BuyerName, "Buyer name is required");
        }

        let details = parameters.details.trim().to_string();
        if details.is_empty() {
            violations.push(OrderField::Details, "Details are required");
        }

        let delivery_date = if parameters.delivery_date.trim().is_empty() {
            violations.push(OrderField::DeliveryDate, "Delivery date is required");
            None
        } else {
            let parsed = parse_deadline(&parameters.delivery_date, &self.time_zone);
            if parsed.is_none() {
                violations.push(OrderField::DeliveryDate, "Delivery date is not a valid date");
            }
            parsed
        };

        let price = match parameters.price.trim().parse::<f64>() {
            Ok(price) if price.is_finite() && price >= 0.0 => Some(price),
            _ => {
                violations.push(OrderField::Price, "Valid price is required");
                None
            }
        };

        let (delivery_date, price) = match (delivery_date, price) {
            (Some(delivery_date), Some(price)) if violations.is_empty() => (delivery_date, price),
            _ => return Err(violations.into_error().into()),
        };

        // 2. Pick an id not used by any existing order
        let id = self.next_order_id()?;

        let order = Order {
            id,
            buyer_name,
            details,
            delivery_date,
            price,
            notes: parameters
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            status: OrderStatus::NotStarted,
            progress: 0,
            created_at: now,
        };

        // 3. Newest first
        self.orders.insert(0, order.clone());
        tracing::info!(id = %order.id, buyer = %order.buyer_name, "order created");

        Ok(Saved {
            value: order,
            warning: self.persist_or_warn(),
        })
    }

    /// Replace the stored order with the same id. Buyer name and details are
    /// trimmed, and the buyer name capitalized, the same way `create` does.
    pub fn update(&mut self, mut order: Order) -> Result<Saved<Order>, UpdateOrderError> {
        let index = self
            .orders
            .iter()
            .position(|o| o.id == order.id)
            .ok_or_else(|| UpdateOrderError::NotFound(order.id.clone()))?;

        order.buyer_name = capitalize_first(order.buyer_name.trim());
        order.details = order.details.trim().to_string();
        validate_existing(&order, &self.orders[index])?;

        self.orders[index] = order.clone();
        tracing::info!(id = %order.id, status = ?order.status, progress = order.progress, "order updated");

        Ok(Saved {
            value: order,
            warning: self.persist_or_warn(),
        })
    }

    pub fn set_status(
        &mut self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Saved<Order>, UpdateOrderError> {
        let mut order = self.require(id)?;
        order.status = status;
        self.update(order)
    }

    pub fn set_progress(&mut self, id: &str, progress: u8) -> Result<Saved<Order>, UpdateOrderError> {
        let mut order = self.require(id)?;
        order.progress = progress;
        self.update(order)
    }

    /// Hand the work over: DELIVERED at 100%.
    pub fn mark_delivered(&mut self, id: &str) -> Result<Saved<Order>, UpdateOrderError> {
        self.finish(id, OrderStatus::Delivered)
    }

    /// Close the order: COMPLETED at 100%, moves it to the archive.
    pub fn mark_completed(&mut self, id: &str) -> Result<Saved<Order>, UpdateOrderError> {
        self.finish(id, OrderStatus::Completed)
    }

    pub fn delete(&mut self, id: &str) -> Result<Saved<Order>, DeleteOrderError> {
        let index = self
            .orders
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| DeleteOrderError::NotFound(id.to_string()))?;

        let removed = self.orders.remove(index);
        tracing::info!(id = %removed.id, "order deleted");

        Ok(Saved {
            value: removed,
            warning: self.persist_or_warn(),
        })
    }

    fn finish(&mut self, id: &str, status: OrderStatus) -> Result<Saved<Order>, UpdateOrderError> {
        let mut order = self.require(id)?;
        order.status = status;
        order.progress = 100;
        self.update(order)
    }

    fn require(&self, id: &str) -> Result<Order, UpdateOrderError> {
        self.get(id)
            .cloned()
            .ok_or_else(|| UpdateOrderError::NotFound(id.to_string()))
    }

    fn next_order_id(&self) -> Result<String, CreateOrderError> {
        let taken: HashSet<&str> = self.orders.iter().map(|o| o.id.as_str()).collect();
        let span = u128::from(MAX_ID_NUMBER - MIN_ID_NUMBER + 1);

        for _ in 0..RANDOM_ID_ATTEMPTS {
            let number = MIN_ID_NUMBER + (Uuid::new_v4().as_u128() % span) as u16;
            let candidate = format_order_id(number);
            if !taken.contains(candidate.as_str()) {
                return Ok(candidate);
            }
        }

        // Crowded id space, fall back to the first free slot
        (MIN_ID_NUMBER..=MAX_ID_NUMBER)
            .map(format_order_id)
            .find(|candidate| !taken.contains(candidate.as_str()))
            .ok_or(CreateOrderError::IdSpaceExhausted)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&self.orders).map_err(|e| {
            StorageError::SerializeFailed {
                key: ORDERS_KEY.to_string(),
                source: e,
            }
        })?;
        self.storage.set(ORDERS_KEY, &json)
    }

    fn persist_or_warn(&self) -> Option<StorageError> {
        match self.persist() {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "order change kept in memory but not saved");
                Some(e)
            }
        }
    }
}

fn format_order_id(number: u16) -> String {
    format!("OR-{number}")
}

fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn validate_existing(order: &Order, stored: &Order) -> Result<(), ValidationError> {
    let mut violations = Violations::default();
    if order.buyer_name.trim().is_empty() {
        violations.push(OrderField::BuyerName, "Buyer name is required");
    }
    if order.details.trim().is_empty() {
        violations.push(OrderField::Details, "Details are required");
    }
    if !order.price.is_finite() || order.price < 0.0 {
        violations.push(OrderField::Price, "Valid price is required");
    }
    if order.progress > 100 {
        violations.push(OrderField::Progress, "Progress must be between 0 and 100");
    }
    if order.created_at != stored.created_at {
        violations.push(OrderField::CreatedAt, "Creation time cannot be changed");
    }
    violations.into_result()
}

/// Accepts an RFC 3339 timestamp, a civil datetime in `tz`, or a bare date
/// meaning the last second of that day in `tz`.
pub fn parse_deadline(input: &str, tz: &TimeZone) -> Option<Timestamp> {
    let input = input.trim();
    if let Ok(timestamp) = input.parse::<Timestamp>() {
        return Some(timestamp);
    }
    let has_time = input.contains(['T', 't', ' ']);
    let datetime = if has_time {
        input.parse::<DateTime>().ok()?
    } else {
        input.parse::<Date>().ok()?.at(23, 59, 59, 0)
    };
    datetime.to_zoned(tz.clone()).ok().map(|z| z.timestamp())
}

/// Clamp out-of-range progress and drop repeated ids left behind by older writers.
fn normalize_loaded(orders: Vec<Order>) -> Vec<Order> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(orders.len());

    for mut order in orders {
        if !seen.insert(order.id.clone()) {
            tracing::warn!(id = %order.id, "dropping order with duplicate id");
            continue;
        }
        if order.progress > 100 {
            tracing::warn!(id = %order.id, progress = order.progress, "clamping progress to 100");
            order.progress = 100;
        }
        normalized.push(order);
    }

    normalized
}

/// Orders matching the tab and a case-insensitive term in buyer name or details.
pub fn filter_orders<'a>(orders: &'a [Order], tab: ListTab, search: &str) -> Vec<&'a Order> {
    let needle = search.trim().to_lowercase();
    orders
        .iter()
        .filter(|o| match tab {
            ListTab::Running => o.status != OrderStatus::Completed,
            ListTab::Archive => o.status == OrderStatus::Completed,
        })
        .filter(|o| {
            needle.is_empty()
                || o.buyer_name.to_lowercase().contains(&needle)
                || o.details.to_lowercase().contains(&needle)
        })
        .collect()
}

/// First-run sample data, one order per interesting state.
pub fn demo_orders(now: Timestamp) -> Vec<Order> {
    let hours = |h: i64| SignedDuration::from_hours(h);
    let demo = |id: &str,
                buyer: &str,
                details: &str,
                due_in: SignedDuration,
                price: f64,
                status: OrderStatus,
                progress: u8,
                age: SignedDuration| Order {
        id: id.to_string(),
        buyer_name: buyer.to_string(),
        details: details.to_string(),
        delivery_date: now + due_in,
        price,
        notes: None,
        status,
        progress,
        created_at: now - age,
    };

    vec![
        demo(
            "OR-7821",
            "Alex Thompson",
            "Logo Design for Fintech Startup",
            hours(36),
            150.0,
            OrderStatus::InProgress,
            45,
            hours(48),
        ),
        demo(
            "OR-8922",
            "Sarah Jenkins",
            "React Frontend Development (3 Pages)",
            hours(96),
            850.0,
            OrderStatus::NotStarted,
            0,
            hours(5),
        ),
        demo(
            "OR-1023",
            "Global Media Inc.",
            "SEO Copywriting for Blog Posts",
            hours(5),
            45.0,
            OrderStatus::Review,
            85,
            hours(72),
        ),
        demo(
            "OR-1104",
            "Creative Souls",
            "Social Media Kit - Instagram/Facebook",
            hours(-2),
            120.0,
            OrderStatus::Overdue,
            90,
            hours(24),
        ),
        demo(
            "OR-1205",
            "Mike Peterson",
            "Shopify Store Optimization",
            hours(12),
            300.0,
            OrderStatus::InProgress,
            60,
            hours(48),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn now() -> Timestamp {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    fn empty_store() -> OrderStore<MemoryStorage> {
        OrderStore::open(MemoryStorage::with_entry(ORDERS_KEY, "[]"), TimeZone::UTC, now())
            .unwrap()
    }

    fn parameters(buyer: &str, details: &str, due: &str, price: &str) -> NewOrderParameters {
        NewOrderParameters {
            buyer_name: buyer.to_string(),
            details: details.to_string(),
            delivery_date: due.to_string(),
            price: price.to_string(),
            notes: None,
        }
    }

    fn stored_orders(store: &OrderStore<MemoryStorage>) -> Vec<Order> {
        let raw = store.storage().get(ORDERS_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_open_seeds_demo_orders_and_persists_them() {
        let storage = MemoryStorage::new();
        let store = OrderStore::open(&storage, TimeZone::UTC, now()).unwrap();

        assert_eq!(store.list().len(), 5);
        assert_eq!(store.list()[0].id, "OR-7821");
        assert_eq!(storage.writes(), 1);
    }

    #[test]
    fn test_open_fails_on_corrupt_collection() {
        let storage = MemoryStorage::with_entry(ORDERS_KEY, "{ not json");
        match OrderStore::open(storage, TimeZone::UTC, now()) {
            Err(StorageError::ParseFailed { key, .. }) => assert_eq!(key, ORDERS_KEY),
            Err(e) => panic!("Expected ParseFailed, got {e}"),
            Ok(_) => panic!("Expected ParseFailed, got a store"),
        }
    }

    #[test]
    fn test_open_normalizes_loaded_orders() {
        let mut orders = demo_orders(now());
        orders[0].progress = 150;
        orders[1].id = orders[0].id.clone();
        let raw = serde_json::to_string(&orders).unwrap();

        let store =
            OrderStore::open(MemoryStorage::with_entry(ORDERS_KEY, &raw), TimeZone::UTC, now())
                .unwrap();

        assert_eq!(store.list().len(), 4);
        assert_eq!(store.list()[0].progress, 100);
    }

    #[test]
    fn test_create_sets_defaults_and_prepends() {
        let mut store = empty_store();
        store
            .create(parameters("first", "x", "2025-06-02T12:00:00Z", "10"), now())
            .unwrap();
        let saved = store
            .create(parameters("  bob ", " Website ", "2025-06-03T12:00:00Z", "99.5"), now())
            .unwrap();

        let order = saved.value;
        assert!(saved.warning.is_none());
        assert_eq!(order.buyer_name, "Bob");
        assert_eq!(order.details, "Website");
        assert_eq!(order.status, OrderStatus::NotStarted);
        assert_eq!(order.progress, 0);
        assert_eq!(order.created_at, now());
        assert_eq!(order.price, 99.5);
        assert_eq!(store.list()[0].id, order.id);
        assert_eq!(store.list().len(), 2);
        assert_eq!(stored_orders(&store)[0].id, order.id);
    }

    #[test]
    fn test_create_generates_well_formed_unique_ids() {
        let mut store = empty_store();
        for _ in 0..50 {
            store
                .create(parameters("A", "B", "2025-06-03T12:00:00Z", "1"), now())
                .unwrap();
        }

        let ids: HashSet<&str> = store.list().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids.len(), 50);
        for id in ids {
            let number: u16 = id.strip_prefix("OR-").unwrap().parse().unwrap();
            assert!((MIN_ID_NUMBER..=MAX_ID_NUMBER).contains(&number));
        }
    }

    #[test]
    fn test_create_reports_every_invalid_field() {
        let mut store = empty_store();
        let result = store.create(parameters(" ", "", "", "-3"), now());

        match result {
            Err(CreateOrderError::Validation(e)) => {
                assert_eq!(
                    e.fields(),
                    vec![
                        OrderField::BuyerName,
                        OrderField::Details,
                        OrderField::DeliveryDate,
                        OrderField::Price
                    ]
                );
            }
            other => panic!("Expected validation error, got {:?}", other.map(|s| s.value)),
        }
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_create_rejects_unparseable_values() {
        let mut store = empty_store();
        let result = store.create(parameters("A", "B", "next friday", "ten"), now());

        match result {
            Err(CreateOrderError::Validation(e)) => {
                assert!(e.has(OrderField::DeliveryDate));
                assert!(e.has(OrderField::Price));
                assert!(!e.has(OrderField::BuyerName));
            }
            other => panic!("Expected validation error, got {:?}", other.map(|s| s.value)),
        }
    }

    #[test]
    fn test_parse_deadline_formats() {
        let tz = TimeZone::fixed(jiff::tz::offset(2));
        assert_eq!(
            parse_deadline("2025-06-01T12:00:00Z", &tz),
            Some("2025-06-01T12:00:00Z".parse().unwrap())
        );
        assert_eq!(
            parse_deadline("2025-06-01T14:30", &tz),
            Some("2025-06-01T12:30:00Z".parse().unwrap())
        );
        assert_eq!(
            parse_deadline("2025-06-01", &tz),
            Some("2025-06-01T21:59:59Z".parse().unwrap())
        );
        assert_eq!(parse_deadline("soon", &tz), None);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut store = empty_store();
        let mut order = demo_orders(now()).remove(0);
        order.id = String::from("OR-0001");

        match store.update(order) {
            Err(UpdateOrderError::NotFound(id)) => assert_eq!(id, "OR-0001"),
            other => panic!("Expected NotFound, got {:?}", other.map(|s| s.value)),
        }
    }

    #[test]
    fn test_update_rejects_out_of_range_progress_and_created_at_change() {
        let mut store = empty_store();
        let created = store
            .create(parameters("A", "B", "2025-06-03T12:00:00Z", "1"), now())
            .unwrap()
            .value;

        let mut edited = created.clone();
        edited.progress = 101;
        edited.created_at = now() + SignedDuration::from_secs(1);

        match store.update(edited) {
            Err(UpdateOrderError::Validation(e)) => {
                assert_eq!(e.fields(), vec![OrderField::Progress, OrderField::CreatedAt]);
            }
            other => panic!("Expected validation error, got {:?}", other.map(|s| s.value)),
        }
        assert_eq!(store.get(&created.id), Some(&created));
    }

    #[test]
    fn test_update_normalizes_buyer_and_details() {
        let mut store = empty_store();
        let created = store
            .create(parameters("A", "B", "2025-06-03T12:00:00Z", "1"), now())
            .unwrap()
            .value;

        let mut edited = created.clone();
        edited.buyer_name = String::from("  émile dupont ");
        edited.details = String::from(" Poster\n");
        let saved = store.update(edited).unwrap().value;

        assert_eq!(saved.buyer_name, "Émile dupont");
        assert_eq!(saved.details, "Poster");
        assert_eq!(stored_orders(&store)[0].buyer_name, "Émile dupont");
    }

    #[test]
    fn test_validation_error_lists_every_field() {
        let mut store = empty_store();
        let Err(CreateOrderError::Validation(e)) =
            store.create(parameters("", "B", "2025-06-03T12:00:00Z", "x"), now())
        else {
            panic!("Expected validation error");
        };

        assert_eq!(
            e.to_string(),
            "Invalid order: Buyer name is required (buyerName), Valid price is required (price)"
        );
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut store = empty_store();
        let created = store
            .create(parameters("A", "B", "2025-06-03T12:00:00Z", "1"), now())
            .unwrap()
            .value;
        let mut edited = created.clone();
        edited.status = OrderStatus::Review;
        edited.progress = 80;

        store.update(edited.clone()).unwrap();
        let once = store.list().to_vec();
        store.update(edited).unwrap();

        assert_eq!(store.list(), once.as_slice());
        assert_eq!(stored_orders(&store), once);
    }

    #[test]
    fn test_mark_delivered_and_completed() {
        let mut store = empty_store();
        let id = store
            .create(parameters("A", "B", "2025-06-03T12:00:00Z", "1"), now())
            .unwrap()
            .value
            .id;

        let delivered = store.mark_delivered(&id).unwrap().value;
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert_eq!(delivered.progress, 100);

        let completed = store.mark_completed(&id).unwrap().value;
        assert_eq!(completed.status, OrderStatus::Completed);
    }

    #[test]
    fn test_set_status_and_progress() {
        let mut store = empty_store();
        let id = store
            .create(parameters("A", "B", "2025-06-03T12:00:00Z", "1"), now())
            .unwrap()
            .value
            .id;

        store.set_status(&id, OrderStatus::InProgress).unwrap();
        store.set_progress(&id, 30).unwrap();

        let order = store.get(&id).unwrap();
        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.progress, 30);
        assert!(matches!(
            store.set_progress(&id, 120),
            Err(UpdateOrderError::Validation(_))
        ));
    }

    #[test]
    fn test_delete_missing_id_leaves_collection_unchanged() {
        let mut store = OrderStore::open(MemoryStorage::new(), TimeZone::UTC, now()).unwrap();
        let before = store.list().to_vec();

        assert!(matches!(
            store.delete("OR-0000"),
            Err(DeleteOrderError::NotFound(_))
        ));
        assert_eq!(store.list(), before.as_slice());
    }

    #[test]
    fn test_delete_removes_and_persists() {
        let mut store = OrderStore::open(MemoryStorage::new(), TimeZone::UTC, now()).unwrap();

        let removed = store.delete("OR-1023").unwrap().value;

        assert_eq!(removed.buyer_name, "Global Media Inc.");
        assert!(store.get("OR-1023").is_none());
        assert_eq!(stored_orders(&store).len(), 4);
    }

    #[test]
    fn test_persistence_failure_keeps_mutation_and_warns() {
        let storage = MemoryStorage::with_entry(ORDERS_KEY, "[]");
        let mut store = OrderStore::open(&storage, TimeZone::UTC, now()).unwrap();
        storage.reject_writes(true);

        let saved = store
            .create(parameters("A", "B", "2025-06-03T12:00:00Z", "1"), now())
            .unwrap();

        assert!(!saved.is_persisted());
        assert!(matches!(saved.warning, Some(StorageError::QuotaExceeded(_))));
        assert_eq!(store.list().len(), 1);
        assert_eq!(storage.get(ORDERS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_created_then_delivered_scenario() {
        let mut store = OrderStore::open(MemoryStorage::new(), TimeZone::UTC, now()).unwrap();
        let due = (now() + SignedDuration::from_hours(48)).to_string();

        let created = store.create(parameters("A", "B", &due, "50"), now()).unwrap().value;
        assert_eq!(store.list()[0].id, created.id);

        let mut edited = created.clone();
        edited.progress = 100;
        edited.status = OrderStatus::Delivered;
        store.update(edited).unwrap();

        assert_eq!(store.list()[0].progress, 100);
        assert_eq!(store.list()[0].status, OrderStatus::Delivered);
    }

    #[test]
    fn test_filter_orders_by_tab_and_search() {
        let mut orders = demo_orders(now());
        orders[2].status = OrderStatus::Completed;

        let running = filter_orders(&orders, ListTab::Running, "");
        assert_eq!(running.len(), 4);

        let archive = filter_orders(&orders, ListTab::Archive, "");
        assert_eq!(archive.len(), 1);
        assert_eq!(archive[0].id, "OR-1023");

        let found = filter_orders(&orders, ListTab::Running, "SHOPIFY");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].buyer_name, "Mike Peterson");

        let by_buyer = filter_orders(&orders, ListTab::Running, "sarah");
        assert_eq!(by_buyer[0].id, "OR-8922");
    }
}
