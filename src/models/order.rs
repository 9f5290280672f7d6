use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Human-facing identifier, `OR-####`
    pub id: String,
    /// Who the work is for
    pub buyer_name: String,
    /// What needs to be done
    pub details: String,
    /// The deadline
    pub delivery_date: Timestamp,
    /// Agreed price, missing or null values read as 0
    #[serde(default, deserialize_with = "price_or_zero")]
    pub price: f64,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Status as last set by the user
    pub status: OrderStatus,
    /// Completion percentage, 0 to 100
    pub progress: u8,
    /// When the order was created
    pub created_at: Timestamp,
}

fn price_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl Order {
    /// Price as used by sums: non-finite or negative values count as nothing.
    pub fn effective_price(&self) -> f64 {
        if self.price.is_finite() && self.price > 0.0 {
            self.price
        } else {
            0.0
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    NotStarted,
    InProgress,
    Review,
    Delivered,
    Completed,
    /// Informational only, overdue is always derived from the deadline
    Overdue,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::NotStarted,
        OrderStatus::InProgress,
        OrderStatus::Review,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Overdue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::NotStarted => "Not Started",
            OrderStatus::InProgress => "In Progress",
            OrderStatus::Review => "Review",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Completed => "Completed",
            OrderStatus::Overdue => "Overdue",
        }
    }

    /// NOT_STARTED, IN_PROGRESS or REVIEW
    pub fn is_active(self) -> bool {
        matches!(
            self,
            OrderStatus::NotStarted | OrderStatus::InProgress | OrderStatus::Review
        )
    }

    /// DELIVERED or COMPLETED. Finished orders never raise reminders.
    pub fn is_finished(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Completed)
    }

    fn wire_name(self) -> &'static str {
        match self {
            OrderStatus::NotStarted => "NOT_STARTED",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Review => "REVIEW",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Overdue => "OVERDUE",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown status '{0}' (expected one of: not-started, in-progress, review, delivered, completed, overdue)")]
pub struct ParseStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.wire_name() == normalized)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_loose_spellings() {
        assert_eq!("IN_PROGRESS".parse::<OrderStatus>().unwrap(), OrderStatus::InProgress);
        assert_eq!("in-progress".parse::<OrderStatus>().unwrap(), OrderStatus::InProgress);
        assert_eq!("Not Started".parse::<OrderStatus>().unwrap(), OrderStatus::NotStarted);
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_serializes_with_camel_case_fields() {
        let order = Order {
            id: String::from("OR-1234"),
            buyer_name: String::from("Alex"),
            details: String::from("Logo"),
            delivery_date: "2025-03-01T12:00:00Z".parse().unwrap(),
            price: 150.0,
            notes: None,
            status: OrderStatus::InProgress,
            progress: 45,
            created_at: "2025-02-27T12:00:00Z".parse().unwrap(),
        };

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["buyerName"], "Alex");
        assert_eq!(value["status"], "IN_PROGRESS");
        assert_eq!(value["deliveryDate"], "2025-03-01T12:00:00Z");
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn test_order_without_price_reads_as_zero() {
        let json = r#"{
            "id": "OR-1000",
            "buyerName": "Alex",
            "details": "Logo",
            "deliveryDate": "2025-03-01T12:00:00.000Z",
            "status": "REVIEW",
            "progress": 85,
            "createdAt": "2025-02-27T12:00:00.000Z"
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.price, 0.0);
        assert_eq!(order.status, OrderStatus::Review);
    }

    #[test]
    fn test_order_with_null_price_reads_as_zero() {
        let json = r#"[
            {"id":"OR-1000","buyerName":"A","details":"B","deliveryDate":"2025-03-01T12:00:00Z","price":null,"status":"REVIEW","progress":0,"createdAt":"2025-02-27T12:00:00Z"},
            {"id":"OR-1001","buyerName":"C","details":"D","deliveryDate":"2025-03-01T12:00:00Z","price":75.5,"status":"IN_PROGRESS","progress":10,"createdAt":"2025-02-27T12:00:00Z"}
        ]"#;

        let orders: Vec<Order> = serde_json::from_str(json).unwrap();
        assert_eq!(orders[0].price, 0.0);
        assert_eq!(orders[1].price, 75.5);
    }

    #[test]
    fn test_effective_price_ignores_invalid_values() {
        let mut order: Order = serde_json::from_str(
            r#"{"id":"OR-1000","buyerName":"A","details":"B","deliveryDate":"2025-03-01T12:00:00Z","status":"REVIEW","progress":0,"createdAt":"2025-02-27T12:00:00Z"}"#,
        )
        .unwrap();
        order.price = f64::NAN;
        assert_eq!(order.effective_price(), 0.0);
        order.price = 42.5;
        assert_eq!(order.effective_price(), 42.5);
    }
}
