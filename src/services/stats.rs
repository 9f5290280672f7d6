use jiff::{SignedDuration, Timestamp};

use crate::{
    countdown::{millis_until, time_remaining_text},
    models::order::{Order, OrderStatus},
    services::reminders::is_order_overdue,
};

/// How many running orders the dashboard lists by default
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    Active,
    Overdue,
    Done,
}

impl StatusBucket {
    pub fn label(self) -> &'static str {
        match self {
            StatusBucket::Active => "Active",
            StatusBucket::Overdue => "Overdue",
            StatusBucket::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub active_count: usize,
    /// Derived from deadlines, see `is_order_overdue`
    pub overdue_count: usize,
    pub completed_count: usize,
    pub total_active_value: f64,
    pub average_remaining: SignedDuration,
    pub average_remaining_text: String,
    /// Active, Overdue, Done. Empty buckets stay at zero.
    pub status_breakdown: Vec<(StatusBucket, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileStats {
    pub completed_count: usize,
    pub total_revenue: f64,
}

pub fn dashboard_stats(orders: &[Order], now: Timestamp) -> DashboardStats {
    let active: Vec<&Order> = orders.iter().filter(|o| o.status.is_active()).collect();
    let overdue_count = orders.iter().filter(|o| is_order_overdue(o, now)).count();
    let completed_count = orders.iter().filter(|o| o.status.is_finished()).count();

    let total_active_value = active.iter().map(|o| o.effective_price()).sum();

    let average_ms = if active.is_empty() {
        0
    } else {
        let total: i128 = active
            .iter()
            .map(|o| i128::from(millis_until(o.delivery_date, now).max(0)))
            .sum();
        (total / active.len() as i128) as i64
    };
    let average_remaining = SignedDuration::from_millis(average_ms);
    let average_remaining_text = match now.checked_add(average_remaining) {
        Ok(target) => time_remaining_text(target, now),
        Err(e) => {
            tracing::warn!(error = %e, "average remaining time out of range");
            time_remaining_text(now, now)
        }
    };

    DashboardStats {
        active_count: active.len(),
        overdue_count,
        completed_count,
        total_active_value,
        average_remaining,
        average_remaining_text,
        status_breakdown: vec![
            (StatusBucket::Active, active.len()),
            (StatusBucket::Overdue, overdue_count),
            (StatusBucket::Done, completed_count),
        ],
    }
}

/// Lifetime totals over delivered and completed work
pub fn profile_stats(orders: &[Order]) -> ProfileStats {
    let completed: Vec<&Order> = orders.iter().filter(|o| o.status.is_finished()).collect();
    ProfileStats {
        completed_count: completed.len(),
        total_revenue: completed.iter().map(|o| o.effective_price()).sum(),
    }
}

/// Orders not yet completed, in collection order
pub fn recent_running(orders: &[Order], limit: usize) -> Vec<&Order> {
    orders
        .iter()
        .filter(|o| o.status != OrderStatus::Completed)
        .take(limit)
        .collect()
}
