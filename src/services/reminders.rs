use jiff::{Timestamp, tz::TimeZone};

use crate::{
    countdown::{is_overdue, millis_until, time_remaining_text},
    models::order::Order,
};

/// How many orders the daily focus view shows by default
pub const DUE_TODAY_LIMIT: usize = 3;

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Proximity of an unfinished order to its deadline. Ordered most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Urgency {
    /// Deadline has passed
    Urgent,
    /// Due within the next 24 hours
    Today,
    Future,
}

impl Urgency {
    pub fn label(self) -> &'static str {
        match self {
            Urgency::Urgent => "Urgent",
            Urgency::Today => "Today",
            Urgency::Future => "Upcoming",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder<'a> {
    pub order: &'a Order,
    pub urgency: Urgency,
    pub due_text: String,
}

/// Per-order values refreshed on every tick
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown<'a> {
    pub order: &'a Order,
    pub remaining: String,
    pub overdue: bool,
}

/// An order is overdue once its deadline passed and it was neither delivered nor completed.
/// The stored status is not consulted beyond that.
pub fn is_order_overdue(order: &Order, now: Timestamp) -> bool {
    is_overdue(order.delivery_date, now) && !order.status.is_finished()
}

/// `None` for finished orders, they never raise reminders.
pub fn urgency(order: &Order, now: Timestamp) -> Option<Urgency> {
    if order.status.is_finished() {
        return None;
    }

    let diff = millis_until(order.delivery_date, now);
    Some(if diff < 0 {
        Urgency::Urgent
    } else if diff < DAY_MS {
        Urgency::Today
    } else {
        Urgency::Future
    })
}

/// Short reminder text: "Overdue", "Due soon" under an hour, else "Due in {H}h".
pub fn due_text(deadline: Timestamp, now: Timestamp) -> String {
    let diff = millis_until(deadline, now);
    if diff < 0 {
        String::from("Overdue")
    } else if diff < HOUR_MS {
        String::from("Due soon")
    } else {
        // Nearest hour, halves round up
        format!("Due in {}h", (diff + HOUR_MS / 2) / HOUR_MS)
    }
}

/// Reminders for every unfinished order, most urgent first. Equal tiers keep collection order.
pub fn reminders(orders: &[Order], now: Timestamp) -> Vec<Reminder<'_>> {
    let mut items: Vec<_> = orders
        .iter()
        .filter_map(|order| {
            urgency(order, now).map(|urgency| Reminder {
                order,
                urgency,
                due_text: due_text(order.delivery_date, now),
            })
        })
        .collect();

    // sort_by_key is stable
    items.sort_by_key(|r| r.urgency);
    items
}

/// Unfinished orders due before the end of the local day of `now`, at most `limit`.
pub fn due_today<'a>(
    orders: &'a [Order],
    now: Timestamp,
    tz: &TimeZone,
    limit: usize,
) -> Vec<&'a Order> {
    let Some(end_of_day) = end_of_local_day(now, tz) else {
        return Vec::new();
    };

    orders
        .iter()
        .filter(|o| o.delivery_date <= end_of_day && !o.status.is_finished())
        .take(limit)
        .collect()
}

fn end_of_local_day(now: Timestamp, tz: &TimeZone) -> Option<Timestamp> {
    let today = now.to_zoned(tz.clone()).date();
    match today.at(23, 59, 59, 999_999_999).to_zoned(tz.clone()) {
        Ok(zoned) => Some(zoned.timestamp()),
        Err(e) => {
            tracing::warn!(error = %e, %today, "cannot resolve end of day");
            None
        }
    }
}

pub fn countdown(order: &Order, now: Timestamp) -> Countdown<'_> {
    Countdown {
        order,
        remaining: time_remaining_text(order.delivery_date, now),
        overdue: is_order_overdue(order, now),
    }
}

/// Recompute every order's countdown. Callers decide how often to tick.
pub fn tick(orders: &[Order], now: Timestamp) -> Vec<Countdown<'_>> {
    orders.iter().map(|order| countdown(order, now)).collect()
}
