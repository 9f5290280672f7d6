use colored::*;
use jiff::{Timestamp, tz::TimeZone};

use orderflow::{
    countdown::time_remaining_text,
    models::order::{Order, OrderStatus},
    services::{
        reminders::{Countdown, Reminder, Urgency, is_order_overdue},
        stats::{DashboardStats, ProfileStats, StatusBucket},
    },
};

const BAR_WIDTH: usize = 20;

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Get the appropriate status glyph for an order
pub fn get_status_glyph(order: &Order, is_overdue: bool) -> ColoredString {
    if order.status.is_finished() {
        "✓".dimmed()
    } else if is_overdue {
        "●".red()
    } else if order.status == OrderStatus::Review {
        "◐".blue()
    } else {
        "○".normal()
    }
}

/// Status badge, overdue wins over whatever the user set
pub fn get_status_badge(order: &Order, is_overdue: bool) -> ColoredString {
    if is_overdue {
        "Critical Overdue".red().bold()
    } else {
        match order.status {
            OrderStatus::Review => order.status.label().blue(),
            OrderStatus::Delivered | OrderStatus::Completed => order.status.label().green(),
            _ => order.status.label().yellow(),
        }
    }
}

/// Render a single order line with id, glyph, buyer and a right-aligned countdown
pub fn render_order_line(order: &Order, now: Timestamp) {
    let is_overdue = is_order_overdue(order, now);
    let remaining = time_remaining_text(order.delivery_date, now);
    render_line(order, is_overdue, &remaining);
}

/// Render a line from a tick result
pub fn render_countdown_line(countdown: &Countdown) {
    render_line(countdown.order, countdown.overdue, &countdown.remaining);
}

fn render_line(order: &Order, is_overdue: bool, remaining: &str) {
    let terminal_width = get_terminal_width();

    let glyph = get_status_glyph(order, is_overdue);
    let title = format!("{} · {}", order.buyer_name, order.details);
    let left_section = format!("  {}  {}  {}", order.id, glyph, title);

    let styled_left = if order.status.is_finished() {
        left_section.dimmed()
    } else {
        left_section.bold()
    };

    let right_section = if is_overdue {
        remaining.red()
    } else {
        remaining.dimmed()
    };

    // Visible width, the glyph counts as one column
    let left_visible_len = format!("  {}  {}  {}", order.id, " ", title).chars().count();
    let total_content = left_visible_len + remaining.chars().count();

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!("{}{}{}", styled_left, " ".repeat(padding), right_section);
    } else {
        println!("{}", styled_left);
        println!("        {}", right_section);
    }
}

/// Detail lines shown under an order in the full listing
pub fn render_order_details(order: &Order, now: Timestamp, tz: &TimeZone) {
    let is_overdue = is_order_overdue(order, now);
    let due = order.delivery_date.to_zoned(tz.clone());
    println!(
        "        {}  {}  {}",
        get_status_badge(order, is_overdue),
        format!("${:.2}", order.price).green(),
        format!("due {}", due.strftime("%b %d %H:%M")).dimmed()
    );
    println!("        {}", render_progress_bar(order.progress, is_overdue));
    if let Some(notes) = &order.notes {
        println!("        {}", notes.italic().dimmed());
    }
}

pub fn render_progress_bar(progress: u8, is_overdue: bool) -> String {
    let filled = usize::from(progress.min(100)) * BAR_WIDTH / 100;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
    let bar = if is_overdue { bar.red() } else { bar.yellow() };
    format!("{} {:>3}%", bar, progress)
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize) {
    let order_word = if count == 1 { "order" } else { "orders" };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, order_word);
}

/// Render a section header (e.g., "Today's Focus")
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

pub fn render_dashboard_summary(stats: &DashboardStats) {
    println!(
        "\n  {} {}",
        "Active value".dimmed(),
        format!("${:.2}", stats.total_active_value).green().bold()
    );
    println!(
        "  {} {}    {} {}    {} {}",
        "Active".dimmed(),
        stats.active_count.to_string().bold(),
        "Overdue".dimmed(),
        if stats.overdue_count > 0 {
            stats.overdue_count.to_string().red().bold()
        } else {
            stats.overdue_count.to_string().normal()
        },
        "Done".dimmed(),
        stats.completed_count.to_string().bold()
    );
    println!(
        "  {} {}",
        "Avg. time remaining".dimmed(),
        stats.average_remaining_text
    );

    render_section_header("Status");
    let total: usize = stats.status_breakdown.iter().map(|(_, n)| n).sum();
    for (bucket, count) in &stats.status_breakdown {
        let filled = if total == 0 { 0 } else { count * BAR_WIDTH / total };
        let bar = "█".repeat(filled);
        let bar = match bucket {
            StatusBucket::Active => bar.yellow(),
            StatusBucket::Overdue => bar.red(),
            StatusBucket::Done => bar.green(),
        };
        println!("  {:<8} {:>3}  {}", bucket.label(), count, bar);
    }
}

pub fn render_reminder(reminder: &Reminder) {
    let tier = match reminder.urgency {
        Urgency::Urgent => reminder.urgency.label().red().bold(),
        Urgency::Today => reminder.urgency.label().truecolor(249, 115, 22).bold(),
        Urgency::Future => reminder.urgency.label().yellow(),
    };
    println!(
        "  {:<10} {}  {} · {}",
        tier,
        reminder.order.id.dimmed(),
        reminder.order.buyer_name.bold(),
        reminder.order.details
    );
    println!("             {}", reminder.due_text.dimmed());
}

pub fn render_profile(stats: &ProfileStats, order_count: usize, theme: &str) {
    println!("\n  {}\n", "PROFILE".cyan().bold());
    println!("  {} {}", "Orders tracked".dimmed(), order_count);
    println!("  {} {}", "Completed".dimmed(), stats.completed_count);
    println!(
        "  {} {}",
        "Revenue".dimmed(),
        format!("${:.2}", stats.total_revenue).green().bold()
    );
    println!("  {} {}", "Theme".dimmed(), theme);
}
