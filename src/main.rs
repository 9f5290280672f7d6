use std::{fmt::Display, path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use colored::*;
use jiff::Timestamp;
use tracing_subscriber::{EnvFilter, fmt};

use orderflow::{
    config::AppConfig,
    models::{order::OrderStatus, theme::Theme},
    services::{
        orders::{
            CreateOrderError, ListTab, NewOrderParameters, OrderStore, Saved, UpdateOrderError,
            filter_orders, parse_deadline,
        },
        reminders::{due_today, reminders, tick},
        stats::{dashboard_stats, profile_stats, recent_running},
        theme::{load_theme, save_theme, toggle_theme},
    },
    storage::json::JsonFileStorage,
};

mod ui;

#[derive(Parser)]
#[command(
    name = "orderflow",
    version,
    about = "Track freelance orders, deadlines and earnings from your terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (takes precedence over ORDERFLOW_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the order data
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show totals, today's focus and running orders (default)
    Dashboard,

    /// List orders
    List {
        /// Show completed orders instead of running ones
        #[arg(long)]
        archive: bool,

        /// Only orders whose buyer or details contain this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show deadline reminders, most urgent first
    Reminders,

    /// Show unfinished orders due by the end of today
    Focus,

    /// Add a new order
    Add {
        /// Buyer name
        buyer: String,

        /// What needs to be done
        details: String,

        /// Delivery deadline (e.g., "2025-03-01", "2025-03-01T14:30", RFC 3339)
        #[arg(short = 'D', long)]
        due: String,

        /// Agreed price
        #[arg(short, long)]
        price: String,

        /// Add notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Edit fields of an order
    Edit {
        /// Order id (e.g., OR-1234)
        id: String,

        #[arg(long)]
        buyer: Option<String>,

        #[arg(long)]
        details: Option<String>,

        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        status: Option<OrderStatus>,

        #[arg(long)]
        progress: Option<u8>,
    },

    /// Set the status of an order
    Status { id: String, status: OrderStatus },

    /// Set the progress (0-100) of an order
    Progress { id: String, progress: u8 },

    /// Mark an order as delivered
    Deliver { id: String },

    /// Mark an order as completed and archive it
    Complete { id: String },

    /// Delete an order permanently
    Delete { id: String },

    /// Show lifetime totals
    Profile,

    /// Show or change the theme: light, dark or toggle
    Theme { value: Option<String> },

    /// Refresh countdowns on an interval
    Watch {
        /// Only watch this order
        id: Option<String>,

        /// Seconds between refreshes (defaults to the config value)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Number of refreshes before exiting
        #[arg(short, long, default_value_t = 10)]
        ticks: u32,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let config = AppConfig::load(cli.config.clone()).unwrap_or_else(|e| exit_with(e));
    let time_zone = config.resolve_time_zone().unwrap_or_else(|e| exit_with(e));
    let data_dir = config
        .resolve_data_dir(cli.data_dir.clone())
        .unwrap_or_else(|e| exit_with(e));

    std::fs::create_dir_all(&data_dir).unwrap_or_else(|e| {
        exit_with(format!(
            "Failed to create data directory '{}': {}",
            data_dir.display(),
            e
        ))
    });

    let storage = JsonFileStorage::new(data_dir);
    let now = Timestamp::now();

    let mut store = OrderStore::open(storage, time_zone.clone(), now)
        .unwrap_or_else(|e| exit_with(format!("Failed to load orders: {}", e)));

    match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => {
            let stats = dashboard_stats(store.list(), now);
            ui::render_dashboard_summary(&stats);

            ui::render_section_header("Today's Focus");
            let focus = due_today(store.list(), now, &time_zone, config.due_today_limit);
            if focus.is_empty() {
                println!("  {}", "Nothing due today".dimmed());
            }
            for order in focus {
                ui::render_order_line(order, now);
            }

            ui::render_section_header("Running");
            for order in recent_running(store.list(), config.recent_limit) {
                ui::render_order_line(order, now);
            }
            println!();
        }
        Commands::List { archive, search } => {
            let tab = if archive {
                ListTab::Archive
            } else {
                ListTab::Running
            };
            let orders = filter_orders(store.list(), tab, search.as_deref().unwrap_or(""));
            let tab_name = if archive { "Archive" } else { "Running" };

            if orders.is_empty() {
                println!("No orders found in {}", tab_name.to_lowercase());
            } else {
                ui::render_view_header(tab_name, orders.len());
                for order in orders {
                    ui::render_order_line(order, now);
                    ui::render_order_details(order, now, &time_zone);
                    println!();
                }
            }
        }
        Commands::Reminders => {
            let items = reminders(store.list(), now);
            if items.is_empty() {
                println!("All caught up, no pending deadlines");
            } else {
                ui::render_view_header("Reminders", items.len());
                for reminder in &items {
                    ui::render_reminder(reminder);
                }
                println!();
            }
        }
        Commands::Focus => {
            let focus = due_today(store.list(), now, &time_zone, config.due_today_limit);
            if focus.is_empty() {
                println!("Nothing due today");
            } else {
                ui::render_view_header("Today's Focus", focus.len());
                for order in focus {
                    ui::render_order_line(order, now);
                }
            }
        }
        Commands::Add {
            buyer,
            details,
            due,
            price,
            notes,
        } => {
            let params = NewOrderParameters {
                buyer_name: buyer,
                details,
                delivery_date: due,
                price,
                notes,
            };
            match store.create(params, now) {
                Ok(saved) => {
                    println!(
                        "✓ Order {} created for {}",
                        saved.value.id.bold(),
                        saved.value.buyer_name
                    );
                    report_warning(&saved);
                }
                Err(CreateOrderError::Validation(e)) => {
                    eprintln!("Error: Order not created:");
                    for violation in &e.violations {
                        eprintln!("  - {}: {}", violation.field.name(), violation.message);
                    }
                    std::process::exit(1);
                }
                Err(e) => exit_with(e),
            }
        }
        Commands::Edit {
            id,
            buyer,
            details,
            due,
            price,
            notes,
            status,
            progress,
        } => {
            let Some(mut order) = store.get(&id).cloned() else {
                exit_not_found(&store, &id);
            };
            if let Some(buyer) = buyer {
                order.buyer_name = buyer;
            }
            if let Some(details) = details {
                order.details = details;
            }
            if let Some(due) = due {
                order.delivery_date = parse_deadline(&due, store.time_zone())
                    .unwrap_or_else(|| exit_with(format!("Invalid delivery date '{}'", due)));
            }
            if let Some(price) = price {
                order.price = price;
            }
            if let Some(notes) = notes {
                order.notes = Some(notes).filter(|n| !n.trim().is_empty());
            }
            if let Some(status) = status {
                order.status = status;
            }
            if let Some(progress) = progress {
                order.progress = progress;
            }
            let result = store.update(order);
            report_update(&store, &id, result, "updated");
        }
        Commands::Status { id, status } => {
            let result = store.set_status(&id, status);
            report_update(&store, &id, result, "status changed");
        }
        Commands::Progress { id, progress } => {
            let result = store.set_progress(&id, progress);
            report_update(&store, &id, result, "progress changed");
        }
        Commands::Deliver { id } => {
            let result = store.mark_delivered(&id);
            report_update(&store, &id, result, "delivered");
        }
        Commands::Complete { id } => {
            let result = store.mark_completed(&id);
            report_update(&store, &id, result, "completed");
        }
        Commands::Delete { id } => match store.delete(&id) {
            Ok(saved) => {
                println!("✓ Order deleted: {} ({})", saved.value.id, saved.value.buyer_name);
                report_warning(&saved);
            }
            Err(_) => exit_not_found(&store, &id),
        },
        Commands::Profile => {
            let theme = load_theme(store.storage()).unwrap_or_else(|e| exit_with(e));
            let stats = profile_stats(store.list());
            ui::render_profile(&stats, store.list().len(), theme.as_str());
        }
        Commands::Theme { value } => {
            let theme = match value.as_deref() {
                None => load_theme(store.storage()),
                Some("toggle") => toggle_theme(store.storage()),
                Some(raw) => {
                    let theme: Theme = raw.parse().unwrap_or_else(|e| exit_with(e));
                    save_theme(store.storage(), theme).map(|_| theme)
                }
            }
            .unwrap_or_else(|e| exit_with(e));
            println!("Theme: {}", theme);
        }
        Commands::Watch {
            id,
            interval,
            ticks,
        } => {
            if let Some(id) = &id
                && store.get(id).is_none()
            {
                exit_not_found(&store, id);
            }
            let interval =
                Duration::from_secs(interval.unwrap_or(config.watch_interval_secs).max(1));

            for n in 0..ticks {
                let now = Timestamp::now();
                let watched: Vec<_> = store
                    .list()
                    .iter()
                    .filter(|o| id.as_ref().is_none_or(|id| &o.id == id))
                    .cloned()
                    .collect();

                let clock = now.to_zoned(time_zone.clone()).strftime("%H:%M:%S").to_string();
                println!("{}", clock.dimmed());
                for countdown in tick(&watched, now) {
                    ui::render_countdown_line(&countdown);
                }

                if n + 1 < ticks {
                    std::thread::sleep(interval);
                    println!();
                }
            }
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let env_filter = match level {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("warn"));
    // Only fails if a subscriber is already installed
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn exit_with(error: impl Display) -> ! {
    eprintln!("Error: {}", error);
    std::process::exit(1);
}

fn exit_not_found<S: orderflow::Storage>(store: &OrderStore<S>, id: &str) -> ! {
    eprintln!("Error: Order '{}' not found", id);

    let ids: Vec<_> = store.list().iter().map(|o| o.id.as_str()).collect();
    if !ids.is_empty() {
        eprintln!("\nKnown orders: {}", ids.join(", "));
    }
    std::process::exit(1);
}

fn report_warning<T>(saved: &Saved<T>) {
    if let Some(e) = &saved.warning {
        eprintln!("{} change applied but not saved: {}", "Warning:".yellow(), e);
    }
}

fn report_update<S: orderflow::Storage>(
    store: &OrderStore<S>,
    id: &str,
    result: Result<Saved<orderflow::Order>, UpdateOrderError>,
    verb: &str,
) {
    match result {
        Ok(saved) => {
            println!(
                "✓ Order {} {} ({}, {}%)",
                saved.value.id.bold(),
                verb,
                saved.value.status,
                saved.value.progress
            );
            report_warning(&saved);
        }
        Err(UpdateOrderError::NotFound(_)) => exit_not_found(store, id),
        Err(UpdateOrderError::Validation(e)) => {
            eprintln!("Error: Order not updated:");
            for violation in &e.violations {
                eprintln!("  - {}: {}", violation.field.name(), violation.message);
            }
            std::process::exit(1);
        }
    }
}
