pub mod orders;
pub mod reminders;
pub mod stats;
pub mod theme;
