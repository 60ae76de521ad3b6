pub mod crm;
pub mod health;
pub mod holidays;
pub mod rbac;
pub mod time_reports;

use chrono::{Local, NaiveDate};

/// Current date in the server's local time zone.
fn today() -> NaiveDate {
    Local::now().date_naive()
}
