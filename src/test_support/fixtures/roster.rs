// Roster fixtures: the calendar users and cell keys used across tests.

use crate::modules::roster::core::duty::CellKey;
use crate::modules::roster::core::ports::CalendarUser;
use crate::shared::core::primitives::UserId;
use chrono::NaiveDate;

pub fn calendar_user(id: u64, full_name: &str) -> CalendarUser {
    CalendarUser {
        id: UserId(id),
        full_name: full_name.to_string(),
        email: format!("user{id}@isp.test"),
    }
}

/// Users 7 and 9, the pair the roster scenarios use.
pub fn calendar_users() -> Vec<CalendarUser> {
    vec![calendar_user(7, "Alice Petrova"), calendar_user(9, "Boris Ivanov")]
}

pub fn date(iso: &str) -> NaiveDate {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d").unwrap()
}

pub fn cell(user: u64, iso: &str) -> CellKey {
    CellKey::new(UserId(user), date(iso))
}
