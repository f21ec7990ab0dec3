use crate::modules::roster::core::calendar::{DayOverride, DayOverrides, MonthCursor};
use crate::modules::roster::core::duty::{CellKey, DutyKind};
use crate::modules::roster::core::ports::{
    CalendarUser, DutyMap, MonthReport, ReportRow, RosterService,
};
use crate::shared::core::errors::ServiceError;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock, oneshot};

#[derive(Default)]
struct Store {
    users: Vec<CalendarUser>,
    duties: DutyMap,
    overrides: DayOverrides,
}

/// Roster backend kept in process memory.
///
/// `hold_next_write` lets a test delay the response of the next write after it
/// has been applied, to reproduce responses arriving out of order.
#[derive(Default)]
pub struct InMemoryRosterService {
    store: RwLock<Store>,
    holds: Mutex<VecDeque<oneshot::Receiver<()>>>,
    is_offline: AtomicBool,
}

impl InMemoryRosterService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<CalendarUser>) -> Self {
        Self {
            store: RwLock::new(Store {
                users,
                ..Store::default()
            }),
            ..Self::default()
        }
    }

    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub async fn add_user(&self, user: CalendarUser) {
        self.store.write().await.users.push(user);
    }

    pub async fn duties(&self) -> DutyMap {
        self.store.read().await.duties.clone()
    }

    pub async fn overrides(&self) -> DayOverrides {
        self.store.read().await.overrides.clone()
    }

    /// The next write is applied at once but only answers after the returned
    /// sender fires (or is dropped).
    pub async fn hold_next_write(&self) -> oneshot::Sender<()> {
        let (release, held) = oneshot::channel();
        self.holds.lock().await.push_back(held);
        release
    }

    fn ensure_online(&self) -> Result<(), ServiceError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("roster service is offline".into()));
        }
        Ok(())
    }

    async fn respond(&self) {
        let held = self.holds.lock().await.pop_front();
        if let Some(held) = held {
            let _ = held.await;
        }
    }
}

fn apply(duties: &mut DutyMap, key: CellKey, kind: Option<DutyKind>) {
    match kind {
        Some(kind) => {
            duties.insert(key, kind);
        }
        None => {
            duties.remove(&key);
        }
    }
}

#[async_trait]
impl RosterService for InMemoryRosterService {
    async fn calendar_users(&self) -> Result<Vec<CalendarUser>, ServiceError> {
        self.ensure_online()?;
        Ok(self.store.read().await.users.clone())
    }

    async fn month_duties(&self, month: MonthCursor) -> Result<DutyMap, ServiceError> {
        self.ensure_online()?;
        Ok(self
            .store
            .read()
            .await
            .duties
            .iter()
            .filter(|(key, _)| month.contains(key.date))
            .map(|(key, kind)| (*key, *kind))
            .collect())
    }

    async fn month_overrides(&self, month: MonthCursor) -> Result<DayOverrides, ServiceError> {
        self.ensure_online()?;
        Ok(self
            .store
            .read()
            .await
            .overrides
            .iter()
            .filter(|(date, _)| month.contains(**date))
            .map(|(date, day)| (*date, day.clone()))
            .collect())
    }

    async fn set_duty(&self, key: CellKey, kind: Option<DutyKind>) -> Result<(), ServiceError> {
        self.ensure_online()?;
        apply(&mut self.store.write().await.duties, key, kind);
        self.respond().await;
        Ok(())
    }

    async fn bulk_set_duty(&self, keys: &[CellKey], kind: Option<DutyKind>) -> Result<(), ServiceError> {
        self.ensure_online()?;
        if keys.is_empty() {
            return Err(ServiceError::validation("cells", "This list may not be empty."));
        }
        {
            let mut store = self.store.write().await;
            for key in keys {
                apply(&mut store.duties, *key, kind);
            }
        }
        self.respond().await;
        Ok(())
    }

    async fn toggle_holiday(
        &self,
        date: NaiveDate,
        day: Option<DayOverride>,
    ) -> Result<(), ServiceError> {
        self.ensure_online()?;
        {
            let mut store = self.store.write().await;
            match day {
                Some(day) => {
                    store.overrides.insert(date, day);
                }
                None => {
                    store.overrides.remove(&date);
                }
            }
        }
        self.respond().await;
        Ok(())
    }

    async fn clear_month(&self, month: MonthCursor) -> Result<(), ServiceError> {
        self.ensure_online()?;
        self.store
            .write()
            .await
            .duties
            .retain(|key, _| !month.contains(key.date));
        self.respond().await;
        Ok(())
    }

    async fn report(&self, month: MonthCursor) -> Result<MonthReport, ServiceError> {
        self.ensure_online()?;
        let store = self.store.read().await;
        let rows = store
            .users
            .iter()
            .map(|user| {
                let mut totals: BTreeMap<DutyKind, u32> =
                    DutyKind::ALL.into_iter().map(|kind| (kind, 0)).collect();
                for (key, kind) in &store.duties {
                    if key.user_id == user.id && month.contains(key.date) {
                        *totals.entry(*kind).or_default() += 1;
                    }
                }
                ReportRow {
                    user_id: user.id,
                    name: user.display_name().to_string(),
                    total: totals.values().sum(),
                    totals,
                }
            })
            .collect();
        let labels = DutyKind::ALL
            .into_iter()
            .map(|kind| (kind, kind.label().to_string()))
            .collect();
        Ok(MonthReport { rows, labels })
    }
}
