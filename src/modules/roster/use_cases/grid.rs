// Duty roster grid: one month of duties for every calendar user.
//
// Responsibilities
// - Hold the displayed month, its duties and day overrides, the multi-cell
//   selection, the open single-cell editor and per-cell saving flags.
// - Apply a change locally only once the backend accepted it.
// - Number every mutation per cell (and per day for overrides). A response
//   that is not the latest issued for its key is dropped, so the last issued
//   change wins even if an older response arrives later.
//
// State sits behind a tokio Mutex that is never held across a network call.

use crate::modules::roster::core::calendar::{self, DayOverride, DayOverrides, MonthCursor};
use crate::modules::roster::core::duty::{CellKey, DutyKind};
use crate::modules::roster::core::ports::{CalendarUser, DutyMap, MonthReport, RosterService};
use crate::modules::roster::core::selection::{CellSelection, ClickOutcome};
use crate::shared::core::access::{PermissionFlag, Principal};
use crate::shared::core::confirmation::Confirmation;
use crate::shared::core::errors::ServiceError;
use crate::shared::core::notices::{Notice, NoticeSink};
use crate::shared::core::primitives::UserId;
use crate::shared::infrastructure::preferences::{PreferenceError, Preferences};
use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("only administrators can do this")]
    NotPermitted,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Preferences(#[from] PreferenceError),
}

/// Whether a mutation's result reached the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// A newer mutation for the same key was issued meanwhile.
    Superseded,
    /// Nothing to do, e.g. an empty selection.
    Skipped,
}

struct GridState {
    month: MonthCursor,
    load_generation: u64,
    users: Vec<CalendarUser>,
    duties: DutyMap,
    overrides: DayOverrides,
    selection: CellSelection,
    editor: Option<CellKey>,
    saving: BTreeSet<CellKey>,
    cell_generations: BTreeMap<CellKey, u64>,
    day_generations: BTreeMap<NaiveDate, u64>,
    next_generation: u64,
}

impl GridState {
    fn new(month: MonthCursor) -> Self {
        Self {
            month,
            load_generation: 0,
            users: Vec::new(),
            duties: DutyMap::new(),
            overrides: DayOverrides::new(),
            selection: CellSelection::default(),
            editor: None,
            saving: BTreeSet::new(),
            cell_generations: BTreeMap::new(),
            day_generations: BTreeMap::new(),
            next_generation: 0,
        }
    }

    fn issue(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn is_latest(&self, key: &CellKey, generation: u64) -> bool {
        self.cell_generations.get(key) == Some(&generation)
    }

    fn settle(&mut self, key: &CellKey) {
        self.cell_generations.remove(key);
        self.saving.remove(key);
    }

    /// Forgets every in-flight mutation; their responses become stale.
    fn reset_month(&mut self, month: MonthCursor) {
        self.month = month;
        self.duties.clear();
        self.overrides.clear();
        self.selection.clear();
        self.editor = None;
        self.saving.clear();
        self.cell_generations.clear();
        self.day_generations.clear();
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

pub struct RosterGrid<S: RosterService> {
    service: Arc<S>,
    preferences: Preferences,
    notices: Arc<dyn NoticeSink>,
    state: Mutex<GridState>,
}

impl<S: RosterService> RosterGrid<S> {
    pub fn new(
        service: Arc<S>,
        preferences: Preferences,
        notices: Arc<dyn NoticeSink>,
        month: MonthCursor,
    ) -> Self {
        Self {
            service,
            preferences,
            notices,
            state: Mutex::new(GridState::new(month)),
        }
    }

    pub async fn month(&self) -> MonthCursor {
        self.state.lock().await.month
    }

    pub async fn duty(&self, key: CellKey) -> Option<DutyKind> {
        self.state.lock().await.duties.get(&key).copied()
    }

    pub async fn duties(&self) -> DutyMap {
        self.state.lock().await.duties.clone()
    }

    pub async fn is_saving(&self, key: CellKey) -> bool {
        self.state.lock().await.saving.contains(&key)
    }

    pub async fn selection(&self) -> CellSelection {
        self.state.lock().await.selection.clone()
    }

    pub async fn editor(&self) -> Option<CellKey> {
        self.state.lock().await.editor
    }

    pub async fn is_holiday(&self, date: NaiveDate) -> bool {
        calendar::is_holiday(date, &self.state.lock().await.overrides)
    }

    pub async fn day_override(&self, date: NaiveDate) -> Option<DayOverride> {
        self.state.lock().await.overrides.get(&date).cloned()
    }

    /// Loads users, duties and day overrides of the displayed month.
    pub async fn load(&self) -> Result<(), RosterError> {
        let (month, generation) = {
            let mut state = self.state.lock().await;
            state.load_generation += 1;
            (state.month, state.load_generation)
        };

        let (users, duties, overrides) = tokio::join!(
            self.service.calendar_users(),
            self.service.month_duties(month),
            self.service.month_overrides(month),
        );
        let loaded = users.and_then(|users| Ok((users, duties?, overrides?)));
        let (users, duties, overrides) = match loaded {
            Ok(loaded) => loaded,
            Err(err) => return Err(self.fail("Could not load the roster", err)),
        };

        let mut state = self.state.lock().await;
        if state.load_generation != generation || state.month != month {
            tracing::debug!(year = month.year(), month = month.month(), "dropping stale roster load");
            return Ok(());
        }
        state.users = users;
        state.duties = duties;
        state.overrides = overrides;
        Ok(())
    }

    pub async fn navigate(&self, month: MonthCursor) -> Result<(), RosterError> {
        self.state.lock().await.reset_month(month);
        self.load().await
    }

    pub async fn next_month(&self) -> Result<(), RosterError> {
        let month = self.month().await.next();
        self.navigate(month).await
    }

    pub async fn prev_month(&self) -> Result<(), RosterError> {
        let month = self.month().await.prev();
        self.navigate(month).await
    }

    pub async fn current_month(&self) -> Result<(), RosterError> {
        self.navigate(MonthCursor::containing(Utc::now().date_naive()))
            .await
    }

    /// Sets or clears (`None`) one cell.
    pub async fn set_duty(&self, key: CellKey, kind: Option<DutyKind>) -> Result<MutationOutcome, RosterError> {
        let generation = {
            let mut state = self.state.lock().await;
            let generation = state.issue();
            state.cell_generations.insert(key, generation);
            state.saving.insert(key);
            state.editor = None;
            generation
        };

        let result = self.service.set_duty(key, kind).await;

        let mut state = self.state.lock().await;
        if !state.is_latest(&key, generation) {
            tracing::debug!(cell = %key, generation, "dropping stale duty response");
            drop(state);
            return match result {
                Ok(()) => Ok(MutationOutcome::Superseded),
                Err(err) => Err(self.fail("Could not save the duty", err)),
            };
        }
        state.settle(&key);
        match result {
            Ok(()) => {
                apply(&mut state.duties, key, kind);
                Ok(MutationOutcome::Applied)
            }
            Err(err) => {
                drop(state);
                Err(self.fail("Could not save the duty", err))
            }
        }
    }

    /// Sets one kind on every selected cell in a single call.
    pub async fn apply_to_selection(&self, kind: Option<DutyKind>) -> Result<MutationOutcome, RosterError> {
        let (keys, generation) = {
            let mut state = self.state.lock().await;
            let keys = state.selection.keys();
            if keys.is_empty() {
                return Ok(MutationOutcome::Skipped);
            }
            let generation = state.issue();
            for key in &keys {
                state.cell_generations.insert(*key, generation);
                state.saving.insert(*key);
            }
            (keys, generation)
        };

        let result = self.service.bulk_set_duty(&keys, kind).await;

        let mut state = self.state.lock().await;
        let mut applied = 0;
        for key in &keys {
            if !state.is_latest(key, generation) {
                continue;
            }
            state.settle(key);
            if result.is_ok() {
                apply(&mut state.duties, *key, kind);
                applied += 1;
            }
        }
        match result {
            Ok(()) => {
                state.selection.clear();
                drop(state);
                self.notices
                    .push(Notice::success(format!("Applied to {} cells", keys.len())));
                tracing::info!(cells = keys.len(), applied, "batch duty applied");
                Ok(if applied == 0 {
                    MutationOutcome::Superseded
                } else {
                    MutationOutcome::Applied
                })
            }
            Err(err) => {
                drop(state);
                Err(self.fail("Could not save the selection", err))
            }
        }
    }

    /// `Some(flag)` stores an override for `date`; `None` removes it so the
    /// weekday rule applies again.
    pub async fn toggle_holiday(
        &self,
        date: NaiveDate,
        is_holiday: Option<bool>,
        note: &str,
    ) -> Result<MutationOutcome, RosterError> {
        let day = is_holiday.map(|is_holiday| DayOverride {
            is_holiday,
            note: note.to_string(),
        });
        let generation = {
            let mut state = self.state.lock().await;
            let generation = state.issue();
            state.day_generations.insert(date, generation);
            generation
        };

        let result = self.service.toggle_holiday(date, day.clone()).await;

        let mut state = self.state.lock().await;
        if state.day_generations.get(&date) != Some(&generation) {
            drop(state);
            return match result {
                Ok(()) => Ok(MutationOutcome::Superseded),
                Err(err) => Err(self.fail("Could not change the day type", err)),
            };
        }
        state.day_generations.remove(&date);
        match result {
            Ok(()) => {
                match day {
                    Some(day) => {
                        state.overrides.insert(date, day);
                    }
                    None => {
                        state.overrides.remove(&date);
                    }
                }
                Ok(MutationOutcome::Applied)
            }
            Err(err) => {
                drop(state);
                Err(self.fail("Could not change the day type", err))
            }
        }
    }

    /// Removes every duty of the displayed month. Administrators only.
    pub async fn clear_month(
        &self,
        principal: &Principal,
        confirmation: Confirmation,
    ) -> Result<(), RosterError> {
        if !principal.is_admin() {
            self.notices
                .push(Notice::error("Only administrators can clear a month"));
            return Err(RosterError::NotPermitted);
        }
        let month = self.month().await;
        tracing::info!(
            user = %principal.id,
            year = month.year(),
            month = month.month(),
            prompt = confirmation.prompt(),
            "clearing roster month"
        );

        if let Err(err) = self.service.clear_month(month).await {
            return Err(self.fail("Could not clear the month", err));
        }

        let mut state = self.state.lock().await;
        if state.month == month {
            state.duties.clear();
            state.saving.clear();
            state.cell_generations.clear();
        }
        drop(state);
        self.notices.push(Notice::success(format!(
            "Roster for {}-{:02} cleared",
            month.year(),
            month.month()
        )));
        Ok(())
    }

    /// Per-user totals of the displayed month, as the backend counts them.
    pub async fn report(&self) -> Result<MonthReport, RosterError> {
        let month = self.month().await;
        self.service
            .report(month)
            .await
            .map_err(|err| self.fail("Could not build the report", err))
    }

    pub async fn click_cell(&self, principal: &Principal, key: CellKey, with_modifier: bool) -> ClickOutcome {
        if !principal.has_perm(PermissionFlag::EditClient) {
            return ClickOutcome::Ignored;
        }
        let mut state = self.state.lock().await;
        let outcome = state.selection.click(key, with_modifier);
        state.editor = match outcome {
            ClickOutcome::OpenEditor(key) => Some(key),
            _ => None,
        };
        outcome
    }

    pub async fn close_editor(&self) {
        self.state.lock().await.editor = None;
    }

    pub async fn press_escape(&self) {
        self.state.lock().await.selection.clear();
    }

    /// Calendar users minus the ones hidden in preferences.
    pub async fn visible_users(&self) -> Vec<CalendarUser> {
        let hidden = self.preferences.hidden_users();
        self.state
            .lock()
            .await
            .users
            .iter()
            .filter(|user| !hidden.contains(&user.id))
            .cloned()
            .collect()
    }

    pub fn toggle_user_visibility(&self, user_id: UserId) -> Result<Vec<UserId>, RosterError> {
        Ok(self.preferences.toggle_hidden_user(user_id)?)
    }

    pub fn show_all_users(&self) -> Result<(), RosterError> {
        Ok(self.preferences.show_all_users()?)
    }

    fn fail(&self, what: &str, err: ServiceError) -> RosterError {
        tracing::warn!(error = %err, "{what}");
        self.notices.push(Notice::error(format!("{what}: {err}")));
        err.into()
    }
}

#[cfg(test)]
mod roster_grid_tests {
    use super::*;
    use crate::modules::roster::adapters::in_memory_roster_service::InMemoryRosterService;
    use crate::shared::core::notices::{NoticeLevel, NoticeLog};
    use crate::shared::infrastructure::preferences::in_memory::InMemoryPreferenceStore;
    use crate::test_support::fixtures::principals;
    use crate::test_support::fixtures::roster::{calendar_users, cell, date};
    use rstest::{fixture, rstest};

    type BeforeEachReturn = (
        Arc<InMemoryRosterService>,
        Arc<NoticeLog>,
        RosterGrid<InMemoryRosterService>,
    );

    #[fixture]
    async fn before_each() -> BeforeEachReturn {
        let service = Arc::new(InMemoryRosterService::with_users(calendar_users()));
        let notices = Arc::new(NoticeLog::new());
        let preferences = Preferences::new(Arc::new(InMemoryPreferenceStore::new()));
        let grid = RosterGrid::new(
            service.clone(),
            preferences,
            notices.clone(),
            MonthCursor::new(2024, 6).unwrap(),
        );
        grid.load().await.unwrap();
        (service, notices, grid)
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_set_and_clear_a_duty(#[future] before_each: BeforeEachReturn) {
        let (service, _, grid) = before_each.await;
        let key = cell(7, "2024-06-03");

        grid.set_duty(key, Some(DutyKind::Phone)).await.unwrap();
        assert_eq!(grid.duties().await.get(&key), Some(&DutyKind::Phone));
        assert_eq!(key.to_string(), "7_2024-06-03");
        assert!(!grid.is_saving(key).await);

        grid.set_duty(key, None).await.unwrap();
        assert!(!grid.duties().await.contains_key(&key));
        assert!(service.duties().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_apply_a_kind_to_every_selected_cell(#[future] before_each: BeforeEachReturn) {
        let (service, notices, grid) = before_each.await;
        let editor = principals::admin();
        let first = cell(7, "2024-06-03");
        let second = cell(9, "2024-06-04");
        grid.set_duty(cell(7, "2024-06-10"), Some(DutyKind::Day)).await.unwrap();

        grid.click_cell(&editor, first, true).await;
        grid.click_cell(&editor, second, true).await;
        let outcome = grid.apply_to_selection(Some(DutyKind::Vacation)).await.unwrap();

        assert_eq!(outcome, MutationOutcome::Applied);
        let duties = grid.duties().await;
        assert_eq!(duties.get(&first), Some(&DutyKind::Vacation));
        assert_eq!(duties.get(&second), Some(&DutyKind::Vacation));
        assert_eq!(duties.get(&cell(7, "2024-06-10")), Some(&DutyKind::Day));
        assert!(!grid.selection().await.is_active());
        assert_eq!(service.duties().await, duties);
        assert_eq!(notices.snapshot().last().unwrap().level, NoticeLevel::Success);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_cells_and_selection_when_the_batch_fails(
        #[future] before_each: BeforeEachReturn,
    ) {
        let (service, notices, grid) = before_each.await;
        let editor = principals::admin();
        grid.click_cell(&editor, cell(7, "2024-06-03"), true).await;
        service.toggle_offline();

        let result = grid.apply_to_selection(Some(DutyKind::Busy)).await;

        assert!(matches!(result, Err(RosterError::Service(ServiceError::Unavailable(_)))));
        assert!(grid.duties().await.is_empty());
        assert_eq!(grid.selection().await.len(), 1);
        assert!(!grid.is_saving(cell(7, "2024-06-03")).await);
        assert_eq!(notices.snapshot().last().unwrap().level, NoticeLevel::Error);
        service.toggle_offline();
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_skip_an_empty_selection(#[future] before_each: BeforeEachReturn) {
        let (_, notices, grid) = before_each.await;
        let outcome = grid.apply_to_selection(Some(DutyKind::Busy)).await.unwrap();
        assert_eq!(outcome, MutationOutcome::Skipped);
        assert!(notices.snapshot().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_revert_every_day_to_its_weekday_rule(#[future] before_each: BeforeEachReturn) {
        let (_, _, grid) = before_each.await;
        let month = grid.month().await;
        for day in month.days() {
            let default = calendar::is_weekend(day);
            for flag in [true, false] {
                grid.toggle_holiday(day, Some(flag), "note").await.unwrap();
                assert_eq!(grid.is_holiday(day).await, flag);
                grid.toggle_holiday(day, None, "").await.unwrap();
                assert_eq!(grid.is_holiday(day).await, default);
                assert!(grid.day_override(day).await.is_none());
            }
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_let_the_last_issued_change_win(#[future] before_each: BeforeEachReturn) {
        let (service, _, grid) = before_each.await;
        let key = cell(7, "2024-06-03");
        let release = service.hold_next_write().await;

        let (first, second) = tokio::join!(grid.set_duty(key, Some(DutyKind::Phone)), async {
            let outcome = grid.set_duty(key, Some(DutyKind::Busy)).await;
            let _ = release.send(());
            outcome
        });

        assert_eq!(first.unwrap(), MutationOutcome::Superseded);
        assert_eq!(second.unwrap(), MutationOutcome::Applied);
        assert_eq!(grid.duty(key).await, Some(DutyKind::Busy));
        assert_eq!(service.duties().await.get(&key), Some(&DutyKind::Busy));
        assert!(!grid.is_saving(key).await);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_surface_a_failed_duty_and_keep_the_cell(#[future] before_each: BeforeEachReturn) {
        let (service, notices, grid) = before_each.await;
        let key = cell(7, "2024-06-03");
        service.toggle_offline();

        assert!(grid.set_duty(key, Some(DutyKind::Phone)).await.is_err());
        assert_eq!(grid.duty(key).await, None);
        assert!(!grid.is_saving(key).await);
        assert_eq!(notices.snapshot()[0].level, NoticeLevel::Error);
        service.toggle_offline();
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_let_only_admins_clear_the_month(#[future] before_each: BeforeEachReturn) {
        let (service, _, grid) = before_each.await;
        grid.set_duty(cell(7, "2024-06-03"), Some(DutyKind::Phone)).await.unwrap();
        service.set_duty(cell(7, "2024-07-01"), Some(DutyKind::Day)).await.unwrap();
        let confirm = || Confirmation::from_answer("Clear June 2024?", true).unwrap();

        let denied = grid.clear_month(&principals::communications(), confirm()).await;
        assert!(matches!(denied, Err(RosterError::NotPermitted)));
        assert_eq!(grid.duties().await.len(), 1);

        grid.clear_month(&principals::admin(), confirm()).await.unwrap();
        assert!(grid.duties().await.is_empty());
        assert_eq!(service.duties().await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_route_clicks_between_editor_and_selection(#[future] before_each: BeforeEachReturn) {
        let (_, _, grid) = before_each.await;
        let editor = principals::admin();
        let key = cell(7, "2024-06-03");

        assert_eq!(grid.click_cell(&editor, key, false).await, ClickOutcome::OpenEditor(key));
        assert_eq!(grid.editor().await, Some(key));

        assert_eq!(grid.click_cell(&editor, key, true).await, ClickOutcome::Selected(key));
        assert_eq!(grid.editor().await, None);

        assert_eq!(grid.click_cell(&editor, cell(9, "2024-06-04"), false).await, ClickOutcome::SelectionCleared);
        assert_eq!(grid.editor().await, None);

        grid.click_cell(&editor, key, true).await;
        grid.press_escape().await;
        assert!(!grid.selection().await.is_active());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_ignore_clicks_without_edit_permission(#[future] before_each: BeforeEachReturn) {
        let (_, _, grid) = before_each.await;
        let mut viewer = principals::communications();
        viewer.role = None;
        let outcome = grid.click_cell(&viewer, cell(7, "2024-06-03"), true).await;
        assert_eq!(outcome, ClickOutcome::Ignored);
        assert!(!grid.selection().await.is_active());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reload_when_navigating(#[future] before_each: BeforeEachReturn) {
        let (service, _, grid) = before_each.await;
        service.set_duty(cell(9, "2024-07-04"), Some(DutyKind::Busy)).await.unwrap();
        grid.set_duty(cell(7, "2024-06-03"), Some(DutyKind::Phone)).await.unwrap();

        grid.next_month().await.unwrap();
        assert_eq!(grid.month().await, MonthCursor::new(2024, 7).unwrap());
        assert_eq!(grid.duties().await.keys().copied().collect::<Vec<_>>(), vec![cell(9, "2024-07-04")]);

        grid.prev_month().await.unwrap();
        assert_eq!(grid.duty(cell(7, "2024-06-03")).await, Some(DutyKind::Phone));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_hide_users_through_preferences(#[future] before_each: BeforeEachReturn) {
        let (_, _, grid) = before_each.await;
        assert_eq!(grid.visible_users().await.len(), 2);

        grid.toggle_user_visibility(UserId(9)).unwrap();
        let visible: Vec<UserId> = grid.visible_users().await.iter().map(|u| u.id).collect();
        assert_eq!(visible, vec![UserId(7)]);

        grid.show_all_users().unwrap();
        assert_eq!(grid.visible_users().await.len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fetch_the_report_from_the_backend(#[future] before_each: BeforeEachReturn) {
        let (_, _, grid) = before_each.await;
        grid.set_duty(cell(7, "2024-06-03"), Some(DutyKind::Phone)).await.unwrap();
        let report = grid.report().await.unwrap();
        let row = report.rows.iter().find(|row| row.user_id == UserId(7)).unwrap();
        assert_eq!(row.totals[&DutyKind::Phone], 1);
        assert_eq!(date("2024-06-03"), cell(7, "2024-06-03").date);
    }
}
