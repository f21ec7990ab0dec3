// Client-side composition root.
//
// Responsibilities
// - Build Preferences, Session and the ApiClient once per console.
// - Hand out the HTTP backed services and the use cases wired to them.

use crate::modules::export::adapters::http_export_service::HttpExportService;
use crate::modules::export::use_cases::export_clients::ExportDialog;
use crate::modules::records::adapters::http_record_service::HttpRecordService;
use crate::modules::records::use_cases::draft_lifecycle::manager::DraftLifecycle;
use crate::modules::records::use_cases::record_actions::RecordActions;
use crate::modules::records::use_cases::transfer_slot::wizard::TransferWizard;
use crate::modules::roster::adapters::http_roster_service::HttpRosterService;
use crate::modules::roster::core::calendar::MonthCursor;
use crate::modules::roster::use_cases::grid::RosterGrid;
use crate::shared::core::access::Principal;
use crate::shared::core::errors::ServiceError;
use crate::shared::core::notices::NoticeSink;
use crate::shared::infrastructure::http::ApiClient;
use crate::shared::infrastructure::preferences::json_file::JsonFilePreferenceStore;
use crate::shared::infrastructure::preferences::{PreferenceError, PreferenceStore, Preferences};
use crate::shared::infrastructure::session::Session;
use crate::shell::config::AppConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct ConsoleState {
    pub preferences: Preferences,
    pub session: Arc<Session>,
    pub api: ApiClient,
    pub records: Arc<HttpRecordService>,
    pub roster: Arc<HttpRosterService>,
    pub export: Arc<HttpExportService>,
    pub notices: Arc<dyn NoticeSink>,
}

impl ConsoleState {
    /// Preferences live in the JSON file named by the config.
    pub fn connect(config: &AppConfig, notices: Arc<dyn NoticeSink>) -> Result<Self, PreferenceError> {
        let store = JsonFilePreferenceStore::open(&config.preferences_path)?;
        Ok(Self::with_store(&config.api_url, Arc::new(store), notices))
    }

    pub fn with_store(
        api_url: &str,
        store: Arc<dyn PreferenceStore>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        let preferences = Preferences::new(store);
        let session = Arc::new(Session::new(preferences.clone()));
        let api = ApiClient::new(api_url, session.clone());
        Self {
            records: Arc::new(HttpRecordService::new(api.clone())),
            roster: Arc::new(HttpRosterService::new(api.clone())),
            export: Arc::new(HttpExportService::new(api.clone())),
            preferences,
            session,
            api,
            notices,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Principal, ServiceError> {
        self.api.login(email, password).await
    }

    pub fn logout(&self) {
        self.api.logout();
    }

    pub fn draft_lifecycle(&self) -> DraftLifecycle<HttpRecordService> {
        DraftLifecycle::new(self.records.clone(), self.preferences.clone(), self.notices.clone())
    }

    pub fn record_actions(&self) -> RecordActions<HttpRecordService> {
        RecordActions::new(self.records.clone(), self.notices.clone())
    }

    pub fn transfer_wizard(&self) -> TransferWizard<HttpRecordService> {
        TransferWizard::new(self.records.clone(), self.notices.clone())
    }

    pub fn roster_grid(&self, month: MonthCursor) -> RosterGrid<HttpRosterService> {
        RosterGrid::new(self.roster.clone(), self.preferences.clone(), self.notices.clone(), month)
    }

    pub fn export_dialog(&self) -> ExportDialog<HttpExportService> {
        ExportDialog::new(self.export.clone(), self.notices.clone())
    }
}
