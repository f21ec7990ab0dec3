// Client (subscriber) records as the console sees them.
//
// Responsibilities
// - Hold the editable field bundle of a record, including both provider slots.
// - Derive the display name and the router/server addresses from the subnet.
// - Check the fields the console requires before anything is sent.

use crate::modules::records::core::provider_slot::{ProviderSlot, ProviderSlotFields};
use crate::shared::core::primitives::{NoteId, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields that must be non-blank before a record is committed.
pub const REQUIRED_FIELDS: &[&str] = &["address"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub inn: String,
    pub phone: String,
    pub iccid: String,
    pub email: String,
    pub pharmacy_code: String,
    pub company: String,
    pub address: String,
    pub status: RecordStatus,
    pub subnet: String,
    pub external_ip: String,
    pub slot1: ProviderSlotFields,
    pub slot2: ProviderSlotFields,
}

impl RecordFields {
    pub fn slot(&self, slot: ProviderSlot) -> &ProviderSlotFields {
        match slot {
            ProviderSlot::One => &self.slot1,
            ProviderSlot::Two => &self.slot2,
        }
    }

    pub fn slot_mut(&mut self, slot: ProviderSlot) -> &mut ProviderSlotFields {
        match slot {
            ProviderSlot::One => &mut self.slot1,
            ProviderSlot::Two => &mut self.slot2,
        }
    }

    /// Empties a slot and returns what it held.
    pub fn take_slot(&mut self, slot: ProviderSlot) -> ProviderSlotFields {
        std::mem::take(self.slot_mut(slot))
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| match *field {
                "address" => self.address.trim().is_empty(),
                _ => false,
            })
            .collect()
    }

    pub fn mikrotik_ip(&self) -> String {
        host_in_subnet(&self.subnet, 1)
    }

    pub fn server_ip(&self) -> String {
        host_in_subnet(&self.subnet, 2)
    }
}

fn host_in_subnet(subnet: &str, last_octet: u8) -> String {
    let last = last_octet.to_string();
    let network = subnet.split('/').next().unwrap_or_default();
    let mut octets: Vec<&str> = network.split('.').collect();
    if octets.len() != 4 || octets.iter().any(|octet| octet.is_empty()) {
        return String::new();
    }
    octets[3] = &last;
    octets.join(".")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub is_draft: bool,
    pub fields: RecordFields,
}

impl Record {
    pub fn display_name(&self) -> String {
        if !self.fields.company.trim().is_empty() {
            self.fields.company.clone()
        } else if !self.fields.address.trim().is_empty() {
            self.fields.address.clone()
        } else {
            format!("Client #{}", self.id)
        }
    }

    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id,
            display_name: self.display_name(),
            is_draft: self.is_draft,
            status: self.fields.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: RecordId,
    pub display_name: String,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub status: RecordStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

impl RecordFilters {
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(status) = self.status {
            if record.fields.status != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                let fields = &record.fields;
                [
                    &fields.last_name,
                    &fields.first_name,
                    &fields.middle_name,
                    &fields.phone,
                    &fields.email,
                    &fields.company,
                    &fields.inn,
                    &fields.address,
                ]
                .iter()
                .any(|value| value.to_lowercase().contains(&needle))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub page: u32,
    pub filters: RecordFilters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod record_tests {
    use super::*;
    use crate::test_support::fixtures::records::RecordBuilder;
    use rstest::rstest;

    #[rstest]
    #[case("10.12.5.0/24", "10.12.5.1", "10.12.5.2")]
    #[case("192.168.0.64", "192.168.0.1", "192.168.0.2")]
    #[case("", "", "")]
    #[case("not-a-subnet", "", "")]
    fn it_should_derive_router_and_server_addresses(
        #[case] subnet: &str,
        #[case] mikrotik: &str,
        #[case] server: &str,
    ) {
        let fields = RecordFields {
            subnet: subnet.into(),
            ..RecordFields::default()
        };
        assert_eq!(fields.mikrotik_ip(), mikrotik);
        assert_eq!(fields.server_ip(), server);
    }

    #[rstest]
    fn it_should_prefer_company_then_address_for_the_display_name() {
        let record = RecordBuilder::new(5).company("Pharmacy 12").address("Main St 1").build();
        assert_eq!(record.display_name(), "Pharmacy 12");

        let record = RecordBuilder::new(5).address("Main St 1").build();
        assert_eq!(record.display_name(), "Main St 1");

        let record = RecordBuilder::new(5).build();
        assert_eq!(record.display_name(), "Client #5");
    }

    #[rstest]
    fn it_should_require_an_address() {
        let mut fields = RecordFields::default();
        assert_eq!(fields.missing_required(), vec!["address"]);
        fields.address = "   ".into();
        assert_eq!(fields.missing_required(), vec!["address"]);
        fields.address = "Main St 1".into();
        assert!(fields.missing_required().is_empty());
    }

    #[rstest]
    fn it_should_take_a_slot_leaving_it_empty() {
        let mut record = RecordBuilder::new(1).with_slot1_account("LS-1").build();
        let taken = record.fields.take_slot(ProviderSlot::One);
        assert_eq!(taken.personal_account, "LS-1");
        assert!(record.fields.slot1.is_empty());
    }

    #[rstest]
    fn it_should_filter_by_status_and_search() {
        let record = RecordBuilder::new(1).company("Apteka Plus").phone("+7 900").build();
        let by_search = RecordFilters {
            search: Some("apteka".into()),
            status: None,
        };
        assert!(by_search.matches(&record));

        let by_status = RecordFilters {
            search: None,
            status: Some(RecordStatus::Inactive),
        };
        assert!(!by_status.matches(&record));
        assert!(RecordFilters::default().matches(&record));
    }
}
