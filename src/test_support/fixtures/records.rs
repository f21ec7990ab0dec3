// Shared test fixture for client records.
// Compiled only for tests, exposed under `crate::test_support::fixtures`.

use crate::modules::records::core::provider_slot::{ConnectionType, ProviderSlot, ProviderSlotFields};
use crate::modules::records::core::record::{Record, RecordFields, RecordStatus};
use crate::shared::core::primitives::{ProviderId, RecordId};

pub struct RecordBuilder {
    inner: Record,
}

#[allow(dead_code)]
impl RecordBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            inner: Record {
                id: RecordId(id),
                is_draft: false,
                fields: RecordFields::default(),
            },
        }
    }

    pub fn draft(mut self) -> Self {
        self.inner.is_draft = true;
        self
    }

    pub fn company(mut self, v: impl Into<String>) -> Self {
        self.inner.fields.company = v.into();
        self
    }

    pub fn address(mut self, v: impl Into<String>) -> Self {
        self.inner.fields.address = v.into();
        self
    }

    pub fn phone(mut self, v: impl Into<String>) -> Self {
        self.inner.fields.phone = v.into();
        self
    }

    pub fn subnet(mut self, v: impl Into<String>) -> Self {
        self.inner.fields.subnet = v.into();
        self
    }

    pub fn status(mut self, v: RecordStatus) -> Self {
        self.inner.fields.status = v;
        self
    }

    pub fn slot(mut self, slot: ProviderSlot, fields: ProviderSlotFields) -> Self {
        *self.inner.fields.slot_mut(slot) = fields;
        self
    }

    pub fn with_slot1_account(self, account: impl Into<String>) -> Self {
        self.slot(ProviderSlot::One, provider_bundle(1, account))
    }

    pub fn with_slot2_account(self, account: impl Into<String>) -> Self {
        self.slot(ProviderSlot::Two, provider_bundle(2, account))
    }

    pub fn build(self) -> Record {
        self.inner
    }
}

/// A filled-in provider bundle, distinguishable by its account number.
pub fn provider_bundle(provider: u64, account: impl Into<String>) -> ProviderSlotFields {
    ProviderSlotFields {
        provider: Some(ProviderId(provider)),
        personal_account: account.into(),
        contract_number: format!("C-{provider}"),
        tariff: "100 Mbit".into(),
        connection_type: Some(ConnectionType::Fiber),
        modem_number: String::new(),
        modem_iccid: String::new(),
        provider_settings: "vlan 10".into(),
        provider_equipment: true,
    }
}

#[cfg(test)]
mod record_builder_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn setters_override_fields_and_build_returns_inner() {
        let record = RecordBuilder::new(9)
            .draft()
            .company("Pharmacy 3")
            .address("Oak St 4")
            .with_slot2_account("LS-9")
            .build();
        assert_eq!(record.id, RecordId(9));
        assert!(record.is_draft);
        assert_eq!(record.fields.company, "Pharmacy 3");
        assert!(record.fields.slot1.is_empty());
        assert_eq!(record.fields.slot2.personal_account, "LS-9");
    }
}
