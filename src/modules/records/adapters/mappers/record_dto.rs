// Wire shape of a record and its mapping to the domain type.
//
// The backend keeps both provider slots flat on the record: slot one uses the
// bare names (`provider`, `tariff`, ...) and slot two the same names suffixed
// with `2`. Blank strings stand for "no value".

use crate::modules::records::core::ports::RecordPatch;
use crate::modules::records::core::provider_slot::{ConnectionType, ProviderSlotFields};
use crate::modules::records::core::record::{Record, RecordFields, RecordStatus};
use crate::shared::core::primitives::{ProviderId, RecordId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFieldsDto {
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

    pub provider: Option<ProviderId>,
    pub personal_account: String,
    pub contract_number: String,
    pub tariff: String,
    pub connection_type: String,
    pub modem_number: String,
    pub modem_iccid: String,
    pub provider_settings: String,
    pub provider_equipment: bool,

    pub provider2: Option<ProviderId>,
    pub personal_account2: String,
    pub contract_number2: String,
    pub tariff2: String,
    pub connection_type2: String,
    pub modem_number2: String,
    pub modem_iccid2: String,
    pub provider_settings2: String,
    pub provider_equipment2: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDto {
    pub id: RecordId,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(flatten)]
    pub fields: RecordFieldsDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatchDto {
    #[serde(flatten)]
    pub fields: RecordFieldsDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_draft: Option<bool>,
}

fn connection_type(raw: &str) -> Option<ConnectionType> {
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(kind) => Some(kind),
        Err(err) => {
            tracing::warn!(error = %err, "dropping unknown connection type");
            None
        }
    }
}

fn connection_type_wire(kind: Option<ConnectionType>) -> String {
    kind.map(|kind| kind.as_str().to_string()).unwrap_or_default()
}

impl From<RecordFieldsDto> for RecordFields {
    fn from(dto: RecordFieldsDto) -> Self {
        RecordFields {
            slot1: ProviderSlotFields {
                provider: dto.provider,
                personal_account: dto.personal_account,
                contract_number: dto.contract_number,
                tariff: dto.tariff,
                connection_type: connection_type(&dto.connection_type),
                modem_number: dto.modem_number,
                modem_iccid: dto.modem_iccid,
                provider_settings: dto.provider_settings,
                provider_equipment: dto.provider_equipment,
            },
            slot2: ProviderSlotFields {
                provider: dto.provider2,
                personal_account: dto.personal_account2,
                contract_number: dto.contract_number2,
                tariff: dto.tariff2,
                connection_type: connection_type(&dto.connection_type2),
                modem_number: dto.modem_number2,
                modem_iccid: dto.modem_iccid2,
                provider_settings: dto.provider_settings2,
                provider_equipment: dto.provider_equipment2,
            },
            last_name: dto.last_name,
            first_name: dto.first_name,
            middle_name: dto.middle_name,
            inn: dto.inn,
            phone: dto.phone,
            iccid: dto.iccid,
            email: dto.email,
            pharmacy_code: dto.pharmacy_code,
            company: dto.company,
            address: dto.address,
            status: dto.status,
            subnet: dto.subnet,
            external_ip: dto.external_ip,
        }
    }
}

impl From<RecordFields> for RecordFieldsDto {
    fn from(fields: RecordFields) -> Self {
        let RecordFields {
            last_name,
            first_name,
            middle_name,
            inn,
            phone,
            iccid,
            email,
            pharmacy_code,
            company,
            address,
            status,
            subnet,
            external_ip,
            slot1,
            slot2,
        } = fields;
        RecordFieldsDto {
            last_name,
            first_name,
            middle_name,
            inn,
            phone,
            iccid,
            email,
            pharmacy_code,
            company,
            address,
            status,
            subnet,
            external_ip,
            provider: slot1.provider,
            personal_account: slot1.personal_account,
            contract_number: slot1.contract_number,
            tariff: slot1.tariff,
            connection_type: connection_type_wire(slot1.connection_type),
            modem_number: slot1.modem_number,
            modem_iccid: slot1.modem_iccid,
            provider_settings: slot1.provider_settings,
            provider_equipment: slot1.provider_equipment,
            provider2: slot2.provider,
            personal_account2: slot2.personal_account,
            contract_number2: slot2.contract_number,
            tariff2: slot2.tariff,
            connection_type2: connection_type_wire(slot2.connection_type),
            modem_number2: slot2.modem_number,
            modem_iccid2: slot2.modem_iccid,
            provider_settings2: slot2.provider_settings,
            provider_equipment2: slot2.provider_equipment,
        }
    }
}

impl From<RecordDto> for Record {
    fn from(dto: RecordDto) -> Self {
        Record {
            id: dto.id,
            is_draft: dto.is_draft,
            fields: dto.fields.into(),
        }
    }
}

impl From<Record> for RecordDto {
    fn from(record: Record) -> Self {
        RecordDto {
            id: record.id,
            is_draft: record.is_draft,
            fields: record.fields.into(),
        }
    }
}

impl From<RecordPatch> for RecordPatchDto {
    fn from(patch: RecordPatch) -> Self {
        RecordPatchDto {
            fields: patch.fields.into(),
            is_draft: patch.is_draft,
        }
    }
}

impl From<RecordPatchDto> for RecordPatch {
    fn from(dto: RecordPatchDto) -> Self {
        RecordPatch {
            fields: dto.fields.into(),
            is_draft: dto.is_draft,
        }
    }
}

#[cfg(test)]
mod record_dto_mapper_tests {
    use super::*;
    use crate::modules::records::core::provider_slot::ProviderSlot;
    use crate::test_support::fixtures::records::RecordBuilder;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn it_should_read_a_sparse_payload_with_defaults() {
        let dto: RecordDto = serde_json::from_value(json!({ "id": 42, "is_draft": true })).unwrap();
        let record = Record::from(dto);
        assert_eq!(record.id, RecordId(42));
        assert!(record.is_draft);
        assert!(record.fields.slot1.is_empty());
        assert_eq!(record.fields.status, RecordStatus::Active);
    }

    #[rstest]
    fn it_should_map_suffixed_fields_to_slot_two() {
        let dto: RecordDto = serde_json::from_value(json!({
            "id": 7,
            "personal_account2": "LS-2",
            "connection_type2": "modem",
            "provider2": 4,
            "connection_type": "carrier-pigeon"
        }))
        .unwrap();
        let record = Record::from(dto);
        let slot2 = record.fields.slot(ProviderSlot::Two);
        assert_eq!(slot2.personal_account, "LS-2");
        assert_eq!(slot2.connection_type, Some(ConnectionType::Modem));
        assert_eq!(slot2.provider, Some(ProviderId(4)));
        assert_eq!(record.fields.slot1.connection_type, None);
    }

    #[rstest]
    fn it_should_send_the_draft_flag_only_when_set() {
        let fields = RecordBuilder::new(42).address("Main St 1").build().fields;
        let commit = serde_json::to_value(RecordPatchDto::from(RecordPatch::commit(fields.clone()))).unwrap();
        assert_eq!(commit["is_draft"], json!(false));
        assert_eq!(commit["address"], json!("Main St 1"));

        let update = serde_json::to_value(RecordPatchDto::from(RecordPatch::update(fields))).unwrap();
        assert!(update.get("is_draft").is_none());
    }
}
