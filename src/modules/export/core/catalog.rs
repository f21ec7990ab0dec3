// Exportable fields of a client record.
//
// `basic` and `network` are picked field by field. `provider1` and `provider2`
// are bundles: their children are listed for display only and are always
// exported together under the group key.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Fields,
    Bundle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub key: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldGroup {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: GroupKind,
    pub fields: &'static [FieldDef],
}

const fn field(key: &'static str, label: &'static str) -> FieldDef {
    FieldDef { key, label }
}

const BASIC: &[FieldDef] = &[
    field("address", "Address"),
    field("company", "Company"),
    field("inn", "INN"),
    field("phone", "Phone"),
    field("email", "Email"),
    field("pharmacy_code", "Pharmacy code"),
    field("iccid", "ICCID"),
    field("status", "Status"),
];

const NETWORK: &[FieldDef] = &[
    field("subnet", "Subnet"),
    field("external_ip", "External IP"),
    field("mikrotik_ip", "Mikrotik IP"),
    field("server_ip", "Server IP"),
];

const PROVIDER1: &[FieldDef] = &[
    field("provider1.provider", "Provider"),
    field("provider1.personal_account", "Personal account"),
    field("provider1.contract_number", "Contract number"),
    field("provider1.tariff", "Tariff"),
    field("provider1.connection_type", "Connection type"),
    field("provider1.modem_number", "Modem number"),
    field("provider1.modem_iccid", "Modem ICCID"),
    field("provider1.provider_settings", "Provider settings"),
    field("provider1.provider_equipment", "Provider equipment"),
];

const PROVIDER2: &[FieldDef] = &[
    field("provider2.provider", "Provider"),
    field("provider2.personal_account", "Personal account"),
    field("provider2.contract_number", "Contract number"),
    field("provider2.tariff", "Tariff"),
    field("provider2.connection_type", "Connection type"),
    field("provider2.modem_number", "Modem number"),
    field("provider2.modem_iccid", "Modem ICCID"),
    field("provider2.provider_settings", "Provider settings"),
    field("provider2.provider_equipment", "Provider equipment"),
];

pub const CATALOG: &[FieldGroup] = &[
    FieldGroup {
        key: "basic",
        label: "Basic information",
        kind: GroupKind::Fields,
        fields: BASIC,
    },
    FieldGroup {
        key: "network",
        label: "Network",
        kind: GroupKind::Fields,
        fields: NETWORK,
    },
    FieldGroup {
        key: "provider1",
        label: "Provider 1",
        kind: GroupKind::Bundle,
        fields: PROVIDER1,
    },
    FieldGroup {
        key: "provider2",
        label: "Provider 2",
        kind: GroupKind::Bundle,
        fields: PROVIDER2,
    },
];

pub fn group(key: &str) -> Option<&'static FieldGroup> {
    CATALOG.iter().find(|group| group.key == key)
}

/// The group a field belongs to.
pub fn group_of_field(field_key: &str) -> Option<&'static FieldGroup> {
    CATALOG
        .iter()
        .find(|group| group.fields.iter().any(|field| field.key == field_key))
}

/// Every key that can appear in the `fields` parameter, in catalog order.
pub fn wire_keys() -> Vec<&'static str> {
    CATALOG
        .iter()
        .flat_map(|group| match group.kind {
            GroupKind::Fields => group.fields.iter().map(|field| field.key).collect::<Vec<_>>(),
            GroupKind::Bundle => vec![group.key],
        })
        .collect()
}
