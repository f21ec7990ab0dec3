pub mod shared {
    pub mod core {
        pub mod access;
        pub mod confirmation;
        pub mod errors;
        pub mod notices;
        pub mod primitives;
    }
    pub mod infrastructure {
        pub mod http;
        pub mod preferences;
        pub mod session;
    }
}

pub mod modules {
    pub mod records {
        pub mod core {
            pub mod ports;
            pub mod provider_slot;
            pub mod record;
        }
        pub mod use_cases {
            pub mod draft_lifecycle {
                pub mod form_mode;
                pub mod manager;
            }
            pub mod transfer_slot {
                pub mod wizard;
            }
            pub mod record_actions;
        }
        pub mod adapters {
            pub mod mappers {
                pub mod record_dto;
            }
            pub mod http_record_service;
            pub mod in_memory_record_service;
        }
    }
    pub mod roster {
        pub mod core {
            pub mod calendar;
            pub mod duty;
            pub mod ports;
            pub mod selection;
        }
        pub mod use_cases {
            pub mod grid;
        }
        pub mod adapters {
            pub mod http_roster_service;
            pub mod in_memory_roster_service;
            pub mod wire;
        }
    }
    pub mod export {
        pub mod core {
            pub mod catalog;
            pub mod ports;
            pub mod selector;
        }
        pub mod use_cases {
            pub mod export_clients;
        }
        pub mod adapters {
            pub mod http_export_service;
            pub mod in_memory_export_service;
            pub mod wire;
        }
    }
}

pub mod shell;
