#![no_main]

use std::sync::Arc;

use hostattr_table::{HostAttributesManager, ProtocolTable, TableConfigBuilder, TomlHostSource};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // TOML 파서는 &str을 받으므로 UTF-8 변환 필요
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(config) = TableConfigBuilder::new()
        .max_attribute_hosts(32)
        .max_services_per_host(4)
        .build()
    else {
        return;
    };
    let manager = HostAttributesManager::new(&config);
    let protocols = Arc::new(ProtocolTable::new());
    let source = TomlHostSource::from_toml("fuzz-input.toml", content, protocols);

    match manager.load_hosts_file(&source) {
        Ok(_) => {
            assert!(manager.activate());
            let table = manager.active_table().expect("activated table");
            assert!(table.len() <= 32);
            for host in table.hosts() {
                assert!(host.service_count() <= 4);
            }
        }
        Err(_) => {
            // 실패한 로드는 아무것도 게시하지 않음
            assert!(!manager.has_pending());
            assert_eq!(manager.num_host_entries(), None);
        }
    }
});
