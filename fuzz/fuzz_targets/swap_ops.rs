#![no_main]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use arbitrary::Arbitrary;
use hostattr_core::ProtocolId;
use hostattr_table::{HostAttributesEntry, HostAttributesManager, TableConfigBuilder};
use libfuzzer_sys::fuzz_target;

/// 제어 경로와 워커 경로 연산을 섞은 시퀀스
#[derive(Arbitrary, Debug)]
enum Op {
    AddHost { host: u8 },
    Activate,
    SwapCleanup,
    Initialize,
    Update { host: u8, port: u16, ip_proto: u8, protocol: u8 },
    Terminate,
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    max_hosts: u8,
    max_services: u8,
    ops: Vec<Op>,
}

fn ip(host: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, host))
}

fuzz_target!(|input: FuzzInput| {
    let max_hosts = usize::from(input.max_hosts.max(1));
    let max_services = usize::from(input.max_services.max(1));
    let Ok(config) = TableConfigBuilder::new()
        .max_attribute_hosts(max_hosts)
        .max_services_per_host(max_services)
        .build()
    else {
        return;
    };

    let manager = Arc::new(HostAttributesManager::new(&config));
    let mut worker = manager.worker();
    let mut updates = 0u64;
    let mut last_pruned = 0u64;

    // 연산 수 제한
    for op in input.ops.into_iter().take(256) {
        match op {
            Op::AddHost { host } => {
                manager.add_host(HostAttributesEntry::new(ip(host)));
            }
            Op::Activate => {
                manager.activate();
            }
            Op::SwapCleanup => {
                manager.swap_cleanup();
            }
            Op::Initialize => {
                worker.initialize();
            }
            Op::Update {
                host,
                port,
                ip_proto,
                protocol,
            } => {
                let protocol_id = ProtocolId(u16::from(protocol));
                if worker
                    .update_service(ip(host), port, u16::from(ip_proto), protocol_id)
                    .is_some()
                {
                    updates += 1;
                }
            }
            Op::Terminate => {
                manager.terminate();
            }
        }

        if let Some(len) = worker.get_num_host_entries() {
            assert!(len <= max_hosts);
        }
        let pruned = manager.stats().hosts_pruned;
        assert!(pruned >= last_pruned);
        last_pruned = pruned;
    }

    let stats = manager.stats();
    assert_eq!(
        stats.dynamic_service_adds + stats.dynamic_service_updates + stats.service_list_overflows,
        updates
    );
});
