//! 동시성 통합 테스트
//!
//! 여러 워커 스레드가 같은 호스트/다른 호스트를 동시에 갱신하고,
//! 제어 경로가 그 사이에 테이블을 교체하는 상황을 검증합니다.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use hostattr_core::types::{IP_PROTO_TCP, IP_PROTO_UDP, ProtocolId};
use hostattr_table::{
    HostAttributesEntry, HostAttributesManager, ServiceUpdate, SwapCleanup, TableConfigBuilder,
};

const THREADS: u16 = 8;

fn manager(max_hosts: usize, max_services: usize) -> Arc<HostAttributesManager> {
    let config = TableConfigBuilder::new()
        .max_attribute_hosts(max_hosts)
        .max_services_per_host(max_services)
        .build()
        .unwrap();
    Arc::new(HostAttributesManager::new(&config))
}

#[test]
fn same_host_disjoint_services_no_lost_updates() {
    let per_thread: u16 = 32;
    let manager = manager(16, usize::from(THREADS * per_thread));
    let host = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    manager.add_host(HostAttributesEntry::new(host));
    manager.activate();

    let barrier = Arc::new(Barrier::new(usize::from(THREADS)));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let worker = manager.worker();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..per_thread {
                    let port = t * per_thread + i;
                    let update = worker.update_service(host, port, IP_PROTO_TCP, ProtocolId(t + 1));
                    assert_eq!(update, Some(ServiceUpdate::Added));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    let entry = manager.active_table().unwrap().find(&host).unwrap();
    assert_eq!(entry.service_count(), usize::from(THREADS * per_thread));
    for t in 0..THREADS {
        for i in 0..per_thread {
            let port = t * per_thread + i;
            assert_eq!(entry.protocol_id(IP_PROTO_TCP, port), ProtocolId(t + 1));
        }
    }

    let stats = manager.stats();
    assert_eq!(stats.dynamic_service_adds, u64::from(THREADS * per_thread));
    assert_eq!(stats.dynamic_service_updates, 0);
    assert_eq!(stats.service_list_overflows, 0);
}

#[test]
fn same_pair_from_many_threads_yields_single_binding() {
    let manager = manager(16, 4);
    let host = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7));
    manager.add_host(HostAttributesEntry::new(host));
    manager.activate();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let worker = manager.worker();
            thread::spawn(move || {
                for _ in 0..100 {
                    worker.update_service(host, 53, IP_PROTO_UDP, ProtocolId(t + 1));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    let entry = manager.active_table().unwrap().find(&host).unwrap();
    assert_eq!(entry.service_count(), 1);

    let stats = manager.stats();
    assert_eq!(stats.dynamic_service_adds, 1);
    assert_eq!(
        stats.dynamic_service_updates,
        u64::from(THREADS) * 100 - 1
    );
}

#[test]
fn concurrent_new_hosts_counted_once_each() {
    let manager = manager(4_096, 4);
    manager.add_host(HostAttributesEntry::new(IpAddr::V4(Ipv4Addr::LOCALHOST)));
    manager.activate();

    // 모든 스레드가 같은 256개 주소를 관찰
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let worker = manager.worker();
            thread::spawn(move || {
                for last in 0..=255u8 {
                    let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, last));
                    worker.update_service(ip, 80, IP_PROTO_TCP, ProtocolId(1));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    let stats = manager.stats();
    assert_eq!(stats.dynamic_host_adds, 256);
    assert_eq!(stats.total_hosts, 257);
    assert_eq!(stats.dynamic_service_adds, 256);
    assert_eq!(
        stats.dynamic_service_updates,
        u64::from(THREADS) * 256 - 256
    );
}

#[test]
fn workers_keep_reading_while_control_path_swaps() {
    let manager = manager(1_024, 8);
    manager.add_host(HostAttributesEntry::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0))));
    manager.activate();

    let rounds = 50u32;
    let barrier = Arc::new(Barrier::new(usize::from(THREADS) + 1));

    let readers: Vec<_> = (0..THREADS)
        .map(|t| {
            let mut worker = manager.worker();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut last_generation = 0;
                for round in 0..rounds {
                    barrier.wait();
                    let generation = worker.initialize().unwrap_or(0);
                    assert!(generation >= last_generation);
                    last_generation = generation;

                    let ip = IpAddr::V4(Ipv4Addr::new(10, 1, t as u8, (round % 250) as u8));
                    worker.update_service(ip, 443, IP_PROTO_TCP, ProtocolId(2));
                    assert!(worker.find_host(&ip).is_some());
                    barrier.wait();
                }
            })
        })
        .collect();

    for round in 0..rounds {
        manager.add_host(HostAttributesEntry::new(IpAddr::V4(Ipv4Addr::new(
            10,
            0,
            0,
            (round % 250) as u8,
        ))));
        assert!(manager.activate());
        barrier.wait();
        // 모든 워커가 initialize를 마친 뒤 정리
        barrier.wait();
        assert_ne!(manager.swap_cleanup(), SwapCleanup::Idle);
    }

    for reader in readers {
        reader.join().expect("reader thread panicked");
    }

    assert_eq!(manager.generation(), Some(u64::from(rounds) + 1));
    assert_eq!(
        manager.stats().dynamic_host_adds,
        u64::from(THREADS) * u64::from(rounds)
    );
}

#[test]
fn hosts_pruned_never_decreases_during_swaps() {
    let manager = manager(1, 8);
    let done = Arc::new(AtomicBool::new(false));

    let observer = {
        let manager = Arc::clone(&manager);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut last = 0;
            let mut reads = 0u64;
            while !done.load(Ordering::Acquire) {
                let pruned = manager.stats().hosts_pruned;
                assert!(pruned >= last, "hosts_pruned went from {last} to {pruned}");
                last = pruned;
                reads += 1;
            }
            reads
        })
    };

    let rounds = 2_000u32;
    for round in 0..rounds {
        let [_, _, hi, lo] = round.to_be_bytes();
        for last in 0..4u8 {
            let host = IpAddr::V4(Ipv4Addr::new(10, hi, lo, last));
            manager.add_host(HostAttributesEntry::new(host));
        }
        assert!(manager.activate());
        manager.swap_cleanup();
    }

    done.store(true, Ordering::Release);
    let reads = observer.join().expect("observer thread panicked");
    assert!(reads > 0);
    assert_eq!(manager.stats().hosts_pruned, u64::from(rounds) * 3);
}
