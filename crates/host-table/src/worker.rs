//! 워커 핸들 -- 패킷 경로에서 쓰는 테이블 캐시 핸들
//!
//! 각 검사 워커는 [`HostAttributesWorker`] 하나를 소유합니다. 핸들은 게시된
//! 테이블의 `Arc`를 캐시해 두고, 워커 수명 주기 지점에서 `initialize`를
//! 호출할 때만 갱신합니다. 패킷마다 매니저 슬롯을 읽지 않습니다.

use std::net::IpAddr;
use std::sync::Arc;

use hostattr_core::types::ProtocolId;
use tracing::trace;

use crate::entry::{HostAttributesEntry, ServiceUpdate};
use crate::manager::HostAttributesManager;
use crate::stats::{DynamicCounters, HostAttributeStats};
use crate::table::HostAttributesTable;

/// 워커별 호스트 속성 핸들
///
/// 게시된 테이블이 아직 없으면 모든 조회는 "데이터 없음"으로 동작합니다.
/// 핸들이 drop되면 동적 카운터가 매니저의 누적값으로 합쳐집니다.
#[derive(Debug)]
pub struct HostAttributesWorker {
    manager: Arc<HostAttributesManager>,
    active: Option<Arc<HostAttributesTable>>,
    counters: Arc<DynamicCounters>,
}

impl HostAttributesWorker {
    pub(crate) fn new(manager: Arc<HostAttributesManager>, counters: Arc<DynamicCounters>) -> Self {
        let mut worker = Self {
            manager,
            active: None,
            counters,
        };
        worker.initialize();
        worker
    }

    /// 캐시된 테이블을 매니저의 swap 슬롯으로 갱신합니다.
    ///
    /// 이전에 잡고 있던 테이블은 여기서 놓습니다. 이제 보이는 세대 번호를 반환합니다.
    pub fn initialize(&mut self) -> Option<u64> {
        self.active = self.manager.swap_table();
        self.generation()
    }

    /// 현재 보고 있는 테이블의 세대 번호
    pub fn generation(&self) -> Option<u64> {
        self.active.as_ref().map(|t| t.generation())
    }

    /// 호스트를 조회합니다.
    pub fn find_host(&self, ip: &IpAddr) -> Option<Arc<HostAttributesEntry>> {
        self.active.as_ref()?.find(ip)
    }

    /// 트래픽에서 관찰한 서비스를 기록합니다.
    ///
    /// 처음 보는 호스트면 테이블에 새로 만들고 동적 호스트 추가로 집계합니다.
    /// 결과에 따라 갱신/추가/오버플로우 중 정확히 하나를 집계합니다.
    /// 게시된 테이블이 없으면 아무것도 하지 않고 `None`을 반환합니다.
    pub fn update_service(
        &self,
        ip: IpAddr,
        port: u16,
        ip_proto: u16,
        protocol_id: ProtocolId,
    ) -> Option<ServiceUpdate> {
        let table = self.active.as_ref()?;

        let (entry, created) = table.find_or_create(ip);
        if created {
            self.counters.record_host_add();
            trace!(host = %ip, generation = table.generation(), "dynamic host added");
        }

        let update = entry.update_service(
            port,
            ip_proto,
            protocol_id,
            self.manager.max_services_per_host(),
        );
        self.counters.record_service(update);
        Some(update)
    }

    /// 호스트의 `(ip_proto, port)` 바인딩 프로토콜 식별자
    ///
    /// 호스트나 바인딩이 없으면 [`ProtocolId::UNKNOWN`]을 반환합니다.
    pub fn protocol_id(&self, ip: &IpAddr, ip_proto: u16, port: u16) -> ProtocolId {
        self.find_host(ip)
            .map(|host| host.protocol_id(ip_proto, port))
            .unwrap_or(ProtocolId::UNKNOWN)
    }

    /// 현재 보고 있는 테이블의 호스트 수 (테이블이 없으면 `None`)
    pub fn get_num_host_entries(&self) -> Option<usize> {
        self.active.as_ref().map(|t| t.len())
    }

    /// 매니저 전체 통계
    pub fn stats(&self) -> HostAttributeStats {
        self.manager.stats()
    }
}

impl Drop for HostAttributesWorker {
    fn drop(&mut self) {
        self.active = None;
        self.manager.retire_worker(&self.counters);
    }
}
