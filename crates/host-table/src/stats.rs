//! 호스트 속성 통계
//!
//! 통계 이름/종류 테이블([`HOST_ATTRIBUTE_PEGS`])과 조회 시점에 병합되는
//! 스냅샷([`HostAttributeStats`])을 정의합니다.
//!
//! 동적 카운터는 워커 핸들마다 따로 두고(`DynamicCounters`), 조회할 때
//! 살아 있는 워커와 종료된 워커의 값을 합산합니다.

use std::sync::atomic::{AtomicU64, Ordering};

use hostattr_core::metrics as m;
use serde::Serialize;

use crate::entry::ServiceUpdate;

/// 통계 집계 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountType {
    /// 여러 인스턴스의 값을 합산
    Sum,
    /// 여러 인스턴스 중 최댓값
    Max,
}

/// 통계 항목 정의
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PegInfo {
    pub kind: CountType,
    pub name: &'static str,
    pub help: &'static str,
}

/// 호스트 속성 통계 항목 (순서는 [`HostAttributeStats::values`]와 같음)
pub const HOST_ATTRIBUTE_PEGS: [PegInfo; 6] = [
    PegInfo {
        kind: CountType::Max,
        name: "total_hosts",
        help: "maximum number of entries in the host attribute table",
    },
    PegInfo {
        kind: CountType::Sum,
        name: "hosts_pruned",
        help: "number of LRU hosts pruned due to configured resource limits",
    },
    PegInfo {
        kind: CountType::Sum,
        name: "dynamic_host_adds",
        help: "number of host additions after initial host file load",
    },
    PegInfo {
        kind: CountType::Sum,
        name: "dynamic_service_adds",
        help: "number of service additions after initial host file load",
    },
    PegInfo {
        kind: CountType::Sum,
        name: "dynamic_service_updates",
        help: "number of service updates after initial host file load",
    },
    PegInfo {
        kind: CountType::Sum,
        name: "service_list_overflows",
        help: "number of service additions that failed due to configured resource limits",
    },
];

/// 호스트 속성 통계 스냅샷
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HostAttributeStats {
    /// 활성 테이블의 호스트 수
    pub total_hosts: u64,
    /// 용량 제한으로 정리된 호스트 수 (테이블 교체 후에도 누적)
    pub hosts_pruned: u64,
    /// 트래픽 관찰로 추가된 호스트 수
    pub dynamic_host_adds: u64,
    /// 트래픽 관찰로 추가된 서비스 수
    pub dynamic_service_adds: u64,
    /// 트래픽 관찰로 갱신된 서비스 수
    pub dynamic_service_updates: u64,
    /// 서비스 목록이 가득 차 버려진 서비스 수
    pub service_list_overflows: u64,
}

impl HostAttributeStats {
    /// [`HOST_ATTRIBUTE_PEGS`] 순서의 값 배열
    pub fn values(&self) -> [u64; 6] {
        [
            self.total_hosts,
            self.hosts_pruned,
            self.dynamic_host_adds,
            self.dynamic_service_adds,
            self.dynamic_service_updates,
            self.service_list_overflows,
        ]
    }

    /// `(항목 정의, 값)` 쌍을 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&'static PegInfo, u64)> {
        HOST_ATTRIBUTE_PEGS.iter().zip(self.values())
    }

    /// 통계를 `metrics` 레코더로 내보냅니다.
    pub fn publish(&self) {
        metrics::gauge!(m::TOTAL_HOSTS).set(self.total_hosts as f64);
        metrics::counter!(m::HOSTS_PRUNED_TOTAL).absolute(self.hosts_pruned);
        metrics::counter!(m::DYNAMIC_HOST_ADDS_TOTAL).absolute(self.dynamic_host_adds);
        metrics::counter!(m::DYNAMIC_SERVICE_ADDS_TOTAL).absolute(self.dynamic_service_adds);
        metrics::counter!(m::DYNAMIC_SERVICE_UPDATES_TOTAL)
            .absolute(self.dynamic_service_updates);
        metrics::counter!(m::SERVICE_LIST_OVERFLOWS_TOTAL).absolute(self.service_list_overflows);
    }
}

/// 워커별 동적 카운터
#[derive(Debug, Default)]
pub(crate) struct DynamicCounters {
    host_adds: AtomicU64,
    service_adds: AtomicU64,
    service_updates: AtomicU64,
    service_overflows: AtomicU64,
}

/// [`DynamicCounters`]의 값 복사본
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DynamicCounts {
    pub host_adds: u64,
    pub service_adds: u64,
    pub service_updates: u64,
    pub service_overflows: u64,
}

impl std::ops::AddAssign for DynamicCounts {
    fn add_assign(&mut self, other: Self) {
        self.host_adds += other.host_adds;
        self.service_adds += other.service_adds;
        self.service_updates += other.service_updates;
        self.service_overflows += other.service_overflows;
    }
}

impl DynamicCounters {
    pub(crate) fn record_host_add(&self) {
        self.host_adds.fetch_add(1, Ordering::Relaxed);
    }

    /// 결과에 따라 갱신/추가/오버플로우 중 정확히 하나를 증가시킵니다.
    pub(crate) fn record_service(&self, update: ServiceUpdate) {
        let counter = match update {
            ServiceUpdate::Added => &self.service_adds,
            ServiceUpdate::Updated => &self.service_updates,
            ServiceUpdate::Overflow => &self.service_overflows,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn absorb(&self, counts: DynamicCounts) {
        self.host_adds.fetch_add(counts.host_adds, Ordering::Relaxed);
        self.service_adds
            .fetch_add(counts.service_adds, Ordering::Relaxed);
        self.service_updates
            .fetch_add(counts.service_updates, Ordering::Relaxed);
        self.service_overflows
            .fetch_add(counts.service_overflows, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DynamicCounts {
        DynamicCounts {
            host_adds: self.host_adds.load(Ordering::Relaxed),
            service_adds: self.service_adds.load(Ordering::Relaxed),
            service_updates: self.service_updates.load(Ordering::Relaxed),
            service_overflows: self.service_overflows.load(Ordering::Relaxed),
        }
    }
}
