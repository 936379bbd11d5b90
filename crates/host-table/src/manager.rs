//! 호스트 속성 매니저 -- 테이블 핫스왑 프로토콜
//!
//! 네 개의 슬롯으로 테이블 수명을 관리합니다.
//!
//! | 슬롯 | 의미 |
//! |------|------|
//! | next | 구축 중인 테이블 (아직 워커에 보이지 않음) |
//! | active | 현재 게시된 테이블 (제어 경로 조회용) |
//! | swap | 가장 최근 게시된 테이블 (워커 `initialize`가 읽는 유일한 슬롯) |
//! | old | 직전 active, `swap_cleanup`까지 보관 |
//!
//! # 상태 전이
//! ```text
//! load_hosts_file / add_host ──▶ next
//! activate: next ──▶ active + swap, active ──▶ old
//! worker.initialize: swap ──▶ 워커 캐시 핸들
//! swap_cleanup: old ──▶ 해제 (핀이 남아 있으면 마지막 워커가 놓을 때 해제)
//! terminate: 모든 슬롯 비움
//! ```
//!
//! 슬롯은 제어 경로 호출만 변경합니다. 제어 경로 호출(load → activate)은
//! 호출자가 서로 직렬화해야 합니다. 패킷 경로는 슬롯 잠금을 잡지 않습니다.
//!
//! # 해제 계약
//! 테이블은 `Arc`로 공유됩니다. `swap_cleanup`은 항상 old 슬롯을 비우고,
//! 아직 old를 잡고 있는 워커 수를 [`SwapCleanup::Deferred`]로 알려줍니다.
//! 그 경우 메모리는 마지막 워커가 `initialize`하거나 drop될 때 해제되므로
//! 어떤 워커도 해제된 테이블을 보지 않습니다.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use hostattr_core::metrics as m;
use hostattr_lru::InsertOutcome;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::TableConfig;
use crate::entry::HostAttributesEntry;
use crate::error::HostTableError;
use crate::source::{HostLoader, HostSource, LoadSummary};
use crate::stats::{DynamicCounters, HostAttributeStats};
use crate::table::HostAttributesTable;
use crate::worker::HostAttributesWorker;

/// [`HostAttributesManager::swap_cleanup`] 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapCleanup {
    /// 정리할 old 테이블이 없음
    Idle,
    /// old 테이블이 즉시 해제됨
    Released,
    /// old 슬롯은 비웠지만 워커가 아직 잡고 있어 해제가 미뤄짐
    Deferred {
        /// old 테이블을 잡고 있는 워커 수
        readers: usize,
    },
}

#[derive(Debug, Default)]
struct CacheSlots {
    next: Option<Arc<HostAttributesTable>>,
    active: Option<Arc<HostAttributesTable>>,
    swap: Option<Arc<HostAttributesTable>>,
    old: Option<Arc<HostAttributesTable>>,
}

/// 호스트 속성 매니저
///
/// 프로세스 전역 상태 없이 슬롯과 통계를 소유합니다. 워커 핸들은
/// [`HostAttributesManager::worker`]로 생성합니다.
#[derive(Debug)]
pub struct HostAttributesManager {
    slots: Mutex<CacheSlots>,
    max_attribute_hosts: AtomicUsize,
    max_services_per_host: AtomicUsize,
    last_generation: AtomicU64,
    workers: Mutex<Vec<Arc<DynamicCounters>>>,
    retired_counters: DynamicCounters,
    /// 게시된 적 있는 모든 테이블의 정리 수 합계
    hosts_pruned: Arc<AtomicU64>,
}

impl HostAttributesManager {
    /// 빈 매니저를 생성합니다. 게시된 테이블은 없습니다.
    pub fn new(config: &TableConfig) -> Self {
        Self {
            slots: Mutex::new(CacheSlots::default()),
            max_attribute_hosts: AtomicUsize::new(config.capacity().get()),
            max_services_per_host: AtomicUsize::new(config.max_services_per_host),
            last_generation: AtomicU64::new(0),
            workers: Mutex::new(Vec::new()),
            retired_counters: DynamicCounters::default(),
            hosts_pruned: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 새 워커 핸들을 생성합니다. 핸들은 현재 swap 테이블로 초기화됩니다.
    pub fn worker(self: &Arc<Self>) -> HostAttributesWorker {
        let counters = Arc::new(DynamicCounters::default());
        self.workers.lock().push(Arc::clone(&counters));
        HostAttributesWorker::new(Arc::clone(self), counters)
    }

    /// 호스트 소스로 새 테이블을 구축해 next 슬롯에 둡니다.
    ///
    /// 기존 next는 폐기됩니다. 수집이 실패하면 새 테이블도 폐기되고
    /// active는 그대로 유지됩니다. 수집 중에는 슬롯 잠금을 잡지 않습니다.
    pub fn load_hosts_file(&self, source: &dyn HostSource) -> Result<LoadSummary, HostTableError> {
        let started = Instant::now();

        let stale = self.slots.lock().next.take();
        if let Some(stale) = stale {
            debug!(
                generation = stale.generation(),
                "discarding unactivated host table"
            );
        }

        let table = Arc::new(self.new_table());
        let mut loader = HostLoader::new(source.name(), &table, self.max_services_per_host());
        let result = source.ingest(&mut loader);
        let summary = loader.finish();

        metrics::histogram!(m::LOAD_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                info!(
                    source = %summary.source,
                    generation = table.generation(),
                    hosts = summary.hosts_added,
                    duplicates = summary.duplicate_hosts,
                    services = summary.services_added,
                    services_dropped = summary.services_dropped,
                    pruned = table.prunes(),
                    "hosts file loaded"
                );
                self.slots.lock().next = Some(table);
                metrics::counter!(m::LOADS_TOTAL, m::LABEL_RESULT => "success").increment(1);
                Ok(summary)
            }
            Err(err) => {
                warn!(
                    source = %summary.source,
                    hosts_before_failure = summary.hosts_added,
                    error = %err,
                    "hosts file load failed, active table unchanged"
                );
                metrics::counter!(m::LOADS_TOTAL, m::LABEL_RESULT => "failure").increment(1);
                Err(err)
            }
        }
    }

    /// next 테이블에 호스트를 추가합니다. next가 없으면 새로 만듭니다.
    ///
    /// 같은 주소가 이미 있으면 먼저 추가된 엔트리를 유지합니다.
    pub fn add_host(&self, entry: HostAttributesEntry) -> InsertOutcome {
        let next = {
            let mut slots = self.slots.lock();
            let table = slots.next.get_or_insert_with(|| Arc::new(self.new_table()));
            Arc::clone(table)
        };
        next.insert(entry)
    }

    /// next 테이블을 게시합니다.
    ///
    /// 이전 active는 old로 옮겨집니다. 정리되지 않은 old가 남아 있으면 먼저
    /// 놓아줍니다. next가 없으면 아무것도 하지 않고 `false`를 반환합니다.
    ///
    /// 게시되는 테이블은 이 시점부터 정리 수를 매니저 합계에 더합니다.
    /// 은퇴한 테이블도 워커가 잡고 있는 동안 계속 더하므로 합계는 줄지 않습니다.
    pub fn activate(&self) -> bool {
        let mut guard = self.slots.lock();
        let slots = &mut *guard;
        let Some(next) = slots.next.take() else {
            debug!("activate called without a pending host table");
            return false;
        };

        next.attach_prune_counter(Arc::clone(&self.hosts_pruned));
        let stale_old = slots.old.take();
        slots.swap = Some(Arc::clone(&next));
        slots.old = slots.active.replace(Arc::clone(&next));
        drop(guard);

        if let Some(stale) = stale_old {
            debug!(
                generation = stale.generation(),
                "releasing uncleaned retired host table"
            );
        }

        metrics::gauge!(m::ACTIVE_GENERATION).set(next.generation() as f64);
        info!(
            generation = next.generation(),
            hosts = next.len(),
            "host attribute table activated"
        );
        true
    }

    /// old 테이블을 정리합니다.
    ///
    /// 호출자는 모든 워커가 `initialize`를 거친 뒤 호출해야 합니다. 그렇지 않아도
    /// 메모리 안전성은 유지되며, 남은 워커 수가 `Deferred`로 보고됩니다.
    pub fn swap_cleanup(&self) -> SwapCleanup {
        let Some(old) = self.slots.lock().old.take() else {
            return SwapCleanup::Idle;
        };

        let readers = Arc::strong_count(&old).saturating_sub(1);
        let generation = old.generation();
        drop(old);

        if readers == 0 {
            info!(generation, "retired host table released");
            SwapCleanup::Released
        } else {
            warn!(
                generation,
                readers, "retired host table still pinned by workers, release deferred"
            );
            SwapCleanup::Deferred { readers }
        }
    }

    /// old 테이블을 잡고 있는 워커 수 (old가 없으면 0)
    pub fn old_readers(&self) -> usize {
        self.slots
            .lock()
            .old
            .as_ref()
            .map(|old| Arc::strong_count(old).saturating_sub(1))
            .unwrap_or(0)
    }

    /// 모든 슬롯을 비웁니다 (프로세스 종료).
    pub fn terminate(&self) {
        let slots = std::mem::take(&mut *self.slots.lock());
        drop(slots);
        info!("host attribute manager terminated");
    }

    /// 한도를 변경합니다.
    ///
    /// 서비스 한도는 다음 갱신부터 적용되고, 호스트 한도는 이후 테이블과
    /// 현재 active 테이블에 적용됩니다. active에서 정리된 호스트 수를 반환합니다.
    pub fn set_limits(&self, config: &TableConfig) -> usize {
        self.max_services_per_host
            .store(config.max_services_per_host, Ordering::Relaxed);
        self.max_attribute_hosts
            .store(config.capacity().get(), Ordering::Relaxed);

        let active = self.slots.lock().active.clone();
        let pruned = active
            .map(|table| table.set_max_size(config.capacity()))
            .unwrap_or(0);
        if pruned > 0 {
            info!(
                pruned,
                max_attribute_hosts = config.capacity().get(),
                "active host table shrunk"
            );
        }
        pruned
    }

    pub fn max_attribute_hosts(&self) -> usize {
        self.max_attribute_hosts.load(Ordering::Relaxed)
    }

    pub fn max_services_per_host(&self) -> usize {
        self.max_services_per_host.load(Ordering::Relaxed)
    }

    /// active 테이블의 호스트 수 (게시된 테이블이 없으면 `None`)
    pub fn num_host_entries(&self) -> Option<usize> {
        self.slots.lock().active.as_ref().map(|t| t.len())
    }

    /// active 테이블의 세대 번호
    pub fn generation(&self) -> Option<u64> {
        self.slots.lock().active.as_ref().map(|t| t.generation())
    }

    /// active 테이블 (제어 경로 조회용)
    pub fn active_table(&self) -> Option<Arc<HostAttributesTable>> {
        self.slots.lock().active.clone()
    }

    /// activate를 기다리는 next 테이블이 있는지 확인합니다.
    pub fn has_pending(&self) -> bool {
        self.slots.lock().next.is_some()
    }

    /// 통계 스냅샷
    ///
    /// 살아 있는 워커와 종료된 워커의 동적 카운터를 합산하고, active 테이블의
    /// 크기와 지금까지 게시된 모든 테이블에서 정리된 호스트 수를 더합니다.
    pub fn stats(&self) -> HostAttributeStats {
        let total_hosts = self.num_host_entries().unwrap_or(0) as u64;

        let counts = {
            let workers = self.workers.lock();
            let mut counts = self.retired_counters.snapshot();
            for counters in workers.iter() {
                counts += counters.snapshot();
            }
            counts
        };

        HostAttributeStats {
            total_hosts,
            hosts_pruned: self.hosts_pruned.load(Ordering::Relaxed),
            dynamic_host_adds: counts.host_adds,
            dynamic_service_adds: counts.service_adds,
            dynamic_service_updates: counts.service_updates,
            service_list_overflows: counts.service_overflows,
        }
    }

    /// 워커 `initialize`가 읽는 swap 슬롯
    pub(crate) fn swap_table(&self) -> Option<Arc<HostAttributesTable>> {
        self.slots.lock().swap.clone()
    }

    /// 종료된 워커의 카운터를 누적값으로 옮깁니다.
    pub(crate) fn retire_worker(&self, counters: &Arc<DynamicCounters>) {
        let mut workers = self.workers.lock();
        workers.retain(|c| !Arc::ptr_eq(c, counters));
        self.retired_counters.absorb(counters.snapshot());
    }

    fn new_table(&self) -> HostAttributesTable {
        let generation = self.last_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let capacity = NonZeroUsize::new(self.max_attribute_hosts()).unwrap_or(NonZeroUsize::MIN);
        HostAttributesTable::new(generation, capacity)
    }
}
