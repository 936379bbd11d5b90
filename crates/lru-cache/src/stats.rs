//! 캐시 통계
//!
//! 카운터는 원자 변수로 관리하므로 통계 조회가 맵 잠금을 잡지 않습니다.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// 캐시 내부 카운터
#[derive(Debug, Default)]
pub(crate) struct StatCounters {
    find_hits: AtomicU64,
    find_misses: AtomicU64,
    adds: AtomicU64,
    replaced: AtomicU64,
    alloc_prunes: AtomicU64,
    reload_prunes: AtomicU64,
    remove_hits: AtomicU64,
    remove_misses: AtomicU64,
    max_seen: AtomicU64,
}

impl StatCounters {
    pub(crate) fn record_find(&self, hit: bool) {
        if hit {
            self.find_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.find_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_add(&self, len_after: usize) {
        self.adds.fetch_add(1, Ordering::Relaxed);
        self.max_seen.fetch_max(len_after as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_replace(&self) {
        self.replaced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_alloc_prune(&self) {
        self.alloc_prunes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reload_prunes(&self, count: usize) {
        self.reload_prunes.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_remove(&self, hit: bool) {
        if hit {
            self.remove_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.remove_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> LruCacheStats {
        LruCacheStats {
            find_hits: self.find_hits.load(Ordering::Relaxed),
            find_misses: self.find_misses.load(Ordering::Relaxed),
            adds: self.adds.load(Ordering::Relaxed),
            replaced: self.replaced.load(Ordering::Relaxed),
            alloc_prunes: self.alloc_prunes.load(Ordering::Relaxed),
            reload_prunes: self.reload_prunes.load(Ordering::Relaxed),
            remove_hits: self.remove_hits.load(Ordering::Relaxed),
            remove_misses: self.remove_misses.load(Ordering::Relaxed),
            max_seen: self.max_seen.load(Ordering::Relaxed),
        }
    }
}

/// 캐시 통계 스냅샷
///
/// 각 필드는 개별적으로 읽으므로 필드 간 정확한 일관성은 보장하지 않습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LruCacheStats {
    /// 조회 성공 횟수
    pub find_hits: u64,
    /// 조회 실패 횟수
    pub find_misses: u64,
    /// 새 키 삽입 횟수
    pub adds: u64,
    /// 기존 값 교체 횟수
    pub replaced: u64,
    /// 삽입 시 용량 초과로 정리된 항목 수
    pub alloc_prunes: u64,
    /// 최대 크기 축소로 정리된 항목 수
    pub reload_prunes: u64,
    /// 삭제 성공 횟수
    pub remove_hits: u64,
    /// 삭제 대상이 없던 횟수
    pub remove_misses: u64,
    /// 관측된 최대 항목 수
    pub max_seen: u64,
}

impl LruCacheStats {
    /// 전체 정리 항목 수 (삽입 정리 + 축소 정리)
    pub fn total_prunes(&self) -> u64 {
        self.alloc_prunes + self.reload_prunes
    }
}
