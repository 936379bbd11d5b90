//! 호스트 속성 테이블 -- 세대 번호가 붙은 LRU 캐시 인스턴스
//!
//! 매니저의 슬롯(next/active/swap/old)은 모두 `Arc<HostAttributesTable>`을 가리킵니다.

use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use hostattr_lru::{InsertOutcome, LruCacheShared, LruCacheStats};

use crate::entry::HostAttributesEntry;

/// IP 주소 -> 호스트 엔트리 캐시
pub type HostCache = LruCacheShared<IpAddr, HostAttributesEntry>;

/// 호스트 속성 테이블
#[derive(Debug)]
pub struct HostAttributesTable {
    generation: u64,
    cache: HostCache,
}

impl HostAttributesTable {
    /// 주어진 세대 번호와 용량으로 빈 테이블을 생성합니다.
    pub fn new(generation: u64, max_hosts: NonZeroUsize) -> Self {
        Self {
            generation,
            cache: LruCacheShared::new(max_hosts),
        }
    }

    /// 세대 번호 (게시 순서대로 증가)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 호스트를 조회합니다.
    pub fn find(&self, ip: &IpAddr) -> Option<Arc<HostAttributesEntry>> {
        self.cache.find(ip)
    }

    /// 호스트를 삽입합니다. 같은 주소가 이미 있으면 먼저 들어온 엔트리를 유지합니다.
    pub fn insert(&self, entry: HostAttributesEntry) -> InsertOutcome {
        self.cache.find_or_insert(entry.address(), Arc::new(entry), false)
    }

    /// 호스트를 찾거나 기본 정책으로 생성합니다. 두 번째 값은 생성 여부입니다.
    pub fn find_or_create(&self, ip: IpAddr) -> (Arc<HostAttributesEntry>, bool) {
        self.cache.find_or_create_with(ip, || HostAttributesEntry::new(ip))
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// 최대 호스트 수
    pub fn max_size(&self) -> usize {
        self.cache.max_size()
    }

    /// 최대 호스트 수를 변경합니다. 정리된 호스트 수를 반환합니다.
    pub fn set_max_size(&self, max_hosts: NonZeroUsize) -> usize {
        self.cache.set_max_size(max_hosts)
    }

    /// 용량 제한으로 정리된 호스트 수
    pub fn prunes(&self) -> u64 {
        self.cache.prunes()
    }

    /// 매니저의 누적 정리 카운터를 연결합니다. 이미 연결되어 있으면 `false`.
    pub fn attach_prune_counter(&self, counter: Arc<AtomicU64>) -> bool {
        self.cache.attach_prune_counter(counter)
    }

    /// 모든 호스트 (가장 최근 사용 먼저)
    pub fn hosts(&self) -> Vec<Arc<HostAttributesEntry>> {
        self.cache
            .snapshot()
            .into_iter()
            .map(|(_, entry)| entry)
            .collect()
    }

    /// 내부 캐시 통계
    pub fn cache_stats(&self) -> LruCacheStats {
        self.cache.stats()
    }
}
