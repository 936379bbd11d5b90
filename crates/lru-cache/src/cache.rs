//! 용량 제한 LRU 공유 캐시
//!
//! [`LruCacheShared`]는 키 -> `Arc<V>` 매핑을 단일 `parking_lot::Mutex` 뒤에 두고
//! 최근 사용 순서를 관리합니다. 조회도 최근 사용 순서를 갱신하므로
//! `RwLock`이 아닌 배타 잠금을 사용하며, 잠금은 맵 연산 동안만 유지됩니다.
//!
//! 값은 `Arc`로 저장되므로 조회로 얻은 핸들은 항목이 정리된 뒤에도 유효합니다.
//! 값 내부의 동기화는 값 타입의 몫입니다.

use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

use crate::stats::{LruCacheStats, StatCounters};

/// [`LruCacheShared::find_or_insert`] 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// 새 키로 삽입됨
    Inserted,
    /// 이미 존재하여 기존 값을 유지함 (성공으로 취급)
    Present,
    /// 이미 존재하여 새 값으로 교체함
    Replaced,
}

impl InsertOutcome {
    /// 새 키가 추가되었는지 확인합니다.
    pub fn is_new(self) -> bool {
        self == Self::Inserted
    }
}

/// 스레드 안전 용량 제한 LRU 캐시
///
/// - 크기는 항상 `max_size` 이하입니다.
/// - 용량이 찬 상태에서 새 키를 삽입하면 가장 오래 사용되지 않은 항목 하나가
///   정리되고 `alloc_prunes`가 1 증가합니다.
/// - 조회(`find`), 삽입(`find_or_insert`), 생성(`find_or_create*`)이 키에
///   닿으면 해당 키는 가장 최근 사용 항목이 됩니다.
pub struct LruCacheShared<K, V, S = RandomState> {
    map: Mutex<LruCache<K, Arc<V>, S>>,
    counters: StatCounters,
    prune_sink: OnceLock<Arc<AtomicU64>>,
}

impl<K: Hash + Eq, V> LruCacheShared<K, V> {
    /// 기본 해셔로 새 캐시를 생성합니다.
    pub fn new(max_size: NonZeroUsize) -> Self {
        Self::with_hasher(max_size, RandomState::new())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LruCacheShared<K, V, S> {
    /// 지정한 해셔로 새 캐시를 생성합니다.
    pub fn with_hasher(max_size: NonZeroUsize, hasher: S) -> Self {
        Self {
            map: Mutex::new(LruCache::with_hasher(max_size, hasher)),
            counters: StatCounters::default(),
            prune_sink: OnceLock::new(),
        }
    }

    /// 키에 해당하는 값을 조회합니다.
    ///
    /// 찾으면 해당 키를 가장 최근 사용 항목으로 갱신합니다.
    pub fn find(&self, key: &K) -> Option<Arc<V>> {
        let found = self.map.lock().get(key).cloned();
        self.counters.record_find(found.is_some());
        found
    }

    /// 키가 없으면 값을 삽입합니다.
    ///
    /// 키가 이미 있으면 `replace`가 `false`일 때 기존 값을 그대로 두고
    /// [`InsertOutcome::Present`]를, `true`일 때 값을 교체하고
    /// [`InsertOutcome::Replaced`]를 반환합니다. 삽입은 실패하지 않습니다.
    pub fn find_or_insert(&self, key: K, value: Arc<V>, replace: bool) -> InsertOutcome {
        let mut map = self.map.lock();

        if let Some(existing) = map.get_mut(&key) {
            self.counters.record_find(true);
            if !replace {
                return InsertOutcome::Present;
            }
            let previous = std::mem::replace(existing, value);
            drop(map);
            drop(previous);
            self.counters.record_replace();
            return InsertOutcome::Replaced;
        }

        self.counters.record_find(false);
        let evicted = self.insert_new(&mut map, key, value);
        drop(map);
        drop(evicted);
        InsertOutcome::Inserted
    }

    /// 키에 해당하는 값을 찾거나 `make`로 생성해 삽입합니다.
    ///
    /// 반환값의 두 번째 요소는 새로 생성되었는지 여부입니다.
    /// `make`는 맵 잠금 안에서 호출되므로 값이 완전히 초기화된 뒤에야
    /// 다른 스레드에 보입니다. `make` 안에서 같은 캐시를 호출하면 안 됩니다.
    pub fn find_or_create_with<F>(&self, key: K, make: F) -> (Arc<V>, bool)
    where
        F: FnOnce() -> V,
    {
        let mut map = self.map.lock();

        if let Some(existing) = map.get(&key) {
            let existing = Arc::clone(existing);
            drop(map);
            self.counters.record_find(true);
            return (existing, false);
        }

        self.counters.record_find(false);
        let value = Arc::new(make());
        let evicted = self.insert_new(&mut map, key, Arc::clone(&value));
        drop(map);
        drop(evicted);
        (value, true)
    }

    /// 키에 해당하는 값을 찾거나 기본값으로 생성해 삽입합니다.
    pub fn find_or_create(&self, key: K) -> (Arc<V>, bool)
    where
        V: Default,
    {
        self.find_or_create_with(key, V::default)
    }

    /// 키를 삭제합니다. 삭제된 항목이 있었으면 `true`를 반환합니다.
    pub fn remove(&self, key: &K) -> bool {
        let removed = self.map.lock().pop(key);
        let hit = removed.is_some();
        self.counters.record_remove(hit);
        hit
    }

    /// 최대 크기를 변경합니다.
    ///
    /// 새 최대 크기보다 항목이 많으면 가장 오래된 항목부터 정리하고
    /// 정리된 개수를 반환합니다. 이 정리는 `reload_prunes`로 집계됩니다.
    pub fn set_max_size(&self, max_size: NonZeroUsize) -> usize {
        let mut map = self.map.lock();
        let mut pruned = Vec::new();
        while map.len() > max_size.get() {
            match map.pop_lru() {
                Some(entry) => pruned.push(entry),
                None => break,
            }
        }
        map.resize(max_size);

        let count = pruned.len();
        if count > 0 {
            self.counters.record_reload_prunes(count);
            self.forward_prunes(count as u64);
            trace!(
                pruned = count,
                max_size = max_size.get(),
                "lru cache shrunk"
            );
        }
        drop(map);
        count
    }

    /// 현재 항목 수
    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }

    /// 설정된 최대 항목 수
    pub fn max_size(&self) -> usize {
        self.map.lock().cap().get()
    }

    /// 전체 정리 항목 수 (삽입 정리 + 축소 정리)
    pub fn prunes(&self) -> u64 {
        self.counters.snapshot().total_prunes()
    }

    /// 관측된 최대 항목 수
    pub fn max_seen(&self) -> u64 {
        self.counters.snapshot().max_seen
    }

    /// 통계 스냅샷
    pub fn stats(&self) -> LruCacheStats {
        self.counters.snapshot()
    }

    /// 외부 누적 카운터를 연결합니다.
    ///
    /// 연결 시점까지의 정리 수를 먼저 더하고, 이후 정리는 발생할 때마다 더합니다.
    /// 여러 캐시가 한 카운터를 공유하면 캐시가 교체되어도 합계는 줄지 않습니다.
    /// 이미 연결되어 있으면 아무것도 하지 않고 `false`를 반환합니다.
    pub fn attach_prune_counter(&self, counter: Arc<AtomicU64>) -> bool {
        // 정리는 맵 잠금 안에서만 집계되므로 누락도 중복도 없음
        let _map = self.map.lock();
        if self.prune_sink.get().is_some() {
            return false;
        }
        counter.fetch_add(self.prunes(), Ordering::Relaxed);
        self.prune_sink.set(counter).is_ok()
    }

    fn forward_prunes(&self, count: u64) {
        if let Some(sink) = self.prune_sink.get() {
            sink.fetch_add(count, Ordering::Relaxed);
        }
    }

    /// 잠금을 잡은 상태에서 새 키를 삽입합니다. 정리된 항목을 반환합니다.
    ///
    /// 반환된 항목은 호출자가 잠금을 푼 뒤 해제합니다.
    fn insert_new(
        &self,
        map: &mut LruCache<K, Arc<V>, S>,
        key: K,
        value: Arc<V>,
    ) -> Option<(K, Arc<V>)> {
        let evicted = if map.len() >= map.cap().get() {
            map.pop_lru()
        } else {
            None
        };
        if evicted.is_some() {
            self.counters.record_alloc_prune();
            self.forward_prunes(1);
            trace!(len = map.len(), "lru entry pruned");
        }

        map.put(key, value);
        self.counters.record_add(map.len());
        evicted
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LruCacheShared<K, V, S> {
    /// 모든 항목을 최근 사용 순서(가장 최근 먼저)로 복사합니다.
    ///
    /// 최근 사용 순서를 변경하지 않습니다.
    pub fn snapshot(&self) -> Vec<(K, Arc<V>)> {
        self.map
            .lock()
            .iter()
            .map(|(key, value)| (key.clone(), Arc::clone(value)))
            .collect()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> fmt::Debug for LruCacheShared<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.map.lock();
        f.debug_struct("LruCacheShared")
            .field("len", &map.len())
            .field("max_size", &map.cap().get())
            .finish()
    }
}
