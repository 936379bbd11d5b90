//! hostattr LRU 공유 캐시
//!
//! 용량이 제한된 스레드 안전 키 -> 값 캐시입니다. 호스트 속성에 대한 지식은
//! 없으며, 고정 용량 키 저장소라면 어디에나 쓸 수 있습니다.
//!
//! # 모듈 구성
//!
//! - [`cache`]: [`LruCacheShared`] 본체와 삽입 결과 타입
//! - [`stats`]: 원자 카운터 기반 통계 ([`LruCacheStats`])
//!
//! # 사용 예시
//!
//! ```
//! use std::num::NonZeroUsize;
//! use std::sync::Arc;
//!
//! use hostattr_lru::{InsertOutcome, LruCacheShared};
//!
//! let cache = LruCacheShared::new(NonZeroUsize::new(2).unwrap());
//! assert_eq!(cache.find_or_insert("a", Arc::new(1), false), InsertOutcome::Inserted);
//! assert_eq!(cache.find_or_insert("b", Arc::new(2), false), InsertOutcome::Inserted);
//! cache.find(&"a");
//! cache.find_or_insert("c", Arc::new(3), false);
//!
//! assert!(cache.find(&"b").is_none());
//! assert_eq!(cache.stats().alloc_prunes, 1);
//! ```

pub mod cache;
pub mod stats;

pub use cache::{InsertOutcome, LruCacheShared};
pub use stats::LruCacheStats;
