//! hostattr 호스트 속성 테이블
//!
//! 패킷 경로에서 매 패킷 조회되는 호스트별 메타데이터 테이블입니다.
//! 설정 파일 일괄 로드와 실시간 트래픽 관찰 양쪽에서 갱신되며,
//! 검사 워커가 읽는 동안 새 테이블로 교체(핫스왑)할 수 있습니다.
//!
//! # 모듈 구성
//!
//! - [`entry`]: 호스트 엔트리와 서비스 바인딩 갱신 규칙
//! - [`table`]: 세대 번호가 붙은 LRU 캐시 인스턴스
//! - [`manager`]: next/active/swap/old 슬롯 기반 핫스왑 매니저
//! - [`worker`]: 워커별 캐시 핸들 (패킷 경로 API)
//! - [`stats`]: 통계 항목 정의와 스냅샷
//! - [`source`]: 호스트 수집 trait과 TOML 호스트 파일 구현
//! - [`protocol`]: 애플리케이션 프로토콜 이름 테이블
//! - [`config`]: 테이블 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//!  control path                         packet path (workers)
//!  ────────────                         ─────────────────────
//!  load_hosts_file ─▶ next              worker.initialize() ◀─ swap
//!  add_host ───────▶ next                 │
//!  activate: next ─▶ active/swap          ├─ find_host
//!            active ─▶ old                ├─ update_service
//!  swap_cleanup: old ─▶ release           └─ get_num_host_entries
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod manager;
pub mod protocol;
pub mod source;
pub mod stats;
pub mod table;
pub mod worker;

// --- 주요 타입 re-export ---

// 매니저
pub use manager::{HostAttributesManager, SwapCleanup};
pub use worker::HostAttributesWorker;

// 테이블 / 엔트리
pub use entry::{HostAttributesEntry, HostSnapshot, ServiceUpdate};
pub use table::HostAttributesTable;

// 설정
pub use config::{TableConfig, TableConfigBuilder};

// 에러
pub use error::HostTableError;

// 수집
pub use protocol::ProtocolTable;
pub use source::{HostLoader, HostSource, LoadSummary, TomlHostSource};

// 통계
pub use stats::{CountType, HOST_ATTRIBUTE_PEGS, HostAttributeStats, PegInfo};

pub use hostattr_lru::InsertOutcome;
