//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `hostattr_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(hostattr_core::metrics::HOSTS_PRUNED_TOTAL).absolute(42);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── 호스트 속성 테이블 메트릭 ──────────────────────────────────────

/// 활성 테이블의 호스트 수 (gauge)
pub const TOTAL_HOSTS: &str = "hostattr_total_hosts";

/// 용량 제한으로 LRU 정리된 호스트 수 (counter)
pub const HOSTS_PRUNED_TOTAL: &str = "hostattr_hosts_pruned_total";

/// 호스트 파일 로드 이후 트래픽 관찰로 추가된 호스트 수 (counter)
pub const DYNAMIC_HOST_ADDS_TOTAL: &str = "hostattr_dynamic_host_adds_total";

/// 호스트 파일 로드 이후 추가된 서비스 수 (counter)
pub const DYNAMIC_SERVICE_ADDS_TOTAL: &str = "hostattr_dynamic_service_adds_total";

/// 호스트 파일 로드 이후 갱신된 서비스 수 (counter)
pub const DYNAMIC_SERVICE_UPDATES_TOTAL: &str = "hostattr_dynamic_service_updates_total";

/// 서비스 목록이 가득 차 버려진 서비스 수 (counter)
pub const SERVICE_LIST_OVERFLOWS_TOTAL: &str = "hostattr_service_list_overflows_total";

// ─── 제어 경로 메트릭 ──────────────────────────────────────────────

/// 호스트 파일 로드 시도 수 (counter, label: result)
pub const LOADS_TOTAL: &str = "hostattr_loads_total";

/// 호스트 파일 로드 소요 시간 (histogram, 초)
pub const LOAD_DURATION_SECONDS: &str = "hostattr_load_duration_seconds";

/// 현재 게시된 테이블 세대 번호 (gauge)
pub const ACTIVE_GENERATION: &str = "hostattr_active_generation";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 호스트 파일 로드 시간 히스토그램 버킷 (초)
///
/// 1ms ~ 60s 범위 (대형 호스트 파일은 디스크 I/O 포함)
pub const LOAD_DURATION_BUCKETS: [f64; 8] = [0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 10.0, 60.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_gauge!(
        TOTAL_HOSTS,
        "Number of entries in the active host attribute table"
    );
    describe_counter!(
        HOSTS_PRUNED_TOTAL,
        "Number of LRU hosts pruned due to configured resource limits"
    );
    describe_counter!(
        DYNAMIC_HOST_ADDS_TOTAL,
        "Number of host additions after initial host file load"
    );
    describe_counter!(
        DYNAMIC_SERVICE_ADDS_TOTAL,
        "Number of service additions after initial host file load"
    );
    describe_counter!(
        DYNAMIC_SERVICE_UPDATES_TOTAL,
        "Number of service updates after initial host file load"
    );
    describe_counter!(
        SERVICE_LIST_OVERFLOWS_TOTAL,
        "Number of service additions that failed due to configured resource limits"
    );

    describe_counter!(LOADS_TOTAL, "Host file load attempts by result");
    describe_histogram!(
        LOAD_DURATION_SECONDS,
        "Time to ingest a host file into a new table in seconds"
    );
    describe_gauge!(
        ACTIVE_GENERATION,
        "Generation number of the currently published host table"
    );
}
