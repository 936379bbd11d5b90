//! 호스트 수집 모듈 -- 호스트 파일 등에서 새 테이블을 채웁니다.
//!
//! # 구성
//! - [`HostSource`]: 수집 소스 trait (이름 + 수집 함수)
//! - [`HostLoader`]: 구축 중인 테이블에 호스트를 넣는 싱크, 로드 요약 집계
//! - [`TomlHostSource`]: TOML 호스트 파일 구현
//!
//! # 흐름
//! ```text
//! load_hosts_file(source) ──▶ fresh table ──▶ source.ingest(&mut loader)
//!                                                 │ loader.add_host(entry) ...
//!                              Ok  ──▶ next 슬롯에 보관 (activate 대기)
//!                              Err ──▶ 폐기, active 유지
//! ```

pub mod toml_file;

pub use toml_file::TomlHostSource;

use hostattr_lru::InsertOutcome;
use serde::Serialize;

use crate::entry::HostAttributesEntry;
use crate::error::HostTableError;
use crate::table::HostAttributesTable;

/// 호스트 수집 소스
///
/// 매니저의 `load_hosts_file`이 새 테이블을 만든 뒤 `ingest`를 호출합니다.
/// `ingest`가 에러를 반환하면 그때까지 넣은 호스트와 함께 테이블 전체가 폐기됩니다.
pub trait HostSource {
    /// 로그와 요약에 쓰이는 소스 이름 (파일 경로 등)
    fn name(&self) -> &str;

    /// 모든 호스트 레코드를 `loader`에 추가합니다.
    fn ingest(&self, loader: &mut HostLoader<'_>) -> Result<(), HostTableError>;
}

/// 호스트 로드 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// 수집 소스 이름
    pub source: String,
    /// 추가된 호스트 수
    pub hosts_added: usize,
    /// 같은 주소가 이미 있어 무시된 호스트 수
    pub duplicate_hosts: usize,
    /// 추가된 호스트들의 서비스 바인딩 수
    pub services_added: usize,
    /// 호스트당 최대치를 넘어 버려진 서비스 수
    pub services_dropped: usize,
}

/// 구축 중인 테이블에 호스트를 추가하는 싱크
///
/// 매니저의 제어 잠금을 잡지 않은 채 새 테이블에 직접 씁니다.
pub struct HostLoader<'a> {
    table: &'a HostAttributesTable,
    max_services_per_host: usize,
    summary: LoadSummary,
}

impl<'a> HostLoader<'a> {
    pub(crate) fn new(
        source: &str,
        table: &'a HostAttributesTable,
        max_services_per_host: usize,
    ) -> Self {
        Self {
            table,
            max_services_per_host,
            summary: LoadSummary {
                source: source.to_owned(),
                ..LoadSummary::default()
            },
        }
    }

    /// 호스트를 추가합니다. 같은 주소가 이미 있으면 먼저 들어온 엔트리를 유지합니다.
    pub fn add_host(&mut self, entry: HostAttributesEntry) -> InsertOutcome {
        let services = entry.service_count();
        let outcome = self.table.insert(entry);
        if outcome.is_new() {
            self.summary.hosts_added += 1;
            self.summary.services_added += services;
        } else {
            self.summary.duplicate_hosts += 1;
        }
        outcome
    }

    /// 버려진 서비스 수를 기록합니다.
    pub fn record_dropped_services(&mut self, count: usize) {
        self.summary.services_dropped += count;
    }

    /// 호스트당 최대 서비스 수
    pub fn max_services_per_host(&self) -> usize {
        self.max_services_per_host
    }

    /// 지금까지의 로드 요약
    pub fn summary(&self) -> &LoadSummary {
        &self.summary
    }

    pub(crate) fn finish(self) -> LoadSummary {
        self.summary
    }
}
