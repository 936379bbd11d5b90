//! 에러 타입 -- 도메인별 에러 정의

/// hostattr 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum HostAttrError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 호스트 속성 테이블 로드 에러
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 호스트 파일 로드 에러
///
/// 로드 실패 시 새로 구축 중이던 테이블은 폐기되고,
/// 활성 테이블은 그대로 유지됩니다.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// 수집 소스가 실패를 보고함
    #[error("host source '{source_name}' failed: {reason}")]
    Source { source_name: String, reason: String },

    /// 로드가 거부됨 (잘못된 레코드 등)
    #[error("load rejected: {0}")]
    Rejected(String),
}
