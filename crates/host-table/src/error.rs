//! 호스트 테이블 에러 타입
//!
//! [`HostTableError`]는 호스트 파일 수집과 테이블 설정에서 발생하는 에러를 표현합니다.
//! `From<HostTableError> for HostAttrError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use hostattr_core::error::{ConfigError, HostAttrError, LoadError};

/// 호스트 테이블 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum HostTableError {
    /// 호스트 파일을 읽을 수 없음
    #[error("hosts file error: {path}: {reason}")]
    HostsFile {
        /// 호스트 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 호스트 파일 형식 오류
    #[error("parse error: {source_name}: {reason}")]
    Parse {
        /// 수집 소스 이름
        source_name: String,
        /// 실패 사유
        reason: String,
    },

    /// 유효하지 않은 호스트 레코드
    #[error("invalid host record #{index} in {source_name}: {reason}")]
    InvalidRecord {
        /// 수집 소스 이름
        source_name: String,
        /// 레코드 순번 (0부터)
        index: usize,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<HostTableError> for HostAttrError {
    fn from(err: HostTableError) -> Self {
        match err {
            HostTableError::Config { field, reason } => {
                HostAttrError::Config(ConfigError::InvalidValue { field, reason })
            }
            HostTableError::Io(io) => HostAttrError::Io(io),
            HostTableError::HostsFile { path, reason } => HostAttrError::Load(LoadError::Source {
                source_name: path,
                reason,
            }),
            HostTableError::Parse {
                source_name,
                reason,
            } => HostAttrError::Load(LoadError::Source {
                source_name,
                reason,
            }),
            other @ HostTableError::InvalidRecord { .. } => {
                HostAttrError::Load(LoadError::Rejected(other.to_string()))
            }
        }
    }
}
