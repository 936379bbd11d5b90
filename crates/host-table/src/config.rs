//! 호스트 테이블 설정
//!
//! [`TableConfig`]는 core의 [`HostAttributesConfig`](hostattr_core::config::HostAttributesConfig)를
//! 기반으로 테이블 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use hostattr_core::config::HostAttrConfig;
//! use hostattr_table::config::TableConfig;
//!
//! let core_config = HostAttrConfig::default();
//! let config = TableConfig::from_core(&core_config.host_attributes);
//! ```

use std::num::NonZeroUsize;

use hostattr_core::config::{MAX_ATTRIBUTE_HOSTS_LIMIT, MAX_SERVICES_PER_HOST_LIMIT};
use serde::{Deserialize, Serialize};

use crate::error::HostTableError;

/// 호스트 파일 최대 크기 기본값 (16 MiB)
pub const DEFAULT_MAX_HOSTS_FILE_BYTES: u64 = 16 * 1024 * 1024;

/// 호스트 테이블 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// 테이블 최대 호스트 수 (LRU 용량)
    pub max_attribute_hosts: usize,
    /// 호스트당 최대 서비스 바인딩 수
    pub max_services_per_host: usize,
    /// 기본 호스트 파일 경로
    pub hosts_file: String,

    // --- 확장 설정 (core에 없는 추가 필드) ---
    /// 호스트 파일 최대 크기 (바이트)
    pub max_hosts_file_bytes: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_attribute_hosts: 1024,
            max_services_per_host: 8,
            hosts_file: String::new(),
            max_hosts_file_bytes: DEFAULT_MAX_HOSTS_FILE_BYTES,
        }
    }
}

impl TableConfig {
    /// core의 `HostAttributesConfig`에서 테이블 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값이 적용됩니다.
    pub fn from_core(core: &hostattr_core::config::HostAttributesConfig) -> Self {
        Self {
            max_attribute_hosts: core.max_attribute_hosts,
            max_services_per_host: core.max_services_per_host,
            hosts_file: core.hosts_file.clone(),
            ..Self::default()
        }
    }

    /// 테이블 용량
    ///
    /// 검증되지 않은 0 용량은 1로 취급합니다.
    pub fn capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_attribute_hosts).unwrap_or(NonZeroUsize::MIN)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HostTableError> {
        if self.max_attribute_hosts == 0 || self.max_attribute_hosts > MAX_ATTRIBUTE_HOSTS_LIMIT {
            return Err(HostTableError::Config {
                field: "max_attribute_hosts".to_owned(),
                reason: format!("must be 1-{}", MAX_ATTRIBUTE_HOSTS_LIMIT),
            });
        }

        if self.max_services_per_host == 0
            || self.max_services_per_host > MAX_SERVICES_PER_HOST_LIMIT
        {
            return Err(HostTableError::Config {
                field: "max_services_per_host".to_owned(),
                reason: format!("must be 1-{}", MAX_SERVICES_PER_HOST_LIMIT),
            });
        }

        if self.max_hosts_file_bytes == 0 {
            return Err(HostTableError::Config {
                field: "max_hosts_file_bytes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 테이블 설정 빌더
#[derive(Default)]
pub struct TableConfigBuilder {
    config: TableConfig,
}

impl TableConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 최대 호스트 수를 설정합니다.
    pub fn max_attribute_hosts(mut self, max: usize) -> Self {
        self.config.max_attribute_hosts = max;
        self
    }

    /// 호스트당 최대 서비스 수를 설정합니다.
    pub fn max_services_per_host(mut self, max: usize) -> Self {
        self.config.max_services_per_host = max;
        self
    }

    /// 기본 호스트 파일 경로를 설정합니다.
    pub fn hosts_file(mut self, path: impl Into<String>) -> Self {
        self.config.hosts_file = path.into();
        self
    }

    /// 호스트 파일 최대 크기를 설정합니다.
    pub fn max_hosts_file_bytes(mut self, bytes: u64) -> Self {
        self.config.max_hosts_file_bytes = bytes;
        self
    }

    /// 설정을 검증하고 `TableConfig`를 생성합니다.
    pub fn build(self) -> Result<TableConfig, HostTableError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
