//! 설정 관리 -- hostattr.toml 파싱 및 런타임 설정
//!
//! [`HostAttrConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`HOSTATTR_HOST_ATTRIBUTES_MAX_ATTRIBUTE_HOSTS=4096` 형식)
//! 3. 설정 파일 (`hostattr.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), hostattr_core::error::HostAttrError> {
//! use hostattr_core::config::HostAttrConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = HostAttrConfig::load("hostattr.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HostAttrConfig::parse("[host_attributes]\nmax_attribute_hosts = 4096")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, HostAttrError};

/// 호스트 테이블 최대 엔트리 수 상한
pub const MAX_ATTRIBUTE_HOSTS_LIMIT: usize = 16 * 1024 * 1024;

/// 호스트당 최대 서비스 수 상한
pub const MAX_SERVICES_PER_HOST_LIMIT: usize = 65_535;

/// hostattr 통합 설정
///
/// `hostattr.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostAttrConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 호스트 속성 테이블 설정
    #[serde(default)]
    pub host_attributes: HostAttributesConfig,
}

impl HostAttrConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HostAttrError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에 환경변수 오버라이드를 적용해 반환합니다.
    ///
    /// 파일이 존재하지만 파싱/검증에 실패하면 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, HostAttrError> {
        let path = path.as_ref();
        match Self::load(path).await {
            Err(HostAttrError::Config(ConfigError::FileNotFound { .. })) => {
                debug!(path = %path.display(), "config file not found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, HostAttrError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HostAttrError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                HostAttrError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, HostAttrError> {
        toml::from_str(toml_str).map_err(|e| {
            HostAttrError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `HOSTATTR_{SECTION}_{FIELD}`
    /// 예: `HOSTATTR_HOST_ATTRIBUTES_MAX_SERVICES_PER_HOST=16`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "HOSTATTR_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "HOSTATTR_GENERAL_LOG_FORMAT");

        // Host attributes
        override_usize(
            &mut self.host_attributes.max_attribute_hosts,
            "HOSTATTR_HOST_ATTRIBUTES_MAX_ATTRIBUTE_HOSTS",
        );
        override_usize(
            &mut self.host_attributes.max_services_per_host,
            "HOSTATTR_HOST_ATTRIBUTES_MAX_SERVICES_PER_HOST",
        );
        override_string(
            &mut self.host_attributes.hosts_file,
            "HOSTATTR_HOST_ATTRIBUTES_HOSTS_FILE",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HostAttrError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        self.host_attributes.validate()
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 호스트 속성 테이블 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostAttributesConfig {
    /// 테이블 최대 호스트 수 (LRU 캐시 용량)
    pub max_attribute_hosts: usize,
    /// 호스트당 최대 서비스 바인딩 수
    pub max_services_per_host: usize,
    /// 기본 호스트 파일 경로 (비어 있으면 없음)
    pub hosts_file: String,
}

impl Default for HostAttributesConfig {
    fn default() -> Self {
        Self {
            max_attribute_hosts: 1024,
            max_services_per_host: 8,
            hosts_file: String::new(),
        }
    }
}

impl HostAttributesConfig {
    /// 용량 제한 값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HostAttrError> {
        if self.max_attribute_hosts == 0 || self.max_attribute_hosts > MAX_ATTRIBUTE_HOSTS_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "host_attributes.max_attribute_hosts".to_owned(),
                reason: format!("must be 1-{MAX_ATTRIBUTE_HOSTS_LIMIT}"),
            }
            .into());
        }

        if self.max_services_per_host == 0
            || self.max_services_per_host > MAX_SERVICES_PER_HOST_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "host_attributes.max_services_per_host".to_owned(),
                reason: format!("must be 1-{MAX_SERVICES_PER_HOST_LIMIT}"),
            }
            .into());
        }

        Ok(())
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = HostAttrConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.host_attributes.max_attribute_hosts, 1024);
        assert_eq!(config.host_attributes.max_services_per_host, 8);
        assert!(config.host_attributes.hosts_file.is_empty());
    }

    #[test]
    fn default_config_passes_validation() {
        let config = HostAttrConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = HostAttrConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.host_attributes.max_attribute_hosts, 1024);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[host_attributes]
max_attribute_hosts = 4096
"#;
        let config = HostAttrConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.host_attributes.max_attribute_hosts, 4096);
        assert_eq!(config.host_attributes.max_services_per_host, 8);
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = HostAttrConfig::parse("invalid = [[[toml");
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            HostAttrError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = HostAttrConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = HostAttrConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let mut config = HostAttrConfig::default();
        config.host_attributes.max_attribute_hosts = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_attribute_hosts"));
    }

    #[test]
    fn validate_rejects_zero_services_per_host() {
        let mut config = HostAttrConfig::default();
        config.host_attributes.max_services_per_host = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_services_per_host"));
    }

    #[test]
    fn validate_rejects_services_above_limit() {
        let mut config = HostAttrConfig::default();
        config.host_attributes.max_services_per_host = MAX_SERVICES_PER_HOST_LIMIT + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: #[serial]로 다른 환경변수 테스트와 동시에 실행되지 않습니다.
        unsafe { std::env::set_var("TEST_HOSTATTR_STR", "overridden") };
        override_string(&mut val, "TEST_HOSTATTR_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_HOSTATTR_STR") };
    }

    #[test]
    #[serial]
    fn env_override_usize_invalid_keeps_original() {
        let mut val = 8usize;
        // SAFETY: #[serial]로 다른 환경변수 테스트와 동시에 실행되지 않습니다.
        unsafe { std::env::set_var("TEST_HOSTATTR_USIZE_BAD", "eight") };
        override_usize(&mut val, "TEST_HOSTATTR_USIZE_BAD");
        assert_eq!(val, 8); // 원래 값 유지
        unsafe { std::env::remove_var("TEST_HOSTATTR_USIZE_BAD") };
    }

    #[test]
    #[serial]
    fn apply_env_overrides_updates_host_attributes() {
        // SAFETY: #[serial]로 다른 환경변수 테스트와 동시에 실행되지 않습니다.
        unsafe {
            std::env::set_var("HOSTATTR_HOST_ATTRIBUTES_MAX_SERVICES_PER_HOST", "16");
            std::env::set_var("HOSTATTR_HOST_ATTRIBUTES_HOSTS_FILE", "/tmp/hosts.toml");
        }
        let mut config = HostAttrConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.host_attributes.max_services_per_host, 16);
        assert_eq!(config.host_attributes.hosts_file, "/tmp/hosts.toml");
        unsafe {
            std::env::remove_var("HOSTATTR_HOST_ATTRIBUTES_MAX_SERVICES_PER_HOST");
            std::env::remove_var("HOSTATTR_HOST_ATTRIBUTES_HOSTS_FILE");
        }
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_HOSTATTR_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = HostAttrConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = HostAttrConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(
            config.host_attributes.max_attribute_hosts,
            parsed.host_attributes.max_attribute_hosts
        );
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = HostAttrConfig::from_file("/nonexistent/path/hostattr.toml").await;
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            HostAttrError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    #[serial]
    async fn load_or_default_falls_back_when_missing() {
        let config = HostAttrConfig::load_or_default("/nonexistent/path/hostattr.toml")
            .await
            .unwrap();
        assert_eq!(config.host_attributes.max_attribute_hosts, 1024);
    }
}
