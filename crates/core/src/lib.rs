//! hostattr 공통 크레이트
//!
//! 호스트 속성 서브시스템의 모든 크레이트가 공유하는 에러, 설정,
//! 메트릭 이름, 도메인 타입을 정의합니다.
//!
//! # 모듈 구성
//! - [`config`]: `hostattr.toml` 파싱, 환경변수 오버라이드, 검증
//! - [`error`]: 도메인 에러 타입
//! - [`metrics`]: 메트릭 이름 상수 및 설명 등록
//! - [`types`]: 서비스 바인딩, 프로토콜 식별자, 타깃 정책

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, HostAttrError, LoadError};

// 설정
pub use config::{GeneralConfig, HostAttrConfig, HostAttributesConfig};

// 도메인 타입
pub use types::{ProtocolId, ServiceBinding, TargetPolicy};
