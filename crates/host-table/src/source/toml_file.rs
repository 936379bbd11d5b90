//! TOML 호스트 파일 수집 소스
//!
//! # 형식
//! ```toml
//! [[host]]
//! ip = "192.168.1.10"
//! frag_policy = "linux"      # 선택, 기본값 linux
//! stream_policy = "windows"  # 선택, 기본값 linux
//!
//! [[host.service]]
//! name = "http"
//! proto = "tcp"              # tcp/udp/icmp/sctp 또는 0-255 숫자
//! port = 80
//! ```
//!
//! 레코드는 수집하면서 하나씩 검증하므로, 중간의 잘못된 레코드는
//! 그 시점에 로드 전체를 실패시킵니다.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use hostattr_core::types::{TargetPolicy, parse_ip_proto};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{HostLoader, HostSource};
use crate::config::DEFAULT_MAX_HOSTS_FILE_BYTES;
use crate::entry::{HostAttributesEntry, ServiceUpdate};
use crate::error::HostTableError;
use crate::protocol::ProtocolTable;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HostsDocument {
    #[serde(default)]
    host: Vec<HostRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HostRecord {
    ip: String,
    #[serde(default)]
    frag_policy: Option<String>,
    #[serde(default)]
    stream_policy: Option<String>,
    #[serde(default)]
    service: Vec<ServiceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServiceRecord {
    name: String,
    proto: ProtoField,
    port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProtoField {
    Number(u16),
    Name(String),
}

impl ProtoField {
    fn resolve(&self) -> Option<u16> {
        match self {
            Self::Number(n) => u8::try_from(*n).ok().map(u16::from),
            Self::Name(name) => parse_ip_proto(name),
        }
    }
}

/// TOML 호스트 파일 소스
pub struct TomlHostSource {
    name: String,
    content: String,
    protocols: Arc<ProtocolTable>,
}

impl TomlHostSource {
    /// 파일에서 호스트 목록을 읽습니다 (최대 16 MiB).
    pub async fn open(
        path: impl AsRef<Path>,
        protocols: Arc<ProtocolTable>,
    ) -> Result<Self, HostTableError> {
        Self::open_with_limit(path, protocols, DEFAULT_MAX_HOSTS_FILE_BYTES).await
    }

    /// 크기 제한을 지정해 파일에서 호스트 목록을 읽습니다.
    pub async fn open_with_limit(
        path: impl AsRef<Path>,
        protocols: Arc<ProtocolTable>,
        max_bytes: u64,
    ) -> Result<Self, HostTableError> {
        let path = path.as_ref();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| HostTableError::HostsFile {
                path: path.display().to_string(),
                reason: format!("failed to read file metadata: {e}"),
            })?;

        if metadata.len() > max_bytes {
            return Err(HostTableError::HostsFile {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {max_bytes})",
                    metadata.len()
                ),
            });
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| HostTableError::HostsFile {
                path: path.display().to_string(),
                reason: format!("failed to read file: {e}"),
            })?;

        Ok(Self::from_toml(path.display().to_string(), content, protocols))
    }

    /// 메모리의 TOML 문자열로 소스를 생성합니다.
    pub fn from_toml(
        name: impl Into<String>,
        content: impl Into<String>,
        protocols: Arc<ProtocolTable>,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            protocols,
        }
    }

    /// 서비스 이름 해석에 쓰는 프로토콜 테이블
    pub fn protocols(&self) -> &Arc<ProtocolTable> {
        &self.protocols
    }

    fn invalid(&self, index: usize, reason: String) -> HostTableError {
        HostTableError::InvalidRecord {
            source_name: self.name.clone(),
            index,
            reason,
        }
    }

    fn parse_policy(
        &self,
        index: usize,
        field: &str,
        value: Option<&str>,
    ) -> Result<TargetPolicy, HostTableError> {
        match value {
            None => Ok(TargetPolicy::default()),
            Some(raw) => TargetPolicy::from_str_loose(raw)
                .ok_or_else(|| self.invalid(index, format!("unknown {field} '{raw}'"))),
        }
    }

    fn build_entry(
        &self,
        index: usize,
        record: &HostRecord,
        loader: &mut HostLoader<'_>,
    ) -> Result<HostAttributesEntry, HostTableError> {
        let address: IpAddr = record
            .ip
            .trim()
            .parse()
            .map_err(|_| self.invalid(index, format!("invalid ip address '{}'", record.ip)))?;
        let frag_policy = self.parse_policy(index, "frag_policy", record.frag_policy.as_deref())?;
        let stream_policy =
            self.parse_policy(index, "stream_policy", record.stream_policy.as_deref())?;

        let entry = HostAttributesEntry::with_policies(address, frag_policy, stream_policy);
        let max_services = loader.max_services_per_host();
        let mut dropped = 0;

        for service in &record.service {
            if service.name.trim().is_empty() {
                return Err(self.invalid(index, "service name must not be empty".to_owned()));
            }
            let ip_proto = service.proto.resolve().ok_or_else(|| {
                self.invalid(
                    index,
                    format!("invalid ip protocol for service '{}'", service.name),
                )
            })?;

            let protocol_id = self.protocols.intern(&service.name);
            if entry.update_service(service.port, ip_proto, protocol_id, max_services)
                == ServiceUpdate::Overflow
            {
                dropped += 1;
            }
        }

        if dropped > 0 {
            warn!(
                source = %self.name,
                host = %address,
                dropped,
                max_services,
                "services beyond per-host limit dropped"
            );
            loader.record_dropped_services(dropped);
        }

        Ok(entry)
    }
}

impl HostSource for TomlHostSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn ingest(&self, loader: &mut HostLoader<'_>) -> Result<(), HostTableError> {
        let document: HostsDocument =
            toml::from_str(&self.content).map_err(|e| HostTableError::Parse {
                source_name: self.name.clone(),
                reason: e.to_string(),
            })?;

        for (index, record) in document.host.iter().enumerate() {
            let entry = self.build_entry(index, record, loader)?;
            let address = entry.address();
            if !loader.add_host(entry).is_new() {
                debug!(source = %self.name, host = %address, "duplicate host ignored");
            }
        }

        debug!(
            source = %self.name,
            records = document.host.len(),
            "hosts file ingested"
        );
        Ok(())
    }
}
