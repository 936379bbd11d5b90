//! 호스트 엔트리 -- 호스트 하나의 속성과 서비스 바인딩 목록
//!
//! 여러 검사 스레드가 같은 호스트의 서로 다른 서비스를 동시에 갱신할 수 있으므로
//! 서비스 목록은 엔트리 자체의 배타 잠금으로 보호합니다. 잠금은 목록 하나의
//! 짧은 탐색/추가 동안만 유지되며, 캐시 전체 연산에 걸쳐 유지되지 않습니다.

use std::net::IpAddr;

use hostattr_core::types::{ProtocolId, ServiceBinding, TargetPolicy};
use parking_lot::Mutex;
use serde::Serialize;

/// [`HostAttributesEntry::update_service`] 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceUpdate {
    /// 새 바인딩이 추가됨
    Added,
    /// 같은 `(port, ip_proto)` 바인딩의 프로토콜 식별자가 갱신됨
    Updated,
    /// 목록이 가득 차 바인딩이 버려짐
    Overflow,
}

impl ServiceUpdate {
    /// 바인딩이 수용되었는지 (추가 또는 갱신)
    pub fn is_accepted(self) -> bool {
        !matches!(self, Self::Overflow)
    }

    /// 기존 바인딩 갱신인지
    pub fn is_update(self) -> bool {
        matches!(self, Self::Updated)
    }
}

/// 호스트 속성 엔트리
///
/// 주소와 재조립 정책은 생성 시점에 정해지며 이후 변경되지 않습니다.
/// 서비스 목록에는 `(port, ip_proto)` 쌍마다 최대 하나의 바인딩만 존재합니다.
#[derive(Debug)]
pub struct HostAttributesEntry {
    address: IpAddr,
    frag_policy: TargetPolicy,
    stream_policy: TargetPolicy,
    services: Mutex<Vec<ServiceBinding>>,
}

impl HostAttributesEntry {
    /// 기본 정책으로 새 엔트리를 생성합니다.
    pub fn new(address: IpAddr) -> Self {
        Self::with_policies(address, TargetPolicy::default(), TargetPolicy::default())
    }

    /// 재조립 정책을 지정해 새 엔트리를 생성합니다.
    pub fn with_policies(
        address: IpAddr,
        frag_policy: TargetPolicy,
        stream_policy: TargetPolicy,
    ) -> Self {
        Self {
            address,
            frag_policy,
            stream_policy,
            services: Mutex::new(Vec::new()),
        }
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// IP 단편 재조립 정책
    pub fn frag_policy(&self) -> TargetPolicy {
        self.frag_policy
    }

    /// TCP 스트림 재조립 정책
    pub fn stream_policy(&self) -> TargetPolicy {
        self.stream_policy
    }

    /// 서비스 바인딩을 추가하거나 갱신합니다.
    ///
    /// 같은 `(port, ip_proto)` 바인딩이 있으면 프로토콜 식별자를 덮어쓰고,
    /// 없으면 목록 크기가 `max_services` 미만일 때만 끝에 추가합니다.
    /// 가득 찬 경우 기존 바인딩은 그대로 두고 [`ServiceUpdate::Overflow`]를 반환합니다.
    pub fn update_service(
        &self,
        port: u16,
        ip_proto: u16,
        protocol_id: ProtocolId,
        max_services: usize,
    ) -> ServiceUpdate {
        let mut services = self.services.lock();

        if let Some(binding) = services.iter_mut().find(|s| s.matches(port, ip_proto)) {
            binding.protocol_id = protocol_id;
            return ServiceUpdate::Updated;
        }

        if services.len() < max_services {
            services.push(ServiceBinding::new(port, ip_proto, protocol_id));
            ServiceUpdate::Added
        } else {
            ServiceUpdate::Overflow
        }
    }

    /// `(ip_proto, port)`에 바인딩된 프로토콜 식별자를 조회합니다.
    ///
    /// 바인딩이 없으면 [`ProtocolId::UNKNOWN`]을 반환합니다.
    pub fn protocol_id(&self, ip_proto: u16, port: u16) -> ProtocolId {
        self.services
            .lock()
            .iter()
            .find(|s| s.matches(port, ip_proto))
            .map(|s| s.protocol_id)
            .unwrap_or(ProtocolId::UNKNOWN)
    }

    /// 서비스 목록 복사본 (추가 순서)
    pub fn services(&self) -> Vec<ServiceBinding> {
        self.services.lock().clone()
    }

    pub fn service_count(&self) -> usize {
        self.services.lock().len()
    }

    /// 출력용 스냅샷을 생성합니다.
    pub fn snapshot(&self) -> HostSnapshot {
        HostSnapshot {
            address: self.address,
            frag_policy: self.frag_policy,
            stream_policy: self.stream_policy,
            services: self.services(),
        }
    }
}

/// 호스트 엔트리의 직렬화 가능한 스냅샷
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostSnapshot {
    /// 호스트 IP 주소
    pub address: IpAddr,
    /// IP 단편 재조립 정책
    pub frag_policy: TargetPolicy,
    /// TCP 스트림 재조립 정책
    pub stream_policy: TargetPolicy,
    /// 서비스 바인딩 목록
    pub services: Vec<ServiceBinding>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostattr_core::types::{IP_PROTO_TCP, IP_PROTO_UDP};
    use std::net::Ipv4Addr;

    const HTTP: ProtocolId = ProtocolId(1);
    const HTTPS: ProtocolId = ProtocolId(2);
    const HTTP2: ProtocolId = ProtocolId(3);

    fn host() -> HostAttributesEntry {
        HostAttributesEntry::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))
    }

    #[test]
    fn new_entry_has_default_policies_and_no_services() {
        let entry = host();
        assert_eq!(entry.frag_policy(), TargetPolicy::Linux);
        assert_eq!(entry.stream_policy(), TargetPolicy::Linux);
        assert_eq!(entry.service_count(), 0);
    }

    #[test]
    fn update_service_adds_then_updates() {
        let entry = host();
        let first = entry.update_service(80, IP_PROTO_TCP, HTTP, 4);
        assert_eq!(first, ServiceUpdate::Added);
        assert!(first.is_accepted());
        assert!(!first.is_update());

        let second = entry.update_service(80, IP_PROTO_TCP, HTTP2, 4);
        assert_eq!(second, ServiceUpdate::Updated);
        assert!(second.is_accepted());
        assert!(second.is_update());

        assert_eq!(entry.service_count(), 1);
        assert_eq!(entry.protocol_id(IP_PROTO_TCP, 80), HTTP2);
    }

    #[test]
    fn same_port_different_ip_proto_is_distinct() {
        let entry = host();
        entry.update_service(53, IP_PROTO_TCP, ProtocolId(5), 4);
        entry.update_service(53, IP_PROTO_UDP, ProtocolId(6), 4);
        assert_eq!(entry.service_count(), 2);
        assert_eq!(entry.protocol_id(IP_PROTO_UDP, 53), ProtocolId(6));
    }

    #[test]
    fn full_list_overflows_without_touching_existing() {
        // 호스트당 최대 1개: 80/tcp 추가 -> 443/tcp 오버플로우 -> 80/tcp 갱신
        let entry = host();
        assert_eq!(
            entry.update_service(80, IP_PROTO_TCP, HTTP, 1),
            ServiceUpdate::Added
        );

        let overflow = entry.update_service(443, IP_PROTO_TCP, HTTPS, 1);
        assert_eq!(overflow, ServiceUpdate::Overflow);
        assert!(!overflow.is_accepted());
        assert_eq!(entry.services(), vec![ServiceBinding::new(80, IP_PROTO_TCP, HTTP)]);

        assert_eq!(
            entry.update_service(80, IP_PROTO_TCP, HTTP2, 1),
            ServiceUpdate::Updated
        );
        assert_eq!(entry.protocol_id(IP_PROTO_TCP, 80), HTTP2);
        assert_eq!(entry.protocol_id(IP_PROTO_TCP, 443), ProtocolId::UNKNOWN);
    }

    #[test]
    fn services_keep_append_order() {
        let entry = host();
        entry.update_service(22, IP_PROTO_TCP, ProtocolId(1), 8);
        entry.update_service(80, IP_PROTO_TCP, ProtocolId(2), 8);
        entry.update_service(22, IP_PROTO_TCP, ProtocolId(3), 8);

        let ports: Vec<u16> = entry.services().iter().map(|s| s.port).collect();
        assert_eq!(ports, vec![22, 80]);
    }

    #[test]
    fn protocol_id_unknown_when_missing() {
        assert!(host().protocol_id(IP_PROTO_TCP, 8080).is_unknown());
    }

    #[test]
    fn snapshot_copies_fields() {
        let entry = HostAttributesEntry::with_policies(
            "2001:db8::1".parse().unwrap(),
            TargetPolicy::Windows,
            TargetPolicy::Win2003,
        );
        entry.update_service(445, IP_PROTO_TCP, ProtocolId(9), 8);

        let snapshot = entry.snapshot();
        assert_eq!(snapshot.address, entry.address());
        assert_eq!(snapshot.frag_policy, TargetPolicy::Windows);
        assert_eq!(snapshot.stream_policy, TargetPolicy::Win2003);
        assert_eq!(snapshot.services.len(), 1);
    }
}
