//! 도메인 타입 -- 호스트 속성 전역에서 사용되는 공통 타입
//!
//! 서비스 바인딩, 애플리케이션 프로토콜 식별자, 타깃 기반 정책 등
//! 여러 크레이트가 공유하는 값 타입을 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// ICMP 프로토콜 번호
pub const IP_PROTO_ICMP: u16 = 1;
/// TCP 프로토콜 번호
pub const IP_PROTO_TCP: u16 = 6;
/// UDP 프로토콜 번호
pub const IP_PROTO_UDP: u16 = 17;
/// SCTP 프로토콜 번호
pub const IP_PROTO_SCTP: u16 = 132;

/// IP 프로토콜 이름 또는 숫자를 프로토콜 번호로 변환합니다.
///
/// `tcp`, `udp`, `icmp`, `sctp`는 대소문자를 구분하지 않고,
/// 그 외에는 0~255 범위의 숫자만 허용합니다.
pub fn parse_ip_proto(s: &str) -> Option<u16> {
    match s.to_ascii_lowercase().as_str() {
        "tcp" => Some(IP_PROTO_TCP),
        "udp" => Some(IP_PROTO_UDP),
        "icmp" => Some(IP_PROTO_ICMP),
        "sctp" => Some(IP_PROTO_SCTP),
        other => other.parse::<u8>().ok().map(u16::from),
    }
}

/// IP 프로토콜 번호의 표시용 이름
pub fn ip_proto_name(proto: u16) -> String {
    match proto {
        IP_PROTO_TCP => "tcp".to_owned(),
        IP_PROTO_UDP => "udp".to_owned(),
        IP_PROTO_ICMP => "icmp".to_owned(),
        IP_PROTO_SCTP => "sctp".to_owned(),
        other => other.to_string(),
    }
}

/// 해석된 애플리케이션 프로토콜 식별자
///
/// 0은 "알 수 없음"으로 예약되어 있습니다.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProtocolId(pub u16);

impl ProtocolId {
    /// 매칭되는 서비스가 없을 때 반환되는 식별자
    pub const UNKNOWN: Self = Self(0);

    /// 알 수 없음 식별자인지 확인합니다.
    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 서비스 바인딩
///
/// 호스트의 `(port, ip_proto)` 쌍과 해석된 애플리케이션 프로토콜의 연결입니다.
/// 호스트당 같은 `(port, ip_proto)` 쌍은 최대 하나만 존재합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceBinding {
    /// 포트 번호
    pub port: u16,
    /// IP 프로토콜 번호 (TCP=6, UDP=17 등)
    pub ip_proto: u16,
    /// 애플리케이션 프로토콜 식별자
    pub protocol_id: ProtocolId,
}

impl ServiceBinding {
    /// 새 서비스 바인딩을 생성합니다.
    pub fn new(port: u16, ip_proto: u16, protocol_id: ProtocolId) -> Self {
        Self {
            port,
            ip_proto,
            protocol_id,
        }
    }

    /// 같은 `(port, ip_proto)` 쌍인지 확인합니다.
    pub fn matches(&self, port: u16, ip_proto: u16) -> bool {
        self.port == port && self.ip_proto == ip_proto
    }
}

impl fmt::Display for ServiceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} proto_id={}",
            self.port,
            ip_proto_name(self.ip_proto),
            self.protocol_id
        )
    }
}

/// 타깃 기반 재조립 정책
///
/// 호스트의 운영체제별 IP 단편/TCP 스트림 재조립 방식을 나타냅니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetPolicy {
    /// 먼저 도착한 세그먼트 우선
    First,
    /// 나중에 도착한 세그먼트 우선
    Last,
    Bsd,
    BsdRight,
    OldLinux,
    /// 기본값
    #[default]
    Linux,
    Windows,
    #[serde(rename = "win-2003")]
    Win2003,
    Vista,
    Solaris,
    Hpux,
    Hpux10,
    Irix,
    Macos,
    Proxy,
}

impl TargetPolicy {
    /// 모든 정책 목록
    pub const ALL: [Self; 15] = [
        Self::First,
        Self::Last,
        Self::Bsd,
        Self::BsdRight,
        Self::OldLinux,
        Self::Linux,
        Self::Windows,
        Self::Win2003,
        Self::Vista,
        Self::Solaris,
        Self::Hpux,
        Self::Hpux10,
        Self::Irix,
        Self::Macos,
        Self::Proxy,
    ];

    /// 설정 파일에서 쓰는 이름
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Bsd => "bsd",
            Self::BsdRight => "bsd-right",
            Self::OldLinux => "old-linux",
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Win2003 => "win-2003",
            Self::Vista => "vista",
            Self::Solaris => "solaris",
            Self::Hpux => "hpux",
            Self::Hpux10 => "hpux10",
            Self::Irix => "irix",
            Self::Macos => "macos",
            Self::Proxy => "proxy",
        }
    }

    /// 문자열에서 정책을 파싱합니다.
    ///
    /// 대소문자를 구분하지 않고, `_`와 `-`를 같은 문자로 취급합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == normalized)
    }
}

impl fmt::Display for TargetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
