//! 애플리케이션 프로토콜 이름 테이블
//!
//! 호스트 파일의 서비스 이름(`http`, `ssh` 등)을 [`ProtocolId`]로 변환합니다.
//! 식별자 0은 "알 수 없음"으로 예약되어 있으며, 새 이름은 1부터 순서대로 할당됩니다.

use std::collections::HashMap;

use hostattr_core::types::ProtocolId;
use parking_lot::RwLock;
use tracing::warn;

/// 예약된 "알 수 없음" 프로토콜 이름
pub const UNKNOWN_PROTOCOL_NAME: &str = "unknown";

#[derive(Debug)]
struct ProtocolNames {
    by_name: HashMap<String, ProtocolId>,
    names: Vec<String>,
}

/// 스레드 안전 프로토콜 이름 -> 식별자 테이블
#[derive(Debug)]
pub struct ProtocolTable {
    inner: RwLock<ProtocolNames>,
}

impl Default for ProtocolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolTable {
    /// "알 수 없음"만 등록된 새 테이블을 생성합니다.
    pub fn new() -> Self {
        let mut by_name = HashMap::new();
        by_name.insert(UNKNOWN_PROTOCOL_NAME.to_owned(), ProtocolId::UNKNOWN);
        Self {
            inner: RwLock::new(ProtocolNames {
                by_name,
                names: vec![UNKNOWN_PROTOCOL_NAME.to_owned()],
            }),
        }
    }

    /// 이름에 해당하는 식별자를 반환하고, 없으면 새로 할당합니다.
    ///
    /// 이름은 대소문자를 구분하지 않습니다. 식별자 공간이 가득 차면
    /// [`ProtocolId::UNKNOWN`]을 반환합니다.
    pub fn intern(&self, name: &str) -> ProtocolId {
        let normalized = name.trim().to_ascii_lowercase();
        if let Some(id) = self.inner.read().by_name.get(&normalized) {
            return *id;
        }

        let mut inner = self.inner.write();
        // 읽기 잠금을 푼 사이에 다른 스레드가 등록했을 수 있음
        if let Some(id) = inner.by_name.get(&normalized) {
            return *id;
        }

        let Ok(next) = u16::try_from(inner.names.len()) else {
            warn!(name = %normalized, "protocol id space exhausted");
            return ProtocolId::UNKNOWN;
        };
        let id = ProtocolId(next);
        inner.names.push(normalized.clone());
        inner.by_name.insert(normalized, id);
        id
    }

    /// 등록된 이름의 식별자를 조회합니다.
    pub fn lookup(&self, name: &str) -> Option<ProtocolId> {
        let normalized = name.trim().to_ascii_lowercase();
        self.inner.read().by_name.get(&normalized).copied()
    }

    /// 식별자의 이름을 조회합니다.
    pub fn name(&self, id: ProtocolId) -> Option<String> {
        self.inner.read().names.get(usize::from(id.0)).cloned()
    }

    /// 등록된 이름 수 ("알 수 없음" 포함)
    pub fn len(&self) -> usize {
        self.inner.read().names.len()
    }

    /// "알 수 없음" 외에 등록된 이름이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}
