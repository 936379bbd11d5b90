//! Prometheus 레코더 설치
//!
//! `hosts check --metrics`에서만 사용합니다. HTTP 리스너 없이 레코더만 설치하고,
//! 명령이 끝날 때 [`PrometheusHandle::render`]로 노출 형식 텍스트를 얻습니다.

use anyhow::Result;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use hostattr_core::metrics as m;

/// 전역 메트릭 레코더를 설치하고 핸들을 반환합니다.
///
/// 프로세스당 한 번만 호출할 수 있습니다.
pub fn install_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(m::LOAD_DURATION_SECONDS.to_owned()),
            &m::LOAD_DURATION_BUCKETS,
        )
        .map_err(|e| anyhow::anyhow!("invalid histogram buckets: {}", e))?
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {}", e))?;

    m::describe_all();
    tracing::debug!("prometheus metrics recorder installed");

    Ok(handle)
}
