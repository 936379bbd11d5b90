//! `hostattr hosts` command handler
//!
//! 호스트 파일을 새 매니저에 로드해 activate한 뒤 결과를 보여 줍니다.
//! 실행 중인 검사 엔진과는 상관없는 오프라인 점검 도구입니다.

use std::io::Write;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use hostattr_core::config::HostAttrConfig;
use hostattr_core::types::ip_proto_name;
use hostattr_table::{
    HostAttributesManager, HostSnapshot, HostTableError, LoadSummary, ProtocolTable, TableConfig,
    TomlHostSource,
};

use crate::cli::{HostsAction, HostsArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `hosts` command.
pub async fn execute(
    args: HostsArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        HostsAction::Check { file, metrics } => {
            let input = HostsInput::resolve(config_path, file).await?;
            execute_check(&input, metrics, writer).await
        }
        HostsAction::Lookup { file, ip } => {
            let input = HostsInput::resolve(config_path, file).await?;
            execute_lookup(&input, ip, writer).await
        }
        HostsAction::Dump { file } => {
            let input = HostsInput::resolve(config_path, file).await?;
            execute_dump(&input, writer).await
        }
    }
}

/// 로드할 호스트 파일과 테이블 설정
struct HostsInput {
    path: PathBuf,
    table_config: TableConfig,
}

impl HostsInput {
    /// 설정 파일을 읽고 호스트 파일 경로를 결정합니다.
    ///
    /// 인자로 준 경로가 없으면 `host_attributes.hosts_file`을 사용합니다.
    async fn resolve(config_path: &Path, file: Option<PathBuf>) -> Result<Self, CliError> {
        let config = HostAttrConfig::load_or_default(config_path).await?;
        let table_config = TableConfig::from_core(&config.host_attributes);
        table_config.validate()?;

        let path = match file {
            Some(path) => path,
            None if !table_config.hosts_file.is_empty() => {
                PathBuf::from(&table_config.hosts_file)
            }
            None => {
                return Err(CliError::Config(
                    "no hosts file given and host_attributes.hosts_file is empty".to_owned(),
                ));
            }
        };

        Ok(Self { path, table_config })
    }

    async fn open(&self) -> Result<LoadedTable, HostTableError> {
        info!(path = %self.path.display(), "loading hosts file");
        let protocols = Arc::new(ProtocolTable::new());
        let source = TomlHostSource::open_with_limit(
            &self.path,
            Arc::clone(&protocols),
            self.table_config.max_hosts_file_bytes,
        )
        .await?;
        LoadedTable::load(&source, &self.table_config)
    }
}

/// activate까지 마친 단일 세대 테이블
#[derive(Debug)]
struct LoadedTable {
    manager: HostAttributesManager,
    summary: LoadSummary,
    protocols: Arc<ProtocolTable>,
}

impl LoadedTable {
    fn load(source: &TomlHostSource, config: &TableConfig) -> Result<Self, HostTableError> {
        let manager = HostAttributesManager::new(config);
        let summary = manager.load_hosts_file(source)?;
        manager.activate();

        Ok(Self {
            manager,
            summary,
            protocols: Arc::clone(source.protocols()),
        })
    }

    fn lookup(&self, ip: &IpAddr) -> Option<HostView> {
        let table = self.manager.active_table()?;
        let entry = table.find(ip)?;
        Some(HostView::new(entry.snapshot(), &self.protocols))
    }

    fn hosts(&self) -> Vec<HostView> {
        self.manager
            .active_table()
            .map(|table| {
                table
                    .hosts()
                    .iter()
                    .map(|entry| HostView::new(entry.snapshot(), &self.protocols))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// 호스트 파일을 로드해 요약과 통계를 보고합니다.
///
/// # Errors
///
/// 로드에 실패하면 보고서를 출력한 뒤 `CliError::Load`를 반환합니다.
async fn execute_check(
    input: &HostsInput,
    with_metrics: bool,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    // 로드 메트릭까지 잡으려면 로드 전에 설치해야 함
    let recorder = if with_metrics {
        Some(
            crate::metrics::install_recorder()
                .map_err(|e| CliError::Command(format!("{e:#}")))?,
        )
    } else {
        None
    };

    let source = input.path.display().to_string();
    let mut report = match input.open().await {
        Ok(loaded) => {
            if recorder.is_some() {
                loaded.manager.stats().publish();
            }
            HostsCheckReport::loaded(source, &loaded)
        }
        Err(e) => {
            warn!(error = %e, "hosts file rejected");
            HostsCheckReport::failed(source, &e)
        }
    };
    report.metrics = recorder.map(|handle| handle.render());

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Load(report.errors.join("; ")));
    }
    Ok(())
}

async fn execute_lookup(
    input: &HostsInput,
    ip: IpAddr,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let loaded = input.open().await?;
    let report = HostLookupReport {
        source: input.path.display().to_string(),
        ip,
        host: loaded.lookup(&ip),
    };

    writer.render(&report)?;

    if report.host.is_none() {
        return Err(CliError::Command(format!("host not found: {}", ip)));
    }
    Ok(())
}

async fn execute_dump(input: &HostsInput, writer: &OutputWriter) -> Result<(), CliError> {
    let loaded = input.open().await?;
    let hosts = loaded.hosts();
    let report = HostDumpReport {
        source: input.path.display().to_string(),
        total: hosts.len(),
        hosts,
    };

    writer.render(&report)?;
    Ok(())
}

// ---- report payloads ----

/// 서비스 바인딩 표시용 형태
#[derive(Debug, Serialize)]
pub struct ServiceView {
    pub ip_proto: String,
    pub port: u16,
    pub protocol: String,
    pub protocol_id: u16,
}

/// 호스트 엔트리 표시용 형태
#[derive(Debug, Serialize)]
pub struct HostView {
    pub address: IpAddr,
    pub frag_policy: String,
    pub stream_policy: String,
    pub services: Vec<ServiceView>,
}

impl HostView {
    fn new(snapshot: HostSnapshot, protocols: &ProtocolTable) -> Self {
        Self {
            address: snapshot.address,
            frag_policy: snapshot.frag_policy.as_str().to_owned(),
            stream_policy: snapshot.stream_policy.as_str().to_owned(),
            services: snapshot
                .services
                .into_iter()
                .map(|svc| ServiceView {
                    ip_proto: ip_proto_name(svc.ip_proto),
                    port: svc.port,
                    protocol: protocols
                        .name(svc.protocol_id)
                        .unwrap_or_else(|| svc.protocol_id.0.to_string()),
                    protocol_id: svc.protocol_id.0,
                })
                .collect(),
        }
    }

    fn services_line(&self) -> String {
        if self.services.is_empty() {
            return "-".to_owned();
        }
        self.services
            .iter()
            .map(|s| format!("{}/{}={}", s.ip_proto, s.port, s.protocol))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 통계 항목 하나
#[derive(Debug, Serialize)]
pub struct PegValue {
    pub name: &'static str,
    pub help: &'static str,
    pub value: u64,
}

#[derive(Debug, Serialize)]
pub struct HostsCheckReport {
    pub source: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<LoadSummary>,
    pub protocols: usize,
    pub stats: Vec<PegValue>,
    pub errors: Vec<String>,
    /// Prometheus 노출 형식 (`--metrics`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<String>,
}

impl HostsCheckReport {
    fn loaded(source: String, loaded: &LoadedTable) -> Self {
        let stats = loaded.manager.stats();
        Self {
            source,
            valid: true,
            summary: Some(loaded.summary.clone()),
            protocols: loaded.protocols.len(),
            stats: stats
                .iter()
                .map(|(peg, value)| PegValue {
                    name: peg.name,
                    help: peg.help,
                    value,
                })
                .collect(),
            errors: Vec::new(),
            metrics: None,
        }
    }

    fn failed(source: String, err: &HostTableError) -> Self {
        Self {
            source,
            valid: false,
            summary: None,
            protocols: 0,
            stats: Vec::new(),
            errors: vec![err.to_string()],
            metrics: None,
        }
    }
}

impl Render for HostsCheckReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Hosts Check: {}", self.source.bold())?;

        if !self.valid {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
            return Ok(());
        }

        writeln!(w, "  Result: {}", "VALID".green().bold())?;
        if let Some(summary) = &self.summary {
            writeln!(
                w,
                "  Hosts: {} added, {} duplicate",
                summary.hosts_added, summary.duplicate_hosts
            )?;
            let dropped = if summary.services_dropped > 0 {
                summary.services_dropped.to_string().yellow()
            } else {
                summary.services_dropped.to_string().normal()
            };
            writeln!(
                w,
                "  Services: {} added, {} dropped",
                summary.services_added, dropped
            )?;
        }
        writeln!(w, "  Protocols: {}", self.protocols)?;

        writeln!(w)?;
        writeln!(w, "{:<26} {:>10}", "Statistic", "Value")?;
        writeln!(w, "{}", "-".repeat(37))?;
        for peg in &self.stats {
            writeln!(w, "{:<26} {:>10}", peg.name, peg.value)?;
        }

        if let Some(metrics) = &self.metrics {
            writeln!(w)?;
            write!(w, "{}", metrics)?;
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct HostLookupReport {
    pub source: String,
    pub ip: IpAddr,
    pub host: Option<HostView>,
}

impl Render for HostLookupReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let Some(host) = &self.host else {
            writeln!(
                w,
                "Host {} {} (source: {})",
                self.ip.to_string().bold(),
                "not found".yellow(),
                self.source
            )?;
            return Ok(());
        };

        writeln!(w, "Host {} (source: {})", host.address.to_string().bold(), self.source)?;
        writeln!(w, "  Frag policy:   {}", host.frag_policy)?;
        writeln!(w, "  Stream policy: {}", host.stream_policy)?;
        writeln!(w, "  Services ({}):", host.services.len())?;
        for svc in &host.services {
            writeln!(
                w,
                "    {:<5} {:>5}  {} (id {})",
                svc.ip_proto, svc.port, svc.protocol, svc.protocol_id
            )?;
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct HostDumpReport {
    pub source: String,
    pub total: usize,
    pub hosts: Vec<HostView>,
}

impl Render for HostDumpReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Host Attributes ({} total, source: {})",
            self.total.to_string().bold(),
            self.source
        )?;
        writeln!(w)?;
        writeln!(
            w,
            "{:<40} {:<12} {:<12} Services",
            "Address", "Frag", "Stream"
        )?;
        writeln!(w, "{}", "-".repeat(90))?;

        for host in &self.hosts {
            writeln!(
                w,
                "{:<40} {:<12} {:<12} {}",
                host.address.to_string(),
                host.frag_policy,
                host.stream_policy,
                host.services_line()
            )?;
        }

        Ok(())
    }
}
