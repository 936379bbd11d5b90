//! `hostattr config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use hostattr_core::config::HostAttrConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// `config show --section`에 허용되는 섹션 이름
const SECTIONS: [&str; 2] = ["general", "host_attributes"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// 설정 파일을 로드/검증하고 결과를 보고합니다.
///
/// # Errors
///
/// 파일이 없거나 파싱/검증에 실패하면 보고서를 출력한 뒤 `CliError::Config`를 반환합니다.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = validation_report(config_path, HostAttrConfig::load(config_path).await);
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

fn validation_report(
    config_path: &Path,
    result: Result<HostAttrConfig, hostattr_core::HostAttrError>,
) -> ConfigValidationReport {
    match result {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    }
}

/// 유효 설정(파일 + 환경변수 + 기본값)을 출력합니다.
///
/// 파일이 없으면 기본값으로 출력합니다.
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = HostAttrConfig::load_or_default(config_path).await?;
    let report = config_report(config_path, &config, section.as_deref())?;
    writer.render(&report)?;

    Ok(())
}

fn config_report(
    config_path: &Path,
    config: &HostAttrConfig,
    section: Option<&str>,
) -> Result<ConfigReport, CliError> {
    let config_toml = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("host_attributes") => toml::to_string_pretty(&config.host_attributes),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    }
    .unwrap_or_else(|e| format!("(serialization error: {})", e));

    Ok(ConfigReport {
        source: config_path.display().to_string(),
        section: section.map(str::to_owned),
        config: serde_json::to_value(config_section(config, section))?,
        config_toml,
    })
}

fn config_section<'a>(config: &'a HostAttrConfig, section: Option<&str>) -> ConfigSection<'a> {
    match section {
        Some("general") => ConfigSection::General(&config.general),
        Some("host_attributes") => ConfigSection::HostAttributes(&config.host_attributes),
        _ => ConfigSection::Full(config),
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ConfigSection<'a> {
    Full(&'a HostAttrConfig),
    General(&'a hostattr_core::GeneralConfig),
    HostAttributes(&'a hostattr_core::HostAttributesConfig),
}

/// Configuration display report.
///
/// 텍스트 출력은 TOML, JSON 출력은 `config` 필드의 구조화된 값을 사용합니다.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// 구조화된 설정 값
    pub config: serde_json::Value,
    /// Serialized TOML configuration
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostattr_core::error::{ConfigError, HostAttrError};

    fn render(payload: &impl Render) -> String {
        let mut buffer = Vec::new();
        payload
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_config_report_full_config() {
        let config = HostAttrConfig::default();
        let report = config_report(Path::new("hostattr.toml"), &config, None).unwrap();

        assert!(report.section.is_none());
        assert!(report.config_toml.contains("[general]"));
        assert!(report.config_toml.contains("[host_attributes]"));
        assert_eq!(
            report.config["host_attributes"]["max_attribute_hosts"].as_u64(),
            Some(1024)
        );

        let output = render(&report);
        assert!(output.contains("hostattr.toml"), "should contain source filename");
        assert!(output.contains("max_services_per_host"));
    }

    #[test]
    fn test_config_report_specific_section() {
        let config = HostAttrConfig::default();
        let report =
            config_report(Path::new("hostattr.toml"), &config, Some("host_attributes")).unwrap();

        assert_eq!(report.section.as_deref(), Some("host_attributes"));
        assert!(report.config_toml.contains("max_attribute_hosts"));
        assert!(!report.config_toml.contains("log_level"));
        assert_eq!(report.config["max_services_per_host"].as_u64(), Some(8));

        let output = render(&report);
        assert!(output.contains("[host_attributes]"), "should show section name");
    }

    #[test]
    fn test_config_report_unknown_section() {
        let config = HostAttrConfig::default();
        let err = config_report(Path::new("hostattr.toml"), &config, Some("logging")).unwrap_err();
        assert!(matches!(err, CliError::Command(_)));
        assert!(err.to_string().contains("host_attributes"));
    }

    #[test]
    fn test_config_report_json_skips_toml() {
        let config = HostAttrConfig::default();
        let report = config_report(Path::new("hostattr.toml"), &config, Some("general")).unwrap();

        let json = serde_json::to_string(&report).expect("JSON serialization should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should parse JSON");

        assert_eq!(parsed["section"].as_str(), Some("general"));
        assert_eq!(parsed["config"]["log_format"].as_str(), Some("json"));
        assert!(
            parsed.get("config_toml").is_none(),
            "config_toml should be skipped"
        );
    }

    #[test]
    fn test_validation_report_valid() {
        let report = validation_report(Path::new("ok.toml"), Ok(HostAttrConfig::default()));
        assert!(report.valid);

        let output = render(&report);
        assert!(output.contains("VALID"), "should show valid status");
        assert!(!output.contains("Error:"), "should not show errors");
    }

    #[test]
    fn test_validation_report_invalid() {
        let report = validation_report(
            Path::new("bad.toml"),
            Err(HostAttrError::Config(ConfigError::InvalidValue {
                field: "host_attributes.max_attribute_hosts".to_owned(),
                reason: "must be greater than 0".to_owned(),
            })),
        );
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);

        let output = render(&report);
        assert!(output.contains("INVALID"), "should show invalid status");
        assert!(output.contains("must be greater than 0"));
    }
}
