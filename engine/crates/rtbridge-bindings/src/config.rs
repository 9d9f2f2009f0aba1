use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use rtbridge_backend::RtBackendPreference;
use serde::Deserialize;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RtLogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}
impl RtLogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Off => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}
impl FromStr for RtLogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}
impl fmt::Display for RtLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_level_filter(), f)
    }
}

/// 光追绑定层的配置
///
/// 加载顺序（后者覆盖前者）：默认值 -> TOML 文件 -> 环境变量
///
/// ```toml
/// backend = "vulkan"   # auto | none | dxr | vulkan | metal
/// log_level = "debug"  # off | error | warn | info | debug | trace
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RtConfig {
    /// 后端偏好，`none` 强制使用 stub
    pub backend: RtBackendPreference,

    pub log_level: RtLogLevel,
}
impl RtConfig {
    pub const ENV_BACKEND: &'static str = "RTBRIDGE_BACKEND";
    pub const ENV_LOG: &'static str = "RTBRIDGE_LOG";

    /// 从 TOML 文件加载配置，缺失的字段使用默认值
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).with_context(|| format!("读取配置文件失败: {:?}", path.as_ref()))?;
        Self::from_toml_str(&content).with_context(|| format!("解析 TOML 配置失败: {:?}", path.as_ref()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 默认值 -> 可选的配置文件 -> 进程环境变量
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// 使用 `lookup` 读取 `RTBRIDGE_BACKEND` / `RTBRIDGE_LOG` 并覆盖对应字段
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(backend) = lookup(Self::ENV_BACKEND) {
            self.backend = backend
                .parse::<RtBackendPreference>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("环境变量 {} 无效", Self::ENV_BACKEND))?;
        }
        if let Some(level) = lookup(Self::ENV_LOG) {
            self.log_level = level
                .parse::<RtLogLevel>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("环境变量 {} 无效", Self::ENV_LOG))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RtConfig::from_toml_str("").unwrap();
        assert_eq!(config, RtConfig::default());
        assert_eq!(config.backend, RtBackendPreference::Auto);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_parse_toml() {
        let config = RtConfig::from_toml_str("backend = \"none\"\nlog_level = \"debug\"\n").unwrap();
        assert_eq!(config.backend, RtBackendPreference::None);
        assert_eq!(config.log_level, RtLogLevel::Debug);

        assert!(RtConfig::from_toml_str("backend = \"optix\"").is_err());
        assert!(RtConfig::from_toml_str("frames = 3").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RtConfig::from_toml_str("backend = \"metal\"").unwrap();
        config
            .apply_overrides(|key| match key {
                RtConfig::ENV_BACKEND => Some("Vulkan".to_string()),
                RtConfig::ENV_LOG => Some("trace".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.backend, RtBackendPreference::Vulkan);
        assert_eq!(config.log_level, RtLogLevel::Trace);

        let err = config
            .apply_overrides(|key| (key == RtConfig::ENV_LOG).then(|| "loud".to_string()))
            .unwrap_err();
        assert!(format!("{err:#}").contains("RTBRIDGE_LOG"));
        // 失败时不修改已有的值
        assert_eq!(config.log_level, RtLogLevel::Trace);
    }

    #[test]
    fn test_missing_file() {
        assert!(RtConfig::from_file("does/not/exist.toml").is_err());
    }
}
