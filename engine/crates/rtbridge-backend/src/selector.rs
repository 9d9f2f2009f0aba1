use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::backend::RtBackend;
use crate::stub::StubRtBackend;
use crate::types::RtBackendType;

/// 配置中对后端的偏好
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RtBackendPreference {
    /// 按平台探测顺序选择第一个可用的后端
    #[default]
    Auto,
    /// 强制使用 stub
    None,
    Dxr,
    Vulkan,
    Metal,
}
impl RtBackendPreference {
    /// 需要依次尝试的后端
    pub fn candidates(self) -> Vec<RtBackendType> {
        match self {
            Self::Auto => platform_candidates(),
            Self::None => Vec::new(),
            Self::Dxr => vec![RtBackendType::Dxr],
            Self::Vulkan => vec![RtBackendType::Vulkan],
            Self::Metal => vec![RtBackendType::Metal],
        }
    }
}
impl FromStr for RtBackendPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        Ok(match s.parse::<RtBackendType>()? {
            RtBackendType::None => Self::None,
            RtBackendType::Dxr => Self::Dxr,
            RtBackendType::Vulkan => Self::Vulkan,
            RtBackendType::Metal => Self::Metal,
        })
    }
}
impl fmt::Display for RtBackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::None => RtBackendType::None.name(),
            Self::Dxr => RtBackendType::Dxr.name(),
            Self::Vulkan => RtBackendType::Vulkan.name(),
            Self::Metal => RtBackendType::Metal.name(),
        };
        f.write_str(name)
    }
}

/// 当前平台上值得尝试的后端，按优先级排序
pub fn platform_candidates() -> Vec<RtBackendType> {
    if cfg!(target_os = "windows") {
        vec![RtBackendType::Dxr, RtBackendType::Vulkan]
    } else if cfg!(any(target_os = "macos", target_os = "ios")) {
        vec![RtBackendType::Metal]
    } else {
        vec![RtBackendType::Vulkan]
    }
}

/// 创建当前平台合适的光追后端
///
/// 依次尝试候选后端，都不可用时返回 [`StubRtBackend`]，因此永远不会失败。
/// 只在进程启动时调用一次。
pub fn create_rt_backend(preference: RtBackendPreference) -> Box<dyn RtBackend> {
    for candidate in preference.candidates() {
        match create_platform_backend(candidate) {
            Some(backend) if backend.is_supported() => {
                log::info!("ray tracing backend selected: {}", backend.backend_name());
                return backend;
            }
            Some(backend) => {
                log::info!("ray tracing backend {} reports no hardware support", backend.backend_name());
            }
            None => {
                log::info!("ray tracing backend {candidate} is not available in this build");
            }
        }
    }

    log::info!("no hardware ray tracing backend, falling back to stub (preference: {preference})");
    Box::new(StubRtBackend::new())
}

/// 后端是一个封闭的集合，只在这里分派
fn create_platform_backend(backend_type: RtBackendType) -> Option<Box<dyn RtBackend>> {
    match backend_type {
        // 平台实现尚未编译进来
        RtBackendType::Dxr | RtBackendType::Vulkan | RtBackendType::Metal => None,
        RtBackendType::None => Some(Box::new(StubRtBackend::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_falls_back_to_stub() {
        for preference in [
            RtBackendPreference::Auto,
            RtBackendPreference::None,
            RtBackendPreference::Dxr,
            RtBackendPreference::Vulkan,
            RtBackendPreference::Metal,
        ] {
            let backend = create_rt_backend(preference);
            assert!(!backend.is_supported());
            assert_eq!(backend.backend_type(), RtBackendType::None);
        }
    }

    #[test]
    fn test_preference_parse() {
        assert_eq!("auto".parse::<RtBackendPreference>(), Ok(RtBackendPreference::Auto));
        assert_eq!("NONE".parse::<RtBackendPreference>(), Ok(RtBackendPreference::None));
        assert_eq!("metal".parse::<RtBackendPreference>(), Ok(RtBackendPreference::Metal));
        assert!("cuda".parse::<RtBackendPreference>().is_err());
        assert_eq!(RtBackendPreference::Dxr.to_string(), "dxr");
    }

    #[test]
    fn test_candidates() {
        assert!(RtBackendPreference::None.candidates().is_empty());
        assert_eq!(RtBackendPreference::Vulkan.candidates(), vec![RtBackendType::Vulkan]);
        assert!(!RtBackendPreference::Auto.candidates().is_empty());
    }
}
