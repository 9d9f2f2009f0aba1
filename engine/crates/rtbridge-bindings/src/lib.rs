//! 光追绑定层
//!
//! 每个入口都是固定的流水线：
//! 1. 检查后端是否存在、是否支持硬件光追
//! 2. 编组脚本参数
//! 3. 调用后端
//! 4. 成功时注册资源，返回 `{ type, id }`
//!
//! 任何一步失败都只输出一行 `<入口>: <原因>` 的警告，并返回 `null` / `undefined`，
//! 不会留下注册表条目，也不会泄漏后端资源。

pub mod bindings;
pub mod config;
pub mod global;

pub use bindings::RtBindings;
pub use config::{RtConfig, RtLogLevel};
