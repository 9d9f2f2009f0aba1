//! rtbridge 工具集
//!
//! 目前只提供宿主侧的日志初始化。

pub mod init_log;
