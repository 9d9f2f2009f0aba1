//! 硬件光追后端契约
//!
//! 脚本层与原生光追后端之间的边界。这里只定义生命周期与数据契约，
//! 不涉及任何 GPU 命令编码或 shader 编译。
//!
//! - [`RtBackend`]：所有平台后端（DXR / Vulkan RT / Metal RT）都需要实现的接口
//! - [`StubRtBackend`]：永远不支持硬件光追的占位实现
//! - [`create_rt_backend`]：探测平台并选择后端，失败时回退到 stub
//!
//! # 线程模型
//! 所有调用都发生在同一个脚本线程上，内部不做任何加锁。
//! 如果宿主是多线程的，需要在外部串行化对后端的访问。

pub mod backend;
pub mod error;
pub mod selector;
pub mod stub;
pub mod types;

#[cfg(feature = "recording")]
pub mod recording;

pub use backend::RtBackend;
pub use error::{RtError, RtResult};
pub use selector::{RtBackendPreference, create_rt_backend};
pub use stub::StubRtBackend;
pub use types::{
    RtBackendType, RtBlasHandle, RtGeometryDesc, RtGeometryHandle, RtNativeHandle, RtResourceKind, RtTlasHandle,
    RtTlasInstance, RtTraceRequest,
};
