//! 资源注册表
//!
//! 脚本侧只能看到整数 id，native handle 始终留在原生一侧。
//! Geometry / BLAS / TLAS 各自使用一张 [`RtResourceTable`]。

pub mod registry;
pub mod table;

pub use registry::{RtRegistryStats, RtResourceRegistry, RtTlasRecord};
pub use table::RtResourceTable;
