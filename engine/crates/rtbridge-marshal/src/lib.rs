//! 编组层
//!
//! 每一种请求只有一个入口函数，所有的默认值与校验都在这里完成，
//! 后端永远不会看到只有一部分合法的描述符。
//!
//! | 请求 | 入口 |
//! |---|---|
//! | `createGeometry` | [`marshal_geometry_desc`] |
//! | `createBLAS` | [`marshal_geometry_list`] |
//! | `createTLAS` | [`marshal_tlas_build`] |
//! | `updateTLAS` | [`marshal_tlas_update`] |
//! | `traceRays` | [`marshal_trace_request`] |
//! | `destroy*` | [`handle_id`] |

pub mod acceleration;
pub mod buffer;
pub mod geometry;
pub mod handle;
pub mod trace;

pub use acceleration::{RtTlasUpdate, marshal_geometry_list, marshal_instance, marshal_tlas_build, marshal_tlas_update};
pub use buffer::extract_buffer;
pub use geometry::marshal_geometry_desc;
pub use handle::{handle_id, handle_object};
pub use trace::marshal_trace_request;
