use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use glam::{Mat4, Vec3};

/// 后端私有的 native 资源句柄
///
/// 不透明的非零整数，具体含义由后端决定（指针地址、arena key 等）。
/// 空指针无法用该类型表示，"创建失败" 由外层 handle 的 `None` 表达。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RtNativeHandle(NonZeroU64);
impl RtNativeHandle {
    /// `raw == 0` 时返回 `None`
    #[inline]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

/// 三种由注册表管理的资源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RtResourceKind {
    Geometry,
    Blas,
    Tlas,
}
impl RtResourceKind {
    pub const ALL: [RtResourceKind; 3] = [Self::Geometry, Self::Blas, Self::Tlas];

    /// 脚本侧 wrapper 对象中 `type` 字段的取值
    #[inline]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Geometry => "geometry",
            Self::Blas => "blas",
            Self::Tlas => "tlas",
        }
    }
}
impl fmt::Display for RtResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// 后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RtBackendType {
    /// 没有可用的硬件光追（stub）
    #[default]
    None,
    /// DirectX Raytracing (Windows)
    Dxr,
    /// Vulkan Ray Tracing (跨平台)
    Vulkan,
    /// Metal Ray Tracing (Apple)
    Metal,
}
impl RtBackendType {
    /// 暴露给脚本的名字：`"dxr"`、`"vulkan"`、`"metal"` 或 `"none"`
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Dxr => "dxr",
            Self::Vulkan => "vulkan",
            Self::Metal => "metal",
        }
    }
}
impl fmt::Display for RtBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
impl FromStr for RtBackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "dxr" => Ok(Self::Dxr),
            "vulkan" => Ok(Self::Vulkan),
            "metal" => Ok(Self::Metal),
            other => Err(format!("unknown ray tracing backend: {other}")),
        }
    }
}

/// 用于构建加速结构的几何输入
///
/// 只是对脚本 buffer 的借用视图，在 `create_geometry` 调用期间有效。
/// stride 与 offset 的单位都是字节。
#[derive(Debug, Clone, Copy)]
pub struct RtGeometryDesc<'a> {
    /// 顶点数据（原始字节）
    pub vertices: &'a [u8],
    /// 顶点数量，等于 float 数量 / 3
    ///
    /// 使用交错布局（stride 大于 12 字节）时，这个数量会大于 `vertices` 中
    /// 按 stride 实际能放下的顶点数。后端读取 position 前必须按 `vertices.len()`
    /// 做越界检查，或者直接使用会做这个检查的 [`Self::position`]。
    pub vertex_count: usize,
    /// 相邻顶点之间的字节数
    pub vertex_stride: usize,
    /// position 在顶点内的字节偏移
    pub vertex_offset: usize,
    /// 可选的 u32 索引数据
    pub indices: Option<&'a [u8]>,
    /// 索引数量，0 表示不使用索引
    pub index_count: usize,
}
impl RtGeometryDesc<'_> {
    /// 一个 vec3 position 的字节数
    pub const POSITION_SIZE: usize = 3 * size_of::<f32>();
    /// 紧密排列的 vec3
    pub const DEFAULT_VERTEX_STRIDE: usize = Self::POSITION_SIZE;
    pub const DEFAULT_VERTEX_OFFSET: usize = 0;

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some() && self.index_count > 0
    }

    /// 读取第 `vertex` 个顶点的 position
    ///
    /// 超出 `vertex_count` 或者超出 `vertices` 的字节范围时都返回 `None`
    pub fn position(&self, vertex: usize) -> Option<Vec3> {
        if vertex >= self.vertex_count {
            return None;
        }
        let start = vertex.checked_mul(self.vertex_stride)?.checked_add(self.vertex_offset)?;
        let bytes = self.vertices.get(start..start.checked_add(Self::POSITION_SIZE)?)?;
        Some(Vec3::from_array(bytemuck::pod_read_unaligned::<[f32; 3]>(bytes)))
    }

    /// 读取第 `i` 个索引
    pub fn index(&self, i: usize) -> Option<u32> {
        if i >= self.index_count {
            return None;
        }
        let start = i * size_of::<u32>();
        let bytes = self.indices?.get(start..start + size_of::<u32>())?;
        Some(bytemuck::pod_read_unaligned::<u32>(bytes))
    }

    pub fn iter_indices(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.index_count).filter_map(|i| self.index(i))
    }
}

/// 定义一种资源 handle：native 句柄 + 对脚本可见的 id
///
/// native 为 `None` 表示创建失败，这样的 handle 永远不会被注册。
macro_rules! define_rt_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name {
            native: Option<RtNativeHandle>,
            id: u32,
        }
        impl $name {
            #[inline]
            pub fn new(native: RtNativeHandle) -> Self {
                Self { native: Some(native), id: 0 }
            }
            #[inline]
            pub fn null() -> Self {
                Self::default()
            }
            #[inline]
            pub fn is_null(&self) -> bool {
                self.native.is_none()
            }
            #[inline]
            pub fn native(&self) -> Option<RtNativeHandle> {
                self.native
            }
            /// 注册表分配的 id，未注册时为 0
            #[inline]
            pub fn id(&self) -> u32 {
                self.id
            }
            #[inline]
            pub fn with_id(self, id: u32) -> Self {
                Self { id, ..self }
            }
        }
    };
}

define_rt_handle!(
    /// 后端处理过、可以用于构建 BLAS 的几何
    RtGeometryHandle
);
define_rt_handle!(
    /// 构建完成的 Bottom-Level Acceleration Structure，构建后不可修改
    RtBlasHandle
);
define_rt_handle!(
    /// 构建完成的 Top-Level Acceleration Structure，可以原地 update
    RtTlasHandle
);

/// TLAS 中的一个 BLAS 实例
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RtTlasInstance {
    pub blas: RtBlasHandle,
    /// 列主序的 4x4 变换矩阵
    pub transform: Mat4,
    /// shader 中可读取的实例 id
    pub instance_id: u32,
    /// 可见性掩码
    pub mask: u32,
    /// 实例标志位（例如关闭背面剔除）
    pub flags: u32,
}
impl RtTlasInstance {
    pub const DEFAULT_INSTANCE_ID: u32 = 0;
    pub const DEFAULT_MASK: u32 = 0xFF;
    pub const DEFAULT_FLAGS: u32 = 0;

    /// 使用默认值（单位矩阵、完全可见）创建实例
    pub fn new(blas: RtBlasHandle) -> Self {
        Self {
            blas,
            transform: Mat4::IDENTITY,
            instance_id: Self::DEFAULT_INSTANCE_ID,
            mask: Self::DEFAULT_MASK,
            flags: Self::DEFAULT_FLAGS,
        }
    }
}

/// 一次 trace rays 的参数
#[derive(Debug, Clone, Copy)]
pub struct RtTraceRequest<'a> {
    pub tlas: RtTlasHandle,
    pub width: u32,
    pub height: u32,
    /// 结果写入的目标（例如 WebGPU texture）
    pub output_target: RtNativeHandle,
    /// 可选的 uniform 数据
    pub uniforms: Option<&'a [u8]>,
}
