use crate::types::{
    RtBackendType, RtBlasHandle, RtGeometryDesc, RtGeometryHandle, RtTlasHandle, RtTlasInstance, RtTraceRequest,
};

/// 硬件光追后端接口
///
/// 平台相关的实现（DXR、Vulkan RT、Metal RT）都需要实现这个 trait，
/// 由 [`create_rt_backend`](crate::create_rt_backend) 根据平台能力选择具体实现。
///
/// # 契约
/// - 任何方法都不允许 panic，失败时输出诊断信息并返回空 handle
/// - [`is_supported`](Self::is_supported) 为 `false` 时，所有创建操作都必须直接失败
/// - destroy 系列对空 handle 是幂等的 no-op
///
/// # 资源状态
/// `Uninitialized -> Created -> Destroyed`，Destroyed 是终态
pub trait RtBackend {
    // ========================================================================
    // 能力查询
    // ========================================================================

    /// 是否支持硬件光追，没有副作用
    fn is_supported(&self) -> bool;

    fn backend_type(&self) -> RtBackendType;

    /// `"dxr"`、`"vulkan"`、`"metal"` 或 `"none"`
    fn backend_name(&self) -> &'static str {
        self.backend_type().name()
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// 根据顶点/索引数据创建 geometry，失败时返回空 handle
    fn create_geometry(&mut self, desc: &RtGeometryDesc<'_>) -> RtGeometryHandle;

    fn destroy_geometry(&mut self, geometry: RtGeometryHandle);

    // ========================================================================
    // Acceleration Structure
    // ========================================================================

    /// 使用一个或多个 geometry 构建 BLAS
    ///
    /// 输入为空时返回空 handle。构建成功后，调用者可以立即销毁这些 geometry，
    /// 不会影响 BLAS：后端要么拷贝数据，要么自己持有引用。
    fn create_blas(&mut self, geometries: &[RtGeometryHandle]) -> RtBlasHandle;

    fn destroy_blas(&mut self, blas: RtBlasHandle);

    /// 使用 BLAS 实例构建 TLAS，输入为空时返回空 handle
    fn create_tlas(&mut self, instances: &[RtTlasInstance]) -> RtTlasHandle;

    /// 不重新构建，直接更新实例的变换
    ///
    /// `instances` 的数量必须和构建时一致
    fn update_tlas(&mut self, tlas: RtTlasHandle, instances: &[RtTlasInstance]);

    fn destroy_tlas(&mut self, tlas: RtTlasHandle);

    // ========================================================================
    // Ray Tracing
    // ========================================================================

    /// 提交 trace rays 命令，结果写入 output target
    ///
    /// 只保证命令已提交，不等待 GPU 完成；失败只通过诊断信息报告
    fn trace_rays(&mut self, request: &RtTraceRequest<'_>);
}
