use crate::backend::RtBackend;
use crate::types::{
    RtBackendType, RtBlasHandle, RtGeometryDesc, RtGeometryHandle, RtTlasHandle, RtTlasInstance, RtTraceRequest,
};

/// 没有硬件光追时使用的后端
///
/// `is_supported()` 永远返回 `false`，所有创建操作都返回空 handle，destroy 都是 no-op。
#[derive(Debug, Default)]
pub struct StubRtBackend;
impl StubRtBackend {
    pub fn new() -> Self {
        Self
    }
}
impl RtBackend for StubRtBackend {
    fn is_supported(&self) -> bool {
        false
    }

    fn backend_type(&self) -> RtBackendType {
        RtBackendType::None
    }

    fn create_geometry(&mut self, _desc: &RtGeometryDesc<'_>) -> RtGeometryHandle {
        log::warn!("createGeometry: hardware ray tracing not available");
        RtGeometryHandle::null()
    }

    fn destroy_geometry(&mut self, _geometry: RtGeometryHandle) {}

    fn create_blas(&mut self, _geometries: &[RtGeometryHandle]) -> RtBlasHandle {
        log::warn!("createBLAS: hardware ray tracing not available");
        RtBlasHandle::null()
    }

    fn destroy_blas(&mut self, _blas: RtBlasHandle) {}

    fn create_tlas(&mut self, _instances: &[RtTlasInstance]) -> RtTlasHandle {
        log::warn!("createTLAS: hardware ray tracing not available");
        RtTlasHandle::null()
    }

    fn update_tlas(&mut self, _tlas: RtTlasHandle, _instances: &[RtTlasInstance]) {
        log::warn!("updateTLAS: hardware ray tracing not available");
    }

    fn destroy_tlas(&mut self, _tlas: RtTlasHandle) {}

    fn trace_rays(&mut self, _request: &RtTraceRequest<'_>) {
        log::warn!("traceRays: hardware ray tracing not available");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_is_unsupported() {
        let mut backend = StubRtBackend::new();
        assert!(!backend.is_supported());
        assert_eq!(backend.backend_type(), RtBackendType::None);
        assert_eq!(backend.backend_name(), "none");

        let vertices = [0u8; 36];
        let desc = RtGeometryDesc {
            vertices: &vertices,
            vertex_count: 3,
            vertex_stride: RtGeometryDesc::DEFAULT_VERTEX_STRIDE,
            vertex_offset: RtGeometryDesc::DEFAULT_VERTEX_OFFSET,
            indices: None,
            index_count: 0,
        };
        assert!(backend.create_geometry(&desc).is_null());
        assert!(backend.create_blas(&[]).is_null());
        assert!(backend.create_tlas(&[]).is_null());

        // destroy 对空 handle 是 no-op
        backend.destroy_geometry(RtGeometryHandle::null());
        backend.destroy_blas(RtBlasHandle::null());
        backend.destroy_tlas(RtTlasHandle::null());
    }
}
