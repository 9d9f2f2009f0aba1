//! 完全在内存中运行的后端
//!
//! 每一次契约调用都会被记录下来，native handle 由 SlotMap 分配，
//! 因此可以观察 destroy 是否被转发、是否有资源泄漏、update 时的实例数量等。

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{Key, KeyData, SlotMap, new_key_type};

use crate::backend::RtBackend;
use crate::types::{
    RtBackendType, RtBlasHandle, RtGeometryDesc, RtGeometryHandle, RtNativeHandle, RtTlasHandle, RtTlasInstance,
    RtTraceRequest,
};

new_key_type! { struct RecordedKey; }

/// 被记录下来的一次调用
#[derive(Debug, Clone, PartialEq)]
pub enum RtBackendCall {
    CreateGeometry {
        vertex_count: usize,
        vertex_stride: usize,
        vertex_offset: usize,
        index_count: usize,
    },
    DestroyGeometry(Option<RtNativeHandle>),
    CreateBlas {
        geometry_count: usize,
    },
    DestroyBlas(Option<RtNativeHandle>),
    CreateTlas {
        instances: Vec<RtTlasInstance>,
    },
    UpdateTlas {
        tlas: Option<RtNativeHandle>,
        instances: Vec<RtTlasInstance>,
    },
    DestroyTlas(Option<RtNativeHandle>),
    TraceRays {
        tlas: Option<RtNativeHandle>,
        width: u32,
        height: u32,
        output_target: RtNativeHandle,
        uniforms_len: Option<usize>,
    },
}

#[derive(Default)]
struct RecordingState {
    supported: bool,
    fail_creations: bool,

    /// geometry -> position 数据的拷贝
    geometries: SlotMap<RecordedKey, Vec<f32>>,
    /// BLAS 构建时拷贝 geometry 的数据，之后与 geometry 的生命周期无关
    blases: SlotMap<RecordedKey, Vec<Vec<f32>>>,
    /// TLAS -> 构建时的实例
    tlases: SlotMap<RecordedKey, Vec<RtTlasInstance>>,

    calls: Vec<RtBackendCall>,
}

fn to_native(key: RecordedKey) -> Option<RtNativeHandle> {
    // SlotMap 中存活 key 的 version 为奇数，因此 ffi 值不会是 0
    RtNativeHandle::from_raw(key.data().as_ffi())
}

fn to_key(native: Option<RtNativeHandle>) -> Option<RecordedKey> {
    native.map(|native| KeyData::from_ffi(native.raw()).into())
}

/// 记录所有调用的后端
pub struct RecordingRtBackend {
    state: Rc<RefCell<RecordingState>>,
}
impl Default for RecordingRtBackend {
    fn default() -> Self {
        Self::new()
    }
}
impl RecordingRtBackend {
    /// 支持硬件光追的后端
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(RecordingState {
                supported: true,
                ..Default::default()
            })),
        }
    }

    /// `is_supported()` 返回 `false` 的后端
    pub fn unsupported() -> Self {
        Self {
            state: Rc::new(RefCell::new(RecordingState::default())),
        }
    }

    /// 后端被移交给 bindings 之后，依然可以通过 probe 观察它
    pub fn probe(&self) -> RecordingProbe {
        RecordingProbe {
            state: self.state.clone(),
        }
    }

    fn record(&self, call: RtBackendCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn can_create(&self) -> bool {
        let state = self.state.borrow();
        state.supported && !state.fail_creations
    }
}
impl RtBackend for RecordingRtBackend {
    fn is_supported(&self) -> bool {
        self.state.borrow().supported
    }

    fn backend_type(&self) -> RtBackendType {
        if self.is_supported() { RtBackendType::Vulkan } else { RtBackendType::None }
    }

    fn create_geometry(&mut self, desc: &RtGeometryDesc<'_>) -> RtGeometryHandle {
        self.record(RtBackendCall::CreateGeometry {
            vertex_count: desc.vertex_count,
            vertex_stride: desc.vertex_stride,
            vertex_offset: desc.vertex_offset,
            index_count: desc.index_count,
        });
        if !self.can_create() || desc.vertex_count == 0 {
            log::warn!("createGeometry: recording backend rejected geometry");
            return RtGeometryHandle::null();
        }

        let positions = (0..desc.vertex_count)
            .filter_map(|vertex| desc.position(vertex))
            .flat_map(|position| position.to_array())
            .collect();
        let key = self.state.borrow_mut().geometries.insert(positions);
        to_native(key).map(RtGeometryHandle::new).unwrap_or_default()
    }

    fn destroy_geometry(&mut self, geometry: RtGeometryHandle) {
        self.record(RtBackendCall::DestroyGeometry(geometry.native()));
        if let Some(key) = to_key(geometry.native()) {
            self.state.borrow_mut().geometries.remove(key);
        }
    }

    fn create_blas(&mut self, geometries: &[RtGeometryHandle]) -> RtBlasHandle {
        self.record(RtBackendCall::CreateBlas {
            geometry_count: geometries.len(),
        });
        if !self.can_create() || geometries.is_empty() {
            log::warn!("createBLAS: recording backend rejected build");
            return RtBlasHandle::null();
        }

        let mut state = self.state.borrow_mut();
        let mut snapshot = Vec::with_capacity(geometries.len());
        for geometry in geometries {
            match to_key(geometry.native()).and_then(|key| state.geometries.get(key)) {
                Some(positions) => snapshot.push(positions.clone()),
                None => {
                    log::warn!("createBLAS: unknown geometry {:?}", geometry.native());
                    return RtBlasHandle::null();
                }
            }
        }
        let key = state.blases.insert(snapshot);
        to_native(key).map(RtBlasHandle::new).unwrap_or_default()
    }

    fn destroy_blas(&mut self, blas: RtBlasHandle) {
        self.record(RtBackendCall::DestroyBlas(blas.native()));
        if let Some(key) = to_key(blas.native()) {
            self.state.borrow_mut().blases.remove(key);
        }
    }

    fn create_tlas(&mut self, instances: &[RtTlasInstance]) -> RtTlasHandle {
        self.record(RtBackendCall::CreateTlas {
            instances: instances.to_vec(),
        });
        if !self.can_create() || instances.is_empty() {
            log::warn!("createTLAS: recording backend rejected build");
            return RtTlasHandle::null();
        }

        let mut state = self.state.borrow_mut();
        let all_live = instances
            .iter()
            .all(|instance| to_key(instance.blas.native()).is_some_and(|key| state.blases.contains_key(key)));
        if !all_live {
            log::warn!("createTLAS: instance references an unknown BLAS");
            return RtTlasHandle::null();
        }
        let key = state.tlases.insert(instances.to_vec());
        to_native(key).map(RtTlasHandle::new).unwrap_or_default()
    }

    fn update_tlas(&mut self, tlas: RtTlasHandle, instances: &[RtTlasInstance]) {
        self.record(RtBackendCall::UpdateTlas {
            tlas: tlas.native(),
            instances: instances.to_vec(),
        });

        let mut state = self.state.borrow_mut();
        match to_key(tlas.native()).and_then(|key| state.tlases.get_mut(key)) {
            Some(built) if built.len() == instances.len() => built.copy_from_slice(instances),
            Some(built) => {
                log::warn!("updateTLAS: expected {} instances, got {}", built.len(), instances.len());
            }
            None => log::warn!("updateTLAS: unknown TLAS"),
        }
    }

    fn destroy_tlas(&mut self, tlas: RtTlasHandle) {
        self.record(RtBackendCall::DestroyTlas(tlas.native()));
        if let Some(key) = to_key(tlas.native()) {
            self.state.borrow_mut().tlases.remove(key);
        }
    }

    fn trace_rays(&mut self, request: &RtTraceRequest<'_>) {
        self.record(RtBackendCall::TraceRays {
            tlas: request.tlas.native(),
            width: request.width,
            height: request.height,
            output_target: request.output_target,
            uniforms_len: request.uniforms.map(<[u8]>::len),
        });
    }
}

/// 观察 [`RecordingRtBackend`] 内部状态的句柄
#[derive(Clone)]
pub struct RecordingProbe {
    state: Rc<RefCell<RecordingState>>,
}
impl RecordingProbe {
    /// 之后所有的创建操作都返回空 handle，用于模拟后端失败
    pub fn set_fail_creations(&self, fail: bool) {
        self.state.borrow_mut().fail_creations = fail;
    }

    pub fn calls(&self) -> Vec<RtBackendCall> {
        self.state.borrow().calls.clone()
    }

    pub fn count_calls(&self, pred: impl Fn(&RtBackendCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|call| pred(call)).count()
    }

    pub fn live_geometry_count(&self) -> usize {
        self.state.borrow().geometries.len()
    }

    pub fn live_blas_count(&self) -> usize {
        self.state.borrow().blases.len()
    }

    pub fn live_tlas_count(&self) -> usize {
        self.state.borrow().tlases.len()
    }

    /// 后端当前持有的 TLAS 实例（update 之后的值）
    pub fn tlas_instances(&self, tlas: RtTlasHandle) -> Option<Vec<RtTlasInstance>> {
        let state = self.state.borrow();
        to_key(tlas.native()).and_then(|key| state.tlases.get(key)).cloned()
    }

    /// BLAS 构建时拷贝的 position 数据
    pub fn blas_positions(&self, blas: RtBlasHandle) -> Option<Vec<Vec<f32>>> {
        let state = self.state.borrow();
        to_key(blas.native()).and_then(|key| state.blases.get(key)).cloned()
    }
}
