#![allow(dead_code)]

use rtbridge_backend::recording::{RecordingProbe, RecordingRtBackend};
use rtbridge_bindings::RtBindings;
use rtbridge_script::{ScriptBuffer, ScriptObject, ScriptValue};

pub const TRIANGLE: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

/// 使用 recording 后端初始化的绑定，以及观察后端的 probe
pub fn recording_bindings() -> (RtBindings, RecordingProbe) {
    let backend = RecordingRtBackend::new();
    let probe = backend.probe();
    let mut bindings = RtBindings::new();
    bindings.initialize_with(Box::new(backend));
    (bindings, probe)
}

pub fn handle(tag: &str, id: u32) -> ScriptValue {
    ScriptObject::new().with("type", tag).with("id", id).into()
}

pub fn triangle() -> ScriptValue {
    ScriptObject::new().with("vertices", ScriptBuffer::from_f32(&TRIANGLE)).into()
}

pub fn indexed_triangle() -> ScriptValue {
    ScriptObject::new()
        .with("vertices", ScriptBuffer::from_f32(&TRIANGLE))
        .with("indices", ScriptBuffer::from_u32(&[0, 1, 2]))
        .into()
}

pub fn instance(blas_id: u32) -> ScriptObject {
    ScriptObject::new().with("blas", handle("blas", blas_id))
}

pub fn array<const N: usize>(values: [ScriptValue; N]) -> ScriptValue {
    ScriptValue::Array(values.into())
}

pub fn id_of(value: &ScriptValue) -> Option<u32> {
    value.get("id").as_u32()
}

/// geometry 1 -> blas 1，返回 blas handle
pub fn build_blas(bindings: &mut RtBindings) -> ScriptValue {
    let geometry = bindings.create_geometry(&triangle());
    bindings.create_blas(&array([geometry]))
}
