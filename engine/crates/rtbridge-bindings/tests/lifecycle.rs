mod common;

use common::*;
use glam::Mat4;
use rtbridge_backend::RtTlasInstance;
use rtbridge_backend::recording::RtBackendCall;
use rtbridge_registry::RtRegistryStats;
use rtbridge_script::{ScriptObject, ScriptValue};

fn last_created_instances(calls: &[RtBackendCall]) -> Vec<RtTlasInstance> {
    calls
        .iter()
        .rev()
        .find_map(|call| match call {
            RtBackendCall::CreateTlas { instances } => Some(instances.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

#[test]
fn test_geometry_blas_tlas_scenario() {
    let (mut bindings, probe) = recording_bindings();
    assert!(bindings.is_supported());
    assert_eq!(bindings.get_backend(), "vulkan");

    let geometry = bindings.create_geometry(&indexed_triangle());
    assert_eq!(geometry, handle("geometry", 1));

    let blas = bindings.create_blas(&array([handle("geometry", 1)]));
    assert_eq!(blas, handle("blas", 1));

    // geometry 被销毁后 BLAS 不受影响
    bindings.destroy_geometry(&handle("geometry", 1));
    assert_eq!(
        bindings.stats(),
        RtRegistryStats {
            geometries: 0,
            blases: 1,
            tlases: 0
        }
    );
    assert_eq!(probe.live_geometry_count(), 0);
    assert_eq!(probe.live_blas_count(), 1);

    let tlas = bindings.create_tlas(&array([instance(1).with("instanceId", 7u32).into()]));
    assert_eq!(tlas, handle("tlas", 1));
    let built = last_created_instances(&probe.calls());
    assert_eq!(built.len(), 1);
    assert_eq!(built[0].instance_id, 7);
    assert_eq!(built[0].transform, Mat4::IDENTITY);
    assert_eq!(built[0].mask, 0xFF);
    assert_eq!(built[0].flags, 0);

    // 实例数量与构建时不一致，update 被拒绝
    assert_eq!(bindings.update_tlas(&tlas, &array([])), ScriptValue::Undefined);
    assert_eq!(probe.count_calls(|call| matches!(call, RtBackendCall::UpdateTlas { .. })), 0);

    let stats = bindings.cleanup();
    assert_eq!(
        stats,
        RtRegistryStats {
            geometries: 0,
            blases: 1,
            tlases: 1
        }
    );
    assert_eq!(probe.live_blas_count(), 0);
    assert_eq!(probe.live_tlas_count(), 0);
}

#[test]
fn test_update_tlas_in_place() {
    let (mut bindings, probe) = recording_bindings();
    build_blas(&mut bindings);
    let tlas = bindings.create_tlas(&array([instance(1).into(), instance(1).into()]));
    assert_eq!(id_of(&tlas), Some(1));

    let moved = Mat4::from_translation(glam::vec3(0.0, 2.0, 0.0));
    let transform = moved.to_cols_array().iter().map(|v| ScriptValue::Number(*v as f64)).collect::<Vec<_>>();
    let instances = array([
        instance(1).with("transform", transform).into(),
        instance(1).with("mask", 0x01u32).into(),
    ]);
    assert_eq!(bindings.update_tlas(&tlas, &instances), ScriptValue::Undefined);

    let updated = probe
        .calls()
        .into_iter()
        .find_map(|call| match call {
            RtBackendCall::UpdateTlas { tlas: Some(native), .. } => {
                probe.tlas_instances(rtbridge_backend::RtTlasHandle::new(native))
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(updated.len(), 2);
    assert_eq!(updated[0].transform, moved);
    assert_eq!(updated[1].mask, 0x01);
    assert_eq!(updated[1].transform, Mat4::IDENTITY);
}

#[test]
fn test_update_tlas_rejects_destroyed_blas() {
    let (mut bindings, recorder) = recording_bindings();
    build_blas(&mut bindings);
    let tlas = bindings.create_tlas(&array([instance(1).into()]));
    assert_eq!(id_of(&tlas), Some(1));

    bindings.destroy_blas(&handle("blas", 1));
    assert_eq!(recorder.live_blas_count(), 0);

    // 实例数量一致，但引用的 BLAS 已经不存在
    assert_eq!(bindings.update_tlas(&tlas, &array([instance(1).into()])), ScriptValue::Undefined);
    assert_eq!(recorder.count_calls(|call| matches!(call, RtBackendCall::UpdateTlas { .. })), 0);
    assert_eq!(recorder.live_tlas_count(), 1);
}

#[test]
fn test_trace_rays_forwards_request() {
    let (mut bindings, probe) = recording_bindings();
    build_blas(&mut bindings);
    let tlas = bindings.create_tlas(&array([instance(1).into()]));

    let options = ScriptObject::new()
        .with("tlas", tlas.clone())
        .with("width", 320u32)
        .with("height", 240u32)
        .with("outputTexture", ScriptValue::External(0xAB))
        .with("uniforms", rtbridge_script::ScriptBuffer::from_bytes(vec![0u8; 16]));
    assert_eq!(bindings.trace_rays(&ScriptValue::from(options)), ScriptValue::Undefined);

    let traced = probe
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            RtBackendCall::TraceRays {
                width,
                height,
                output_target,
                uniforms_len,
                ..
            } => Some((width, height, output_target.raw(), uniforms_len)),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(traced, vec![(320, 240, 0xAB, Some(16))]);

    // 销毁之后再 trace 不会到达后端
    bindings.destroy_tlas(&tlas);
    let options = ScriptObject::new()
        .with("tlas", tlas)
        .with("width", 320u32)
        .with("height", 240u32)
        .with("outputTexture", ScriptValue::External(0xAB));
    bindings.trace_rays(&ScriptValue::from(options));
    assert_eq!(probe.count_calls(|call| matches!(call, RtBackendCall::TraceRays { .. })), 1);
}

#[test]
fn test_cleanup_releases_tlas_before_blas_before_geometry() {
    let (mut bindings, probe) = recording_bindings();
    build_blas(&mut bindings);
    bindings.create_tlas(&array([instance(1).into()]));

    bindings.cleanup();
    let destroys = probe
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            RtBackendCall::DestroyTlas(_) => Some("tlas"),
            RtBackendCall::DestroyBlas(_) => Some("blas"),
            RtBackendCall::DestroyGeometry(_) => Some("geometry"),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(destroys, vec!["tlas", "blas", "geometry"]);
    assert!(!bindings.is_supported());
    assert_eq!(bindings.get_backend(), "none");
}

#[test]
fn test_reinitialize_starts_from_clean_slate() {
    let (mut bindings, _) = recording_bindings();
    bindings.create_geometry(&triangle());
    bindings.create_geometry(&triangle());
    bindings.cleanup();

    let (fresh, probe) = {
        let backend = rtbridge_backend::recording::RecordingRtBackend::new();
        let probe = backend.probe();
        (backend, probe)
    };
    bindings.initialize_with(Box::new(fresh));
    assert_eq!(id_of(&bindings.create_geometry(&triangle())), Some(1));
    assert_eq!(probe.live_geometry_count(), 1);
}

#[test]
fn test_drop_releases_everything() {
    let (mut bindings, probe) = recording_bindings();
    build_blas(&mut bindings);
    drop(bindings);
    assert_eq!(probe.live_geometry_count(), 0);
    assert_eq!(probe.live_blas_count(), 0);
}
