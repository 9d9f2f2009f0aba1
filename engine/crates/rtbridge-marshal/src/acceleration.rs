use glam::Mat4;
use rtbridge_backend::{RtError, RtGeometryHandle, RtResourceKind, RtResult, RtTlasHandle, RtTlasInstance};
use rtbridge_registry::RtResourceRegistry;
use rtbridge_script::ScriptValue;

use crate::handle::handle_id;

/// `updateTLAS(tlas, instances)` 编组后的结果
#[derive(Debug, Clone, PartialEq)]
pub struct RtTlasUpdate {
    pub tlas: RtTlasHandle,
    pub instances: Vec<RtTlasInstance>,
}

fn expect_array<'a>(value: &'a ScriptValue, what: &str) -> RtResult<&'a [ScriptValue]> {
    value
        .as_array()
        .ok_or_else(|| RtError::invalid_input(format!("expected an array of {what}, got {}", value.type_name())))
}

/// 逐个元素编组，任何一个失败都会让整个调用失败，错误中带上元素下标
fn marshal_each<T>(elements: &[ScriptValue], f: impl Fn(&ScriptValue) -> RtResult<T>) -> RtResult<Vec<T>> {
    elements
        .iter()
        .enumerate()
        .map(|(i, element)| f(element).map_err(|err| err.at_index(i)))
        .collect()
}

/// `createBLAS(geometries)` 的编组：非空的 geometry handle 数组
pub fn marshal_geometry_list(registry: &RtResourceRegistry, geometries: &ScriptValue) -> RtResult<Vec<RtGeometryHandle>> {
    let elements = expect_array(geometries, "geometry handles")?;
    if elements.is_empty() {
        return Err(RtError::invalid_input("geometry list is empty"));
    }
    marshal_each(elements, |element| {
        registry.resolve_geometry(handle_id(element, RtResourceKind::Geometry)?)
    })
}

/// 读取 16 个 float 的列主序矩阵
///
/// 接受 `Float32Array` 或者数字数组。不足 16 个元素（或者包含非数字）时整体替换为单位矩阵，
/// 超出的部分被忽略。
fn marshal_transform(value: &ScriptValue) -> Mat4 {
    let floats: Option<Vec<f32>> = match value {
        ScriptValue::Buffer(buffer) => Some(buffer.iter_f32().collect()),
        ScriptValue::Array(values) => values.iter().map(|value| value.as_f64().map(|v| v as f32)).collect(),
        _ => None,
    };
    match floats {
        Some(floats) if floats.len() >= 16 => Mat4::from_cols_slice(&floats[..16]),
        _ => Mat4::IDENTITY,
    }
}

/// 单个 TLAS 实例：`{ blas, transform?, instanceId?, mask?, flags? }`
pub fn marshal_instance(registry: &RtResourceRegistry, value: &ScriptValue) -> RtResult<RtTlasInstance> {
    let Some(object) = value.as_object() else {
        return Err(RtError::invalid_input(format!("expected an instance object, got {}", value.type_name())));
    };

    let blas = match object.get("blas") {
        ScriptValue::Undefined | ScriptValue::Null => return Err(RtError::invalid_input("instance is missing blas")),
        blas => registry.resolve_blas(handle_id(blas, RtResourceKind::Blas)?)?,
    };

    Ok(RtTlasInstance {
        blas,
        transform: marshal_transform(object.get("transform")),
        instance_id: object.get("instanceId").as_u32().unwrap_or(RtTlasInstance::DEFAULT_INSTANCE_ID),
        mask: object.get("mask").as_u32().unwrap_or(RtTlasInstance::DEFAULT_MASK),
        flags: object.get("flags").as_u32().unwrap_or(RtTlasInstance::DEFAULT_FLAGS),
    })
}

/// `createTLAS(instances)` 的编组：非空的实例数组
pub fn marshal_tlas_build(registry: &RtResourceRegistry, instances: &ScriptValue) -> RtResult<Vec<RtTlasInstance>> {
    let elements = expect_array(instances, "instances")?;
    if elements.is_empty() {
        return Err(RtError::invalid_input("instance list is empty"));
    }
    marshal_each(elements, |element| marshal_instance(registry, element))
}

/// `updateTLAS(tlas, instances)` 的编组
///
/// 实例数量必须与构建时一致，不做截断或者补齐。
pub fn marshal_tlas_update(
    registry: &RtResourceRegistry,
    tlas: &ScriptValue,
    instances: &ScriptValue,
) -> RtResult<RtTlasUpdate> {
    let record = registry.resolve_tlas(handle_id(tlas, RtResourceKind::Tlas)?)?;
    let elements = expect_array(instances, "instances")?;
    if elements.len() != record.instance_count {
        return Err(RtError::invalid_input(format!(
            "expected {} instances, got {}",
            record.instance_count,
            elements.len()
        )));
    }
    let instances = marshal_each(elements, |element| marshal_instance(registry, element))?;
    Ok(RtTlasUpdate {
        tlas: record.handle,
        instances,
    })
}
