use rtbridge_backend::{RtError, RtNativeHandle, RtResourceKind, RtResult, RtTraceRequest};
use rtbridge_registry::RtResourceRegistry;
use rtbridge_script::ScriptValue;

use crate::handle::handle_id;

fn positive_u32(value: &ScriptValue, field: &str) -> RtResult<u32> {
    match value.as_u32() {
        Some(0) | None => Err(RtError::invalid_input(format!("{field} must be a positive integer, got {value}"))),
        Some(value) => Ok(value),
    }
}

/// `traceRays(options)` 的编组
///
/// ```text
/// { tlas, width: number, height: number, outputTexture: external, uniforms?: ArrayBuffer }
/// ```
///
/// 返回的请求借用 `options` 中的 uniform 数据。
pub fn marshal_trace_request<'a>(
    registry: &RtResourceRegistry,
    options: &'a ScriptValue,
) -> RtResult<RtTraceRequest<'a>> {
    let Some(object) = options.as_object() else {
        return Err(RtError::invalid_input(format!(
            "expected an options object, got {}",
            options.type_name()
        )));
    };

    let tlas = registry.resolve_tlas(handle_id(object.get("tlas"), RtResourceKind::Tlas)?)?.handle;
    let width = positive_u32(object.get("width"), "width")?;
    let height = positive_u32(object.get("height"), "height")?;
    let output_target = object
        .get("outputTexture")
        .as_external()
        .and_then(RtNativeHandle::from_raw)
        .ok_or_else(|| RtError::invalid_input("missing outputTexture"))?;

    let uniforms = match object.get("uniforms") {
        ScriptValue::Undefined | ScriptValue::Null => None,
        ScriptValue::Buffer(buffer) if buffer.is_empty() => None,
        ScriptValue::Buffer(buffer) => Some(buffer.bytes()),
        other => {
            return Err(RtError::invalid_input(format!(
                "uniforms must be a buffer, got {}",
                other.type_name()
            )));
        }
    };

    Ok(RtTraceRequest {
        tlas,
        width,
        height,
        output_target,
        uniforms,
    })
}
