use rtbridge_backend::{RtError, RtResourceKind, RtResult};
use rtbridge_script::{ScriptObject, ScriptValue};

/// 创建成功后返回给脚本的 wrapper：`{ type, id }`
pub fn handle_object(kind: RtResourceKind, id: u32) -> ScriptValue {
    ScriptObject::new().with("type", kind.tag()).with("id", id).into()
}

/// 从 wrapper 对象中读取 id，不查询注册表
///
/// - 不是对象：`InvalidInput`
/// - `type` 存在但与 `kind` 不一致：`UnresolvedReference`
/// - `id` 缺失或者不是合法的 u32：按 0 处理，0 永远不会被分配
pub fn handle_id(value: &ScriptValue, kind: RtResourceKind) -> RtResult<u32> {
    let Some(object) = value.as_object() else {
        return Err(RtError::invalid_input(format!("expected a {kind} handle, got {}", value.type_name())));
    };

    let id = object.get("id").as_u32().unwrap_or(0);
    match object.get("type") {
        ScriptValue::Undefined => Ok(id),
        tag if tag.as_str() == Some(kind.tag()) => Ok(id),
        _ => Err(RtError::unresolved(kind, id)),
    }
}
