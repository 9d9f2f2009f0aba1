use rtbridge_backend::{RtError, RtResult};
use rtbridge_script::{ScriptBuffer, ScriptValue};

/// 从 option 对象的字段中取出 typed buffer
///
/// 字段缺失、不是 buffer 或者长度为 0 都会失败。
pub fn extract_buffer<'a>(value: &'a ScriptValue, field: &str) -> RtResult<&'a ScriptBuffer> {
    let buffer = match value {
        ScriptValue::Buffer(buffer) => buffer,
        ScriptValue::Undefined | ScriptValue::Null => {
            return Err(RtError::invalid_input(format!("missing {field}")));
        }
        other => {
            return Err(RtError::invalid_input(format!("{field} must be a typed array, got {}", other.type_name())));
        }
    };
    if buffer.is_empty() {
        return Err(RtError::invalid_input(format!("{field} is empty")));
    }
    Ok(buffer)
}

/// 按 4 字节元素计数，多余的尾部字节被忽略
#[inline]
pub(crate) fn count_u32_elements(buffer: &ScriptBuffer) -> usize {
    buffer.byte_len() / size_of::<u32>()
}
