use std::fmt;

use crate::buffer::ScriptBuffer;
use crate::object::ScriptObject;

/// 缺失字段的读取结果
pub(crate) static UNDEFINED: ScriptValue = ScriptValue::Undefined;

/// 跨越脚本边界的动态类型值
///
/// 对应宿主脚本引擎中的值，光追绑定层只会读取其中的一小部分形态。
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ScriptValue {
    /// 缺失的值，也是 void 函数的返回值
    #[default]
    Undefined,
    /// 创建失败时返回给脚本的空值
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<ScriptValue>),
    Object(ScriptObject),
    Buffer(ScriptBuffer),
    /// 宿主提供的不透明原生句柄（例如 WebGPU texture），0 表示空
    External(u64),
}
impl ScriptValue {
    /// 用于诊断输出的类型名
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Buffer(buffer) => buffer.kind().name(),
            Self::External(_) => "external",
        }
    }
}
// type check
impl ScriptValue {
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}
// getter
impl ScriptValue {
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// 把数字截断为 u32
    ///
    /// 非数字、NaN、无穷、负数以及超出 u32 范围的值都视为缺失。
    pub fn as_u32(&self) -> Option<u32> {
        let value = self.as_f64()?.trunc();
        if value.is_finite() && (0.0..=u32::MAX as f64).contains(&value) { Some(value as u32) } else { None }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&[ScriptValue]> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&ScriptObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// 非零的外部句柄
    #[inline]
    pub fn as_external(&self) -> Option<u64> {
        match self {
            Self::External(raw) if *raw != 0 => Some(*raw),
            _ => None,
        }
    }

    /// 读取对象字段，非对象或字段缺失时返回 `undefined`
    #[inline]
    pub fn get(&self, key: &str) -> &ScriptValue {
        self.as_object().map_or(&UNDEFINED, |object| object.get(key))
    }
}
impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined | Self::Null => f.write_str(self.type_name()),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Array(values) => write!(f, "[array of {}]", values.len()),
            Self::Object(object) => {
                f.write_str("{")?;
                for (i, (key, value)) in object.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Self::Buffer(buffer) => write!(f, "{buffer:?}"),
            Self::External(raw) => write!(f, "external({raw:#x})"),
        }
    }
}

// From 实现，方便宿主与测试构造值
impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}
impl From<u32> for ScriptValue {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}
impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}
impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
impl From<Vec<ScriptValue>> for ScriptValue {
    fn from(values: Vec<ScriptValue>) -> Self {
        Self::Array(values)
    }
}
impl From<ScriptObject> for ScriptValue {
    fn from(object: ScriptObject) -> Self {
        Self::Object(object)
    }
}
impl From<ScriptBuffer> for ScriptValue {
    fn from(buffer: ScriptBuffer) -> Self {
        Self::Buffer(buffer)
    }
}
impl<T: Into<ScriptValue>> From<Option<T>> for ScriptValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}
