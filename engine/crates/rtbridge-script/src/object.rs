use indexmap::IndexMap;

use crate::value::{ScriptValue, UNDEFINED};

/// 脚本对象：字段名到值的有序映射
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptObject {
    fields: IndexMap<String, ScriptValue>,
}
// new & init
impl ScriptObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// builder 风格地设置字段
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ScriptValue>) -> Self {
        self.set(key, value);
        self
    }
}
// getter & setter
impl ScriptObject {
    /// 读取字段，不存在时返回 `undefined`
    #[inline]
    pub fn get(&self, key: &str) -> &ScriptValue {
        self.fields.get(key).unwrap_or(&UNDEFINED)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ScriptValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<ScriptValue> {
        self.fields.shift_remove(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScriptValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }
}
impl<K: Into<String>, V: Into<ScriptValue>> FromIterator<(K, V)> for ScriptObject {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
        }
    }
}
