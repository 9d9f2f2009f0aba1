//! 脚本引擎与原生代码之间传递的值
//!
//! 宿主脚本引擎只需要能把自己的值转换成 [`ScriptValue`]，
//! 就可以调用光追绑定层的所有入口。

pub mod buffer;
pub mod object;
pub mod value;

pub use buffer::{ScriptBuffer, ScriptBufferKind};
pub use object::ScriptObject;
pub use value::ScriptValue;
