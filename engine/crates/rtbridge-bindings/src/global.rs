//! 进程内唯一的绑定实例
//!
//! 宿主脚本引擎通常只暴露自由函数，因此把 [`RtBindings`] 放在脚本线程的线程局部存储中。
//! 不同线程各自拥有独立的实例，但按照约定只有一个脚本线程会调用这里的函数。

use std::cell::RefCell;

use rtbridge_registry::RtRegistryStats;
use rtbridge_script::ScriptValue;

use crate::bindings::RtBindings;
use crate::config::RtConfig;

thread_local! {
    static G_RT_BINDINGS: RefCell<RtBindings> = RefCell::new(RtBindings::new());
}

/// 选择后端并初始化全局实例，重复调用会先 cleanup
pub fn initialize(config: &RtConfig) {
    with_bindings(|bindings| bindings.initialize(config));
}

/// 释放所有资源并丢弃后端
pub fn cleanup() -> RtRegistryStats {
    with_bindings(RtBindings::cleanup)
}

/// 按脚本名调用全局实例上的入口
pub fn call(name: &str, args: &[ScriptValue]) -> Option<ScriptValue> {
    with_bindings(|bindings| bindings.call(name, args))
}

/// 访问全局实例
///
/// # Panics
/// 在 `f` 内部再次调用本模块的函数会因为重复借用而 panic
pub fn with_bindings<R>(f: impl FnOnce(&mut RtBindings) -> R) -> R {
    G_RT_BINDINGS.with(|bindings| f(&mut bindings.borrow_mut()))
}
