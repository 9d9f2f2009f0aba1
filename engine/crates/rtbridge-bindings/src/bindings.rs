use rtbridge_backend::{RtBackend, RtError, RtResourceKind, RtResult, create_rt_backend};
use rtbridge_marshal::{
    handle_id, handle_object, marshal_geometry_desc, marshal_geometry_list, marshal_tlas_build, marshal_tlas_update,
    marshal_trace_request,
};
use rtbridge_registry::{RtRegistryStats, RtResourceRegistry};
use rtbridge_script::ScriptValue;

use crate::config::RtConfig;

/// 初始化之后才存在的状态：一个后端 + 三张资源表
struct RtRuntime {
    backend: Box<dyn RtBackend>,
    registry: RtResourceRegistry,
}
impl RtRuntime {
    /// 后端支持硬件光追时才允许创建资源
    fn ensure_supported(&mut self) -> RtResult<&mut Self> {
        if self.backend.is_supported() { Ok(self) } else { Err(RtError::Unsupported) }
    }
}

/// 暴露给脚本环境的光追入口
///
/// 所有入口都不会 panic，也不会把错误抛给脚本：
/// 创建类入口失败时返回 `null`，其余入口返回 `undefined`。
///
/// # 生命周期
/// ```ignore
/// let mut bindings = RtBindings::new();
/// bindings.initialize(&RtConfig::default());
/// let geometry = bindings.create_geometry(&options);
/// // ...
/// bindings.cleanup();
/// ```
///
/// 只能在单个脚本线程上使用。
#[derive(Default)]
pub struct RtBindings {
    runtime: Option<RtRuntime>,
}
// new & init
impl RtBindings {
    /// 注册到脚本全局对象上的名字
    pub const GLOBAL_NAME: &'static str = "rtBridge";

    /// 所有入口的脚本名，供宿主逐个注册
    pub const ENTRY_POINTS: [&'static str; 11] = [
        "isSupported",
        "getBackend",
        "createGeometry",
        "createBLAS",
        "createTLAS",
        "updateTLAS",
        "traceRays",
        "destroyGeometry",
        "destroyBLAS",
        "destroyTLAS",
        "cleanup",
    ];

    /// 未初始化的绑定：`isSupported()` 为 `false`，所有创建都失败
    pub fn new() -> Self {
        Self::default()
    }

    /// 按配置选择后端并初始化
    pub fn initialize(&mut self, config: &RtConfig) {
        self.initialize_with(create_rt_backend(config.backend));
    }

    /// 使用给定的后端初始化，已经初始化过时先执行 [`cleanup`](Self::cleanup)
    pub fn initialize_with(&mut self, backend: Box<dyn RtBackend>) {
        if self.runtime.is_some() {
            log::info!("{} is already initialized, cleaning up first", Self::GLOBAL_NAME);
            self.cleanup();
        }

        log::info!(
            "{} initialized (backend: {}, hardware ray tracing: {})",
            Self::GLOBAL_NAME,
            backend.backend_name(),
            backend.is_supported()
        );
        self.runtime = Some(RtRuntime {
            backend,
            registry: RtResourceRegistry::new(),
        });
    }

    /// 释放所有存活的资源（TLAS -> BLAS -> Geometry），然后丢弃后端
    ///
    /// 之后再次 initialize 时 id 从 1 重新开始。未初始化时是 no-op。
    pub fn cleanup(&mut self) -> RtRegistryStats {
        let Some(mut runtime) = self.runtime.take() else {
            return RtRegistryStats::default();
        };
        let stats = runtime.registry.release_all(runtime.backend.as_mut());
        log::info!("{} cleaned up ({} resources released)", Self::GLOBAL_NAME, stats.total());
        stats
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.runtime.is_some()
    }

    /// 每种资源当前存活的数量
    pub fn stats(&self) -> RtRegistryStats {
        self.runtime.as_ref().map(|runtime| runtime.registry.stats()).unwrap_or_default()
    }

    fn supported_runtime(&mut self) -> RtResult<&mut RtRuntime> {
        self.runtime.as_mut().ok_or(RtError::Unsupported)?.ensure_supported()
    }
}
impl Drop for RtBindings {
    fn drop(&mut self) {
        if self.runtime.is_some() {
            self.cleanup();
        }
    }
}
// query
impl RtBindings {
    /// `isSupported()`
    pub fn is_supported(&self) -> bool {
        self.runtime.as_ref().is_some_and(|runtime| runtime.backend.is_supported())
    }

    /// `getBackend()`：`"dxr"`、`"vulkan"`、`"metal"` 或者 `"none"`
    pub fn get_backend(&self) -> &'static str {
        self.runtime.as_ref().map_or("none", |runtime| runtime.backend.backend_name())
    }
}
// create
impl RtBindings {
    /// `createGeometry(options)`，失败时返回 `null`
    pub fn create_geometry(&mut self, options: &ScriptValue) -> ScriptValue {
        absent_on_error("createGeometry", ScriptValue::Null, self.try_create_geometry(options))
    }

    fn try_create_geometry(&mut self, options: &ScriptValue) -> RtResult<ScriptValue> {
        let runtime = self.supported_runtime()?;
        let desc = marshal_geometry_desc(options)?;

        let handle = runtime.backend.create_geometry(&desc);
        let handle = runtime.registry.register_geometry(handle).inspect_err(|_| {
            if !handle.is_null() {
                runtime.backend.destroy_geometry(handle);
            }
        })?;
        Ok(handle_object(RtResourceKind::Geometry, handle.id()))
    }

    /// `createBLAS(geometries)`，失败时返回 `null`
    pub fn create_blas(&mut self, geometries: &ScriptValue) -> ScriptValue {
        absent_on_error("createBLAS", ScriptValue::Null, self.try_create_blas(geometries))
    }

    fn try_create_blas(&mut self, geometries: &ScriptValue) -> RtResult<ScriptValue> {
        let runtime = self.supported_runtime()?;
        let geometries = marshal_geometry_list(&runtime.registry, geometries)?;

        let handle = runtime.backend.create_blas(&geometries);
        let handle = runtime.registry.register_blas(handle).inspect_err(|_| {
            if !handle.is_null() {
                runtime.backend.destroy_blas(handle);
            }
        })?;
        Ok(handle_object(RtResourceKind::Blas, handle.id()))
    }

    /// `createTLAS(instances)`，失败时返回 `null`
    pub fn create_tlas(&mut self, instances: &ScriptValue) -> ScriptValue {
        absent_on_error("createTLAS", ScriptValue::Null, self.try_create_tlas(instances))
    }

    fn try_create_tlas(&mut self, instances: &ScriptValue) -> RtResult<ScriptValue> {
        let runtime = self.supported_runtime()?;
        let instances = marshal_tlas_build(&runtime.registry, instances)?;

        let handle = runtime.backend.create_tlas(&instances);
        let handle = runtime.registry.register_tlas(handle, instances.len()).inspect_err(|_| {
            if !handle.is_null() {
                runtime.backend.destroy_tlas(handle);
            }
        })?;
        Ok(handle_object(RtResourceKind::Tlas, handle.id()))
    }
}
// update & trace
impl RtBindings {
    /// `updateTLAS(tlas, instances)`，实例数量必须与构建时一致
    pub fn update_tlas(&mut self, tlas: &ScriptValue, instances: &ScriptValue) -> ScriptValue {
        absent_on_error("updateTLAS", ScriptValue::Undefined, self.try_update_tlas(tlas, instances))
    }

    fn try_update_tlas(&mut self, tlas: &ScriptValue, instances: &ScriptValue) -> RtResult<ScriptValue> {
        let runtime = self.supported_runtime()?;
        let update = marshal_tlas_update(&runtime.registry, tlas, instances)?;
        runtime.backend.update_tlas(update.tlas, &update.instances);
        Ok(ScriptValue::Undefined)
    }

    /// `traceRays(options)`
    pub fn trace_rays(&mut self, options: &ScriptValue) -> ScriptValue {
        absent_on_error("traceRays", ScriptValue::Undefined, self.try_trace_rays(options))
    }

    fn try_trace_rays(&mut self, options: &ScriptValue) -> RtResult<ScriptValue> {
        let runtime = self.supported_runtime()?;
        let request = marshal_trace_request(&runtime.registry, options)?;
        runtime.backend.trace_rays(&request);
        Ok(ScriptValue::Undefined)
    }
}
// destroy
impl RtBindings {
    pub fn destroy_geometry(&mut self, handle: &ScriptValue) -> ScriptValue {
        self.destroy(RtResourceKind::Geometry, handle)
    }

    pub fn destroy_blas(&mut self, handle: &ScriptValue) -> ScriptValue {
        self.destroy(RtResourceKind::Blas, handle)
    }

    pub fn destroy_tlas(&mut self, handle: &ScriptValue) -> ScriptValue {
        self.destroy(RtResourceKind::Tlas, handle)
    }

    /// 销毁永远不报告错误：未知、重复、类型不匹配的 handle 都是 no-op
    fn destroy(&mut self, kind: RtResourceKind, handle: &ScriptValue) -> ScriptValue {
        let Some(runtime) = self.runtime.as_mut() else {
            return ScriptValue::Undefined;
        };
        match handle_id(handle, kind) {
            Ok(id) => {
                if !runtime.registry.release(kind, id, runtime.backend.as_mut()) {
                    log::debug!("destroy {kind} {id}: not registered");
                }
            }
            Err(err) => log::debug!("destroy {kind}: {err}"),
        }
        ScriptValue::Undefined
    }
}
// dispatch
impl RtBindings {
    /// 按脚本名调用入口，缺少的参数视为 `undefined`
    ///
    /// 未知的入口名返回 `None`。
    pub fn call(&mut self, name: &str, args: &[ScriptValue]) -> Option<ScriptValue> {
        let result = match name {
            "isSupported" => ScriptValue::Boolean(self.is_supported()),
            "getBackend" => ScriptValue::from(self.get_backend()),
            "createGeometry" => self.create_geometry(arg(args, 0)),
            "createBLAS" => self.create_blas(arg(args, 0)),
            "createTLAS" => self.create_tlas(arg(args, 0)),
            "updateTLAS" => self.update_tlas(arg(args, 0), arg(args, 1)),
            "traceRays" => self.trace_rays(arg(args, 0)),
            "destroyGeometry" => self.destroy_geometry(arg(args, 0)),
            "destroyBLAS" => self.destroy_blas(arg(args, 0)),
            "destroyTLAS" => self.destroy_tlas(arg(args, 0)),
            "cleanup" => {
                self.cleanup();
                ScriptValue::Undefined
            }
            _ => {
                log::warn!("{}: unknown entry point {name:?}", Self::GLOBAL_NAME);
                return None;
            }
        };
        Some(result)
    }
}

fn arg(args: &[ScriptValue], index: usize) -> &ScriptValue {
    static UNDEFINED: ScriptValue = ScriptValue::Undefined;
    args.get(index).unwrap_or(&UNDEFINED)
}

/// 边界处统一的失败处理：一行诊断 + 空值
fn absent_on_error(op: &str, absent: ScriptValue, result: RtResult<ScriptValue>) -> ScriptValue {
    result.unwrap_or_else(|err| {
        log::warn!("{op}: {err}");
        absent
    })
}
