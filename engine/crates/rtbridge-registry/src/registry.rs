use rtbridge_backend::{RtBackend, RtBlasHandle, RtError, RtGeometryHandle, RtResourceKind, RtResult, RtTlasHandle};

use crate::table::RtResourceTable;

/// TLAS 在注册表中的记录
///
/// 额外记录构建时的实例数量，`updateTLAS` 需要与之保持一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtTlasRecord {
    pub handle: RtTlasHandle,
    pub instance_count: usize,
}

/// 每种资源当前存活的数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtRegistryStats {
    pub geometries: usize,
    pub blases: usize,
    pub tlases: usize,
}
impl RtRegistryStats {
    #[inline]
    pub fn total(&self) -> usize {
        self.geometries + self.blases + self.tlases
    }
}

/// 资源注册表
///
/// 管理脚本可见的整数 id 到后端 native handle 的映射，三种资源各自有独立的 id 分配器。
///
/// - 只有后端创建成功（native handle 非空）的资源才会被注册
/// - 销毁是所有者一方的操作：id 立即从表中移除，再把销毁转发给后端
/// - 注册表不处理资源之间的依赖，销毁 TLAS 不会级联销毁它引用的 BLAS
///
/// 只在脚本线程上使用，内部没有任何锁。
#[derive(Default)]
pub struct RtResourceRegistry {
    geometries: RtResourceTable<RtGeometryHandle>,
    blases: RtResourceTable<RtBlasHandle>,
    tlases: RtResourceTable<RtTlasRecord>,
}
// new & init
impl RtResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}
// register
impl RtResourceRegistry {
    /// 注册 geometry，返回带有 id 的 handle
    ///
    /// 空 handle 或者 id 耗尽时返回错误，此时什么都不会被注册
    pub fn register_geometry(&mut self, handle: RtGeometryHandle) -> RtResult<RtGeometryHandle> {
        Self::ensure_not_null(handle.is_null(), RtResourceKind::Geometry)?;
        let id = self
            .geometries
            .insert_with(|id| handle.with_id(id))
            .ok_or_else(|| Self::exhausted(RtResourceKind::Geometry))?;
        let handle = handle.with_id(id);
        log::debug!("registered geometry {id}");
        Ok(handle)
    }

    pub fn register_blas(&mut self, handle: RtBlasHandle) -> RtResult<RtBlasHandle> {
        Self::ensure_not_null(handle.is_null(), RtResourceKind::Blas)?;
        let id = self
            .blases
            .insert_with(|id| handle.with_id(id))
            .ok_or_else(|| Self::exhausted(RtResourceKind::Blas))?;
        let handle = handle.with_id(id);
        log::debug!("registered blas {id}");
        Ok(handle)
    }

    pub fn register_tlas(&mut self, handle: RtTlasHandle, instance_count: usize) -> RtResult<RtTlasHandle> {
        Self::ensure_not_null(handle.is_null(), RtResourceKind::Tlas)?;
        let id = self
            .tlases
            .insert_with(|id| RtTlasRecord {
                handle: handle.with_id(id),
                instance_count,
            })
            .ok_or_else(|| Self::exhausted(RtResourceKind::Tlas))?;
        let handle = handle.with_id(id);
        log::debug!("registered tlas {id} ({instance_count} instances)");
        Ok(handle)
    }

    #[inline]
    fn ensure_not_null(is_null: bool, kind: RtResourceKind) -> RtResult<()> {
        if is_null { Err(RtError::BackendFailure(kind)) } else { Ok(()) }
    }

    #[inline]
    fn exhausted(kind: RtResourceKind) -> RtError {
        RtError::invalid_input(format!("{kind} id space exhausted"))
    }
}
// resolve
impl RtResourceRegistry {
    pub fn resolve_geometry(&self, id: u32) -> RtResult<RtGeometryHandle> {
        self.geometries.get(id).copied().ok_or(RtError::unresolved(RtResourceKind::Geometry, id))
    }

    pub fn resolve_blas(&self, id: u32) -> RtResult<RtBlasHandle> {
        self.blases.get(id).copied().ok_or(RtError::unresolved(RtResourceKind::Blas, id))
    }

    pub fn resolve_tlas(&self, id: u32) -> RtResult<RtTlasRecord> {
        self.tlases.get(id).copied().ok_or(RtError::unresolved(RtResourceKind::Tlas, id))
    }

    #[inline]
    pub fn contains(&self, kind: RtResourceKind, id: u32) -> bool {
        match kind {
            RtResourceKind::Geometry => self.geometries.contains(id),
            RtResourceKind::Blas => self.blases.contains(id),
            RtResourceKind::Tlas => self.tlases.contains(id),
        }
    }
}
// release
impl RtResourceRegistry {
    /// 移除 id 并把销毁转发给后端
    ///
    /// 未知 id 是 no-op，返回是否真的移除了一个资源。
    pub fn release(&mut self, kind: RtResourceKind, id: u32, backend: &mut dyn RtBackend) -> bool {
        let released = match kind {
            RtResourceKind::Geometry => self.geometries.remove(id).map(|handle| backend.destroy_geometry(handle)),
            RtResourceKind::Blas => self.blases.remove(id).map(|handle| backend.destroy_blas(handle)),
            RtResourceKind::Tlas => self.tlases.remove(id).map(|record| backend.destroy_tlas(record.handle)),
        };
        if released.is_some() {
            log::debug!("released {kind} {id}");
        }
        released.is_some()
    }

    /// 释放所有资源并重置 id 分配器，只在关闭时调用一次
    ///
    /// 先释放 TLAS，再释放 BLAS，最后释放 geometry。
    pub fn release_all(&mut self, backend: &mut dyn RtBackend) -> RtRegistryStats {
        let stats = self.stats();

        for (_, record) in self.tlases.drain() {
            backend.destroy_tlas(record.handle);
        }
        for (_, handle) in self.blases.drain() {
            backend.destroy_blas(handle);
        }
        for (_, handle) in self.geometries.drain() {
            backend.destroy_geometry(handle);
        }

        if stats.total() > 0 {
            log::info!(
                "released {} geometries, {} blases, {} tlases",
                stats.geometries,
                stats.blases,
                stats.tlases
            );
        }
        stats
    }
}
// getter
impl RtResourceRegistry {
    pub fn stats(&self) -> RtRegistryStats {
        RtRegistryStats {
            geometries: self.geometries.len(),
            blases: self.blases.len(),
            tlases: self.tlases.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stats().total() == 0
    }
}
