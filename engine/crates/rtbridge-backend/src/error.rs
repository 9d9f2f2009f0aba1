use crate::types::RtResourceKind;

/// 边界上所有失败的分类
///
/// 四种错误在边界处的处理方式完全相同：输出一行诊断，返回空值，不做任何部分修改。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RtError {
    /// 没有后端，或者后端不支持硬件光追
    #[error("hardware ray tracing not available")]
    Unsupported,

    /// 缺少必须的字段、数组为空、buffer 提取失败等
    #[error("{0}")]
    InvalidInput(String),

    /// handle 对应的 id 不在注册表中（已销毁、伪造或者类型不匹配）
    #[error(
        "invalid {kind} reference (id {id}){}",
        .index.map(|index| format!(" at index {index}")).unwrap_or_default()
    )]
    UnresolvedReference {
        kind: RtResourceKind,
        id: u32,
        /// 引用位于数组中时，记录其下标
        index: Option<usize>,
    },

    /// 输入合法，但后端返回了空的 native handle
    #[error("backend failed to create {0}")]
    BackendFailure(RtResourceKind),
}

impl RtError {
    #[inline]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    #[inline]
    pub fn unresolved(kind: RtResourceKind, id: u32) -> Self {
        Self::UnresolvedReference { kind, id, index: None }
    }

    /// 给数组中某个元素的引用错误补上下标
    pub fn at_index(self, at: usize) -> Self {
        match self {
            Self::UnresolvedReference { kind, id, .. } => Self::UnresolvedReference {
                kind,
                id,
                index: Some(at),
            },
            Self::InvalidInput(msg) => Self::InvalidInput(format!("{msg} at index {at}")),
            other => other,
        }
    }
}

pub type RtResult<T> = Result<T, RtError>;
