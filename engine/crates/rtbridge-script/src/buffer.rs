use std::fmt;

/// typed buffer 的元素类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptBufferKind {
    /// `Float32Array`
    Float32,
    /// `Uint32Array`
    Uint32,
    /// `ArrayBuffer` / `Uint8Array`
    Bytes,
}
impl ScriptBufferKind {
    /// 单个元素的字节数
    #[inline]
    pub const fn element_size(self) -> usize {
        match self {
            Self::Float32 => size_of::<f32>(),
            Self::Uint32 => size_of::<u32>(),
            Self::Bytes => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Float32 => "Float32Array",
            Self::Uint32 => "Uint32Array",
            Self::Bytes => "ArrayBuffer",
        }
    }
}
impl fmt::Display for ScriptBufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 脚本侧的 typed buffer
///
/// 内部只保存原始字节，不保证对齐，读取元素时使用 `pod_read_unaligned`。
#[derive(Clone, PartialEq)]
pub struct ScriptBuffer {
    kind: ScriptBufferKind,
    bytes: Vec<u8>,
}
// new & init
impl ScriptBuffer {
    pub fn from_f32(data: &[f32]) -> Self {
        Self {
            kind: ScriptBufferKind::Float32,
            bytes: bytemuck::cast_slice::<_, u8>(data).to_vec(),
        }
    }

    pub fn from_u32(data: &[u32]) -> Self {
        Self {
            kind: ScriptBufferKind::Uint32,
            bytes: bytemuck::cast_slice::<_, u8>(data).to_vec(),
        }
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: ScriptBufferKind::Bytes,
            bytes: data.into(),
        }
    }

    /// 以任意类型解释一段字节，长度不必是元素大小的整数倍
    pub fn from_raw(kind: ScriptBufferKind, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
        }
    }
}
// getter
impl ScriptBuffer {
    #[inline]
    pub fn kind(&self) -> ScriptBufferKind {
        self.kind
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// 完整元素的数量，多余的尾部字节被忽略
    #[inline]
    pub fn element_count(&self) -> usize {
        self.bytes.len() / self.kind.element_size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 把内容按 f32 读取，不考虑 buffer 自身的类型
    pub fn iter_f32(&self) -> impl Iterator<Item = f32> + '_ {
        self.bytes.chunks_exact(size_of::<f32>()).map(bytemuck::pod_read_unaligned::<f32>)
    }

    pub fn iter_u32(&self) -> impl Iterator<Item = u32> + '_ {
        self.bytes.chunks_exact(size_of::<u32>()).map(bytemuck::pod_read_unaligned::<u32>)
    }
}
impl fmt::Debug for ScriptBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({} bytes)", self.kind, self.bytes.len())
    }
}
