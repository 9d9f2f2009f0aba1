use indexmap::IndexMap;
use slotmap::{SlotMap, new_key_type};

new_key_type! { pub struct RtSlotKey; }

struct RtTableEntry<T> {
    id: u32,
    value: T,
}

/// 单种资源的 id 表
///
/// 资源存放在 SlotMap 中（紧凑数组 + version），对外的 id 则由单调递增的计数器产生，
/// `keys` 只记录存活资源的 id 到 slot key 的映射，移除时同步删除。
/// 已销毁的 id 查不到任何 key，因此 use-after-destroy 只会得到 `None`，
/// 而不会访问到复用 slot 的新资源。
///
/// id 从 1 开始，在 [`drain`](Self::drain) 之前永远不会被复用。0 被保留为无效 id。
pub struct RtResourceTable<T> {
    slots: SlotMap<RtSlotKey, RtTableEntry<T>>,
    keys: IndexMap<u32, RtSlotKey>,
    next_id: u32,
}
impl<T> Default for RtResourceTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
// new & init
impl<T> RtResourceTable<T> {
    pub const FIRST_ID: u32 = 1;

    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            keys: IndexMap::new(),
            next_id: Self::FIRST_ID,
        }
    }
}
// insert & remove
impl<T> RtResourceTable<T> {
    /// 分配下一个 id，用它构造资源并存入
    ///
    /// id 空间耗尽时返回 `None`，此时 `f` 不会被调用
    pub fn insert_with(&mut self, f: impl FnOnce(u32) -> T) -> Option<u32> {
        let id = self.next_id()?;
        let key = self.slots.insert(RtTableEntry { id, value: f(id) });
        self.keys.insert(id, key);
        self.next_id = id.wrapping_add(1);
        Some(id)
    }

    /// 移除 id 对应的资源，未知 id 返回 `None`
    pub fn remove(&mut self, id: u32) -> Option<T> {
        let key = self.keys.swap_remove(&id)?;
        self.slots.remove(key).map(|entry| entry.value)
    }

    /// 按 id 升序取出所有存活的资源，并把 id 计数器重置为 1
    pub fn drain(&mut self) -> Vec<(u32, T)> {
        let mut entries = self.slots.drain().map(|(_, entry)| (entry.id, entry.value)).collect::<Vec<_>>();
        entries.sort_by_key(|(id, _)| *id);
        self.keys.clear();
        self.next_id = Self::FIRST_ID;
        entries
    }
}
// getter
impl<T> RtResourceTable<T> {
    #[inline]
    pub fn get(&self, id: u32) -> Option<&T> {
        self.slots.get(*self.keys.get(&id)?).map(|entry| &entry.value)
    }

    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// 下一次 insert 将要分配的 id，`u32::MAX` 分配出去之后返回 `None`
    #[inline]
    pub fn next_id(&self) -> Option<u32> {
        (self.next_id >= Self::FIRST_ID).then_some(self.next_id)
    }

    /// 存活资源的数量
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
