use crate::format::ModelFormat;
use crate::handle::{GenerationToken, ResourceHandle, ResourceKey, ResourceStatus};
use slotmap::SlotMap;
use std::sync::Arc;

struct ResourceEntry {
    payload: Arc<[u8]>,
    url: String,
}

/// acquire / release 计数，用于检查泄漏
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub acquired: u64,
    pub released: u64,
}

impl ResourceStats {
    #[inline]
    pub fn live(&self) -> u64 {
        self.acquired - self.released
    }
}

/// 资源中心
///
/// 职责:
/// 1. 把生成服务返回的二进制 payload 物化为可寻址的资源 (`blob:boxforge/<token>`)。
/// 2. 分配单调递增的 generation token，维护唯一的 current 资源。
/// 3. 被取代的资源同步进入 Retired 状态，之后由 [`Self::collect_retired`] 或
///    [`Self::release_all`] 释放；每个资源恰好释放一次。
#[derive(Default)]
pub struct ResourceHub {
    resources: SlotMap<ResourceKey, ResourceEntry>,

    current: Option<ResourceHandle>,
    /// 等待释放的旧资源
    retired: Vec<ResourceHandle>,

    last_token: GenerationToken,
    stats: ResourceStats,
}
// new & init
impl ResourceHub {
    pub fn new() -> Self {
        Self::default()
    }
}
// getter
impl ResourceHub {
    #[inline]
    pub fn current(&self) -> Option<ResourceHandle> {
        self.current
    }

    /// 当前有效的 token；从未 acquire 或 current 已释放时为 `None`
    #[inline]
    pub fn current_token(&self) -> Option<GenerationToken> {
        self.current.map(|handle| handle.token)
    }

    #[inline]
    pub fn is_current(&self, handle: ResourceHandle) -> bool {
        self.current == Some(handle)
    }

    #[inline]
    pub fn last_token(&self) -> GenerationToken {
        self.last_token
    }

    #[inline]
    pub fn stats(&self) -> ResourceStats {
        self.stats
    }

    /// 尚未释放的资源数量 (current + retired)
    #[inline]
    pub fn live_count(&self) -> usize {
        self.resources.len()
    }

    #[inline]
    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    pub fn status(&self, handle: ResourceHandle) -> ResourceStatus {
        if !self.resources.contains_key(handle.key) {
            ResourceStatus::Released
        } else if self.is_current(handle) {
            ResourceStatus::Current
        } else {
            ResourceStatus::Retired
        }
    }

    /// 资源的字节内容；已释放时返回 `None`
    pub fn payload(&self, handle: ResourceHandle) -> Option<Arc<[u8]>> {
        self.resources.get(handle.key).map(|entry| entry.payload.clone())
    }

    pub fn url(&self, handle: ResourceHandle) -> Option<&str> {
        self.resources.get(handle.key).map(|entry| entry.url.as_str())
    }
}
// tools
impl ResourceHub {
    /// 物化一段 payload 并将其设为唯一的 current 资源
    ///
    /// 之前的 current 资源在返回前就已经进入 Retired 状态（token 失效），
    /// 它的存储会在下一次 [`Self::collect_retired`] 时释放。
    pub fn acquire(&mut self, payload: impl Into<Arc<[u8]>>, format: ModelFormat) -> ResourceHandle {
        let payload = payload.into();
        let token = self.last_token.next();
        self.last_token = token;

        let size = payload.len();
        let key = self.resources.insert(ResourceEntry {
            payload,
            url: format!("blob:boxforge/{}", token.value()),
        });
        let handle = ResourceHandle { key, token, format };
        self.stats.acquired += 1;

        if let Some(previous) = self.current.replace(handle) {
            log::debug!("retire resource {} ({})", previous.token, previous.format);
            self.retired.push(previous);
        }

        log::info!("acquire resource {} ({}, {} bytes)", token, format, size);
        handle
    }

    /// 释放资源。幂等：重复释放返回 `false` 且没有任何效果
    pub fn release(&mut self, handle: ResourceHandle) -> bool {
        if self.resources.remove(handle.key).is_none() {
            return false;
        }

        self.stats.released += 1;
        if self.current == Some(handle) {
            self.current = None;
        }
        self.retired.retain(|retired| *retired != handle);

        log::info!("release resource {} ({})", handle.token, handle.format);
        true
    }

    /// 释放所有 Retired 资源，返回释放数量
    pub fn collect_retired(&mut self) -> usize {
        self.collect_retired_except(None)
    }

    /// 同 [`Self::collect_retired`]，但保留 `keep`
    ///
    /// 视口在新网格就绪前继续显示旧网格，旧网格对应的资源由视口在替换时释放。
    pub fn collect_retired_except(&mut self, keep: Option<ResourceHandle>) -> usize {
        let (kept, to_release): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.retired).into_iter().partition(|handle| Some(*handle) == keep);
        self.retired = kept;
        to_release.into_iter().filter(|handle| self.release(*handle)).count()
    }

    /// 释放全部资源（包括 current），用于视口销毁
    pub fn release_all(&mut self) -> usize {
        let mut released = self.collect_retired();
        if let Some(current) = self.current
            && self.release(current)
        {
            released += 1;
        }
        released
    }
}
impl Drop for ResourceHub {
    fn drop(&mut self) {
        if !self.resources.is_empty() {
            log::warn!("ResourceHub dropped with {} live resources, releasing them", self.resources.len());
            self.release_all();
        }
    }
}
