use crate::format::ModelFormat;
use slotmap::new_key_type;
use std::fmt;

new_key_type! { pub struct ResourceKey; }

/// 单调递增的 generation token，0 表示“还没有任何资源”
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(u64);

impl GenerationToken {
    pub const NONE: GenerationToken = GenerationToken(0);

    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    #[inline]
    pub(crate) fn next(self) -> Self {
        GenerationToken(self.0 + 1)
    }
}

impl fmt::Display for GenerationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 指向 [`ResourceHub`](crate::resource_hub::ResourceHub) 中一段二进制资源的句柄
///
/// 句柄本身只是一个 id，资源的所有权始终在 hub 中。
/// slotmap 的 key 带版本号，资源释放后旧句柄不会命中新资源。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    pub(crate) key: ResourceKey,
    pub(crate) token: GenerationToken,
    pub(crate) format: ModelFormat,
}

impl ResourceHandle {
    #[inline]
    pub fn token(&self) -> GenerationToken {
        self.token
    }

    #[inline]
    pub fn format(&self) -> ModelFormat {
        self.format
    }
}

/// 资源的生命周期
///
/// 状态流转: Current -> Retired -> Released
///                  \-----------------/
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ResourceStatus {
    /// 唯一的当前资源
    Current,
    /// 已被新资源取代，token 失效，等待释放
    Retired,
    /// 存储已释放
    Released,
}
