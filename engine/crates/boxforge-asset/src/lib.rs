//! 模型资源
//!
//! - [`resource_hub::ResourceHub`]: 二进制 payload -> 可寻址资源 (`blob:` URL) 的唯一所有者，
//!   分配 generation token，保证每个资源恰好释放一次。
//! - [`decoder::MeshDecoder`]: 后台解码线程池，结果带着发起时的 token 返回。
//! - [`mesh_loader`]: 按格式分发的同步解码 (STL / OBJ)。

pub mod decoder;
pub mod error;
pub mod format;
pub mod handle;
pub mod mesh;
pub mod mesh_loader;
pub mod resource_hub;

pub use error::{DecodeError, DecodeErrorKind};
pub use format::ModelFormat;
pub use handle::{GenerationToken, ResourceHandle, ResourceStatus};
