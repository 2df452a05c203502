//! 预览视口
//!
//! [`viewport::Viewport`] 持有场景、相机与灯光，并驱动 `Idle -> Loading -> Loaded/Failed`
//! 状态机；每帧调用 [`viewport::Viewport::update`] 取回解码结果。

pub mod components;
pub mod guid_new_type;
pub mod platform;
pub mod scene_manager;
pub mod viewport;
