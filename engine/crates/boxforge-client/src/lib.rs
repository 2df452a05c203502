//! 生成服务客户端
//!
//! - [`request::GenerationRequest`]: 表单参数，提交前在本地校验，非法参数不会发往网络。
//! - [`generation_service::GenerationService`]: 传输层，默认实现为 reqwest。
//! - [`download::DownloadSink`]: 另存为 `model.{format}`，不阻塞视口更新。
//! - [`request_controller::RequestController`]: 后台发送请求，按提交顺序保证“最后一次请求生效”。

pub mod download;
pub mod error;
pub mod generation_service;
pub mod request;
pub mod request_controller;
