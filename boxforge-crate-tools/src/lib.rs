//! Boxforge 工具集
//!
//! 提供日志初始化、资源路径管理、TOML 配置加载等通用工具。
//!
//! # BoxforgePath
//! 基于工作区根目录的统一路径管理，避免硬编码相对路径。
//!
//! # BoxforgeConfig
//! 生成服务地址、下载目录、表单默认值与视口参数，全部可以通过 `boxforge.toml` 覆盖。

pub mod config;
pub mod init_log;
pub mod resource;
