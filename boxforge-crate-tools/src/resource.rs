use std::path::{Path, PathBuf};

/// 统一资源路径管理
///
/// 所有路径基于工作区根目录（通过 `CARGO_MANIFEST_DIR` 推导）。
///
/// # 使用示例
/// ```ignore
/// let config = BoxforgePath::config_path();             // boxforge.toml
/// let downloads = BoxforgePath::resolve("downloads");      // <workspace>/downloads
/// ```
pub struct BoxforgePath {}
// 核心路径
impl BoxforgePath {
    /// 获取工作区根目录
    pub fn workspace_path() -> PathBuf {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        manifest_dir.parent().map(Path::to_path_buf).unwrap_or_else(|| manifest_dir.to_path_buf())
    }
}
// 根目录下
impl BoxforgePath {
    /// 默认配置文件 `boxforge.toml`
    pub fn config_path() -> PathBuf {
        Self::workspace_path().join("boxforge.toml")
    }

    /// 相对路径基于工作区根目录解析，绝对路径原样返回
    pub fn resolve(path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() { path.to_path_buf() } else { Self::workspace_path().join(path) }
    }
}
