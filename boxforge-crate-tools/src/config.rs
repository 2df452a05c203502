use crate::resource::BoxforgePath;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 生成服务相关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// 生成接口的完整 URL
    pub endpoint: String,
    /// 单次请求的超时时间（秒）
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/generate/".to_string(),
            timeout_secs: 60,
            user_agent: "Boxforge-Client/0.1".to_string(),
        }
    }
}

/// 下载（另存为 `model.{format}`）相关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub enabled: bool,
    /// 相对路径基于工作区根目录
    pub dir: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("downloads"),
        }
    }
}

/// 表单的初始值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    /// `stl` / `step` / `obj`
    pub format: String,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 50.0,
            depth: 50.0,
            format: "stl".to_string(),
        }
    }
}

/// 视口的材质与灯光
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// 0xRRGGBB
    pub mesh_color: u32,
    pub ambient_intensity: f32,
    pub directional_light_position: [f32; 3],
    pub directional_light_intensity: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            mesh_color: 0x00ff00,
            ambient_intensity: 0.5,
            directional_light_position: [1.0, 1.0, 1.0],
            directional_light_intensity: 1.0,
        }
    }
}

/// `boxforge.toml` 的完整内容，所有字段都有默认值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxforgeConfig {
    pub service: ServiceConfig,
    pub download: DownloadConfig,
    pub defaults: FormDefaults,
    pub viewport: ViewportConfig,
}

impl BoxforgeConfig {
    /// 从 TOML 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).with_context(|| format!("读取配置文件失败: {:?}", path.as_ref()))?;

        let mut config: BoxforgeConfig =
            toml::from_str(&content).with_context(|| format!("解析 TOML 配置失败: {:?}", path.as_ref()))?;
        config.download.dir = BoxforgePath::resolve(&config.download.dir);

        Ok(config)
    }

    /// 文件不存在时使用默认配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            log::info!("config {:?} not found, using defaults", path.as_ref());
            let mut config = Self::default();
            config.download.dir = BoxforgePath::resolve(&config.download.dir);
            Ok(config)
        }
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self).context("序列化配置失败")?;

        fs::write(path.as_ref(), content).with_context(|| format!("写入配置文件失败: {:?}", path.as_ref()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boxforge.toml");
        fs::write(&path, "[service]\nendpoint = \"http://example.test/generate/\"\n").unwrap();

        let config = BoxforgeConfig::from_file(&path).unwrap();
        assert_eq!(config.service.endpoint, "http://example.test/generate/");
        assert_eq!(config.service.timeout_secs, 60);
        assert_eq!(config.defaults.format, "stl");
        assert_eq!(config.viewport.mesh_color, 0x00ff00);
        assert!(config.download.dir.is_absolute());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boxforge.toml");

        let mut config = BoxforgeConfig::default();
        config.defaults.width = 12.5;
        config.download.dir = dir.path().join("out");
        config.save_to_file(&path).unwrap();

        let loaded = BoxforgeConfig::from_file(&path).unwrap();
        assert_eq!(loaded.defaults.width, 12.5);
        assert_eq!(loaded.download.dir, dir.path().join("out"));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BoxforgeConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.defaults.depth, 50.0);
        assert_eq!(config.viewport.ambient_intensity, 0.5);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boxforge.toml");
        fs::write(&path, "[service\nendpoint = 3").unwrap();
        assert!(BoxforgeConfig::from_file(&path).is_err());
    }
}
