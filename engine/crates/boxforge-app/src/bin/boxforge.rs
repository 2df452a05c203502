use anyhow::Context;
use boxforge_app::app::BoxforgeApp;
use boxforge_client::request::GenerationRequest;
use boxforge_crate_tools::config::BoxforgeConfig;
use boxforge_crate_tools::resource::BoxforgePath;
use boxforge_scene::viewport::{ViewportEvent, ViewportStatus};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// 生成一个长方体模型并在预览视口中加载
#[derive(Parser, Debug)]
#[command(name = "boxforge", version)]
struct Cli {
    /// 宽度，缺省时使用配置中的默认值
    width: Option<String>,
    height: Option<String>,
    depth: Option<String>,
    /// stl / step / obj
    format: Option<String>,

    /// 配置文件，不存在时使用默认配置
    #[arg(long)]
    config: Option<PathBuf>,

    /// 覆盖配置中的生成服务地址
    #[arg(long)]
    endpoint: Option<String>,

    /// 不写出 model.{format}
    #[arg(long)]
    no_download: bool,
}

fn main() -> anyhow::Result<()> {
    BoxforgeApp::init_env();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(BoxforgePath::config_path);
    let mut config = BoxforgeConfig::load_or_default(&config_path)
        .with_context(|| format!("加载配置失败: {:?}", config_path))?;
    if let Some(endpoint) = &cli.endpoint {
        config.service.endpoint = endpoint.clone();
    }
    if cli.no_download {
        config.download.enabled = false;
    }

    let defaults = &config.defaults;
    let request = GenerationRequest::parse(
        cli.width.as_deref().unwrap_or(&defaults.width.to_string()),
        cli.height.as_deref().unwrap_or(&defaults.height.to_string()),
        cli.depth.as_deref().unwrap_or(&defaults.depth.to_string()),
        cli.format.as_deref().unwrap_or(&defaults.format),
    )
    .context("参数无效")?;
    let wait = Duration::from_secs(config.service.timeout_secs + 10);

    let mut app = BoxforgeApp::from_config(config)?;
    let id = app.submit(request)?;
    log::info!("submitted request #{}", id.value());

    if !app.run_until_settled(wait) {
        log::error!("gave up waiting after {:?}", wait);
    }
    // 最后一帧，处理 run_until_settled 中未被观察到的事件
    for event in app.update() {
        if let ViewportEvent::Failed(token, error) = event {
            log::error!("resource {} failed to load: {}", token, error);
        }
    }

    let status = app.viewport().status();
    match status {
        ViewportStatus::Loaded => {
            if let Some(mesh) = app.viewport().displayed_mesh() {
                let camera = app.viewport().camera_controller().camera();
                log::info!(
                    "preview ready: '{}' {} vertices, {} bytes of vertex/index data, camera at {}",
                    mesh.name,
                    mesh.vertex_count,
                    mesh.buffers.size_in_bytes(),
                    camera.position()
                );
            }
        }
        ViewportStatus::Failed => {
            if let Some(error) = &app.viewport().state().last_error {
                log::error!("preview failed: {}", error);
            }
        }
        ViewportStatus::Idle | ViewportStatus::Loading => {
            if let Some(error) = app.last_service_error() {
                log::error!("generation failed: {}", error);
            }
        }
    }

    let service_failed = app.last_service_error().is_some();
    app.destroy();

    // 解码失败时文件已经下载，只有没拿到模型才算失败
    if service_failed || matches!(status, ViewportStatus::Idle | ViewportStatus::Loading) {
        anyhow::bail!("no model generated (viewport {:?})", status);
    }
    Ok(())
}
