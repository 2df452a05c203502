use boxforge_asset::resource_hub::ResourceHub;
use boxforge_client::download::{DownloadSink, FsDownloadSink};
use boxforge_client::error::{GenerationServiceError, SubmitError};
use boxforge_client::generation_service::{GenerationService, HttpGenerationService};
use boxforge_client::request::GenerationRequest;
use boxforge_client::request_controller::{RequestController, RequestEvent, RequestId};
use boxforge_crate_tools::config::BoxforgeConfig;
use boxforge_scene::viewport::{Viewport, ViewportEvent};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub fn panic_handler(info: &std::panic::PanicHookInfo) {
    log::error!("{}", info);
}

/// 宿主：表单 -> 请求控制器 -> 资源中心 -> 视口
///
/// 资源中心只有这里持有，视口通过参数借用。
pub struct BoxforgeApp {
    config: BoxforgeConfig,

    controller: RequestController,
    hub: ResourceHub,
    viewport: Viewport,

    last_request: Option<GenerationRequest>,
    /// 最近一次请求的服务错误；视口保持原样
    last_service_error: Option<GenerationServiceError>,
}
// new & init
impl BoxforgeApp {
    pub fn new(
        config: BoxforgeConfig,
        service: Arc<dyn GenerationService>,
        download_sink: Option<Arc<dyn DownloadSink>>,
    ) -> Self {
        let viewport = Viewport::new(&config.viewport);
        Self {
            controller: RequestController::new(service, download_sink),
            hub: ResourceHub::new(),
            viewport,
            config,
            last_request: None,
            last_service_error: None,
        }
    }

    /// 使用 HTTP 生成服务，按配置决定是否写出下载文件
    pub fn from_config(config: BoxforgeConfig) -> anyhow::Result<Self> {
        let service = Arc::new(HttpGenerationService::from_config(&config.service)?);
        log::info!("generation service: {}", service.endpoint());

        let download_sink: Option<Arc<dyn DownloadSink>> = if config.download.enabled {
            log::info!("downloads go to {:?}", config.download.dir);
            Some(Arc::new(FsDownloadSink::new(&config.download.dir)))
        } else {
            None
        };

        Ok(Self::new(config, service, download_sink))
    }

    pub fn init_env() {
        std::panic::set_hook(Box::new(panic_handler));
        boxforge_crate_tools::init_log::init_log();
    }
}
// getter
impl BoxforgeApp {
    #[inline]
    pub fn config(&self) -> &BoxforgeConfig {
        &self.config
    }

    #[inline]
    pub fn hub(&self) -> &ResourceHub {
        &self.hub
    }

    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    #[inline]
    pub fn controller(&self) -> &RequestController {
        &self.controller
    }

    #[inline]
    pub fn last_request(&self) -> Option<&GenerationRequest> {
        self.last_request.as_ref()
    }

    #[inline]
    pub fn last_service_error(&self) -> Option<&GenerationServiceError> {
        self.last_service_error.as_ref()
    }

    /// 没有未完成的请求，也没有未完成的解码
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.controller.is_idle() && self.viewport.is_settled()
    }
}
// update
impl BoxforgeApp {
    /// 提交表单；参数非法时什么都不会发生
    pub fn submit(&mut self, request: GenerationRequest) -> Result<RequestId, SubmitError> {
        let id = self.controller.submit(request.clone())?;
        self.last_request = Some(request);
        self.last_service_error = None;
        Ok(id)
    }

    /// 每帧调用
    pub fn update(&mut self) -> Vec<ViewportEvent> {
        let events = self.controller.poll();
        self.handle_request_events(events);
        self.viewport.update(&mut self.hub)
    }

    /// 同 [`Self::update`]，但在有未完成任务时最多阻塞 `frame_time`
    pub fn update_blocking(&mut self, frame_time: Duration) -> Vec<ViewportEvent> {
        let events = if self.controller.is_idle() {
            self.controller.poll()
        } else {
            self.controller.poll_blocking(frame_time)
        };
        self.handle_request_events(events);
        self.viewport.update_blocking(&mut self.hub, frame_time)
    }

    /// 循环 update 直到所有请求与解码都结束，超时返回 false
    pub fn run_until_settled(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_settled() {
            if Instant::now() >= deadline {
                log::warn!("not settled after {:?}", timeout);
                return false;
            }
            self.update_blocking(Duration::from_millis(16));
        }
        true
    }

    fn handle_request_events(&mut self, events: Vec<RequestEvent>) {
        for event in events {
            match event {
                RequestEvent::Completed { id, model } => {
                    let format = model.format();
                    let handle = self.hub.acquire(model.payload, format);
                    log::info!(
                        "request #{} -> resource {} ({})",
                        id.value(),
                        handle.token(),
                        self.hub.url(handle).unwrap_or_default()
                    );
                    self.viewport.set_source(&mut self.hub, Some(handle));
                }
                RequestEvent::Failed { id, error } => {
                    log::warn!("request #{} failed, keep current preview: {}", id.value(), error);
                    self.last_service_error = Some(error);
                }
                RequestEvent::Superseded { .. } => {}
            }
        }
    }
}
// destroy
impl BoxforgeApp {
    pub fn destroy(mut self) {
        self.viewport.teardown(&mut self.hub);
        let stats = self.hub.stats();
        log::info!("app destroyed, resources acquired {}, released {}", stats.acquired, stats.released);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxforge_asset::{ModelFormat, ResourceStatus};
    use boxforge_scene::viewport::ViewportStatus;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TRIANGLE_STL: &[u8] = b"solid box
facet normal 0 0 1
outer loop
vertex 0 0 0
vertex 1 0 0
vertex 0 1 0
endloop
endfacet
endsolid box
";

    /// 依次返回预设的响应，用完后一直返回 500
    struct ScriptedService {
        calls: AtomicUsize,
        responses: Mutex<VecDeque<Result<Vec<u8>, GenerationServiceError>>>,
    }

    impl ScriptedService {
        fn new(responses: Vec<Result<Vec<u8>, GenerationServiceError>>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                responses: Mutex::new(responses.into()),
            })
        }
    }

    impl GenerationService for ScriptedService {
        fn generate(&self, _request: &GenerationRequest) -> Result<Vec<u8>, GenerationServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerationServiceError::Status { status_code: 500 }))
        }
    }

    fn new_app(service: Arc<ScriptedService>, sink: Option<Arc<dyn DownloadSink>>) -> BoxforgeApp {
        boxforge_crate_tools::init_log::init_test_log();
        BoxforgeApp::new(BoxforgeConfig::default(), service, sink)
    }

    fn stl_request() -> GenerationRequest {
        GenerationRequest::from_defaults(&BoxforgeConfig::default().defaults).unwrap()
    }

    #[test]
    fn default_request_is_previewed_and_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(FsDownloadSink::new(dir.path()));
        let service = ScriptedService::new(vec![Ok(TRIANGLE_STL.to_vec())]);
        let mut app = new_app(service.clone(), Some(sink.clone()));

        assert_eq!(app.viewport().status(), ViewportStatus::Idle);
        app.submit(stl_request()).unwrap();
        assert!(app.run_until_settled(Duration::from_secs(5)));

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.viewport().status(), ViewportStatus::Loaded);
        assert_eq!(app.viewport().displayed_mesh().unwrap().vertex_count, 3);
        assert_eq!(app.viewport().displayed_resource(), app.hub().current());

        sink.flush();
        assert_eq!(std::fs::read(dir.path().join("model.stl")).unwrap(), TRIANGLE_STL);

        app.destroy();
    }

    #[test]
    fn service_error_keeps_previous_preview() {
        let service = ScriptedService::new(vec![
            Ok(TRIANGLE_STL.to_vec()),
            Err(GenerationServiceError::Status { status_code: 500 }),
        ]);
        let mut app = new_app(service, None);

        app.submit(stl_request()).unwrap();
        assert!(app.run_until_settled(Duration::from_secs(5)));
        let shown = app.viewport().displayed_resource();
        let state = app.viewport().state().clone();
        assert!(shown.is_some());

        app.submit(stl_request()).unwrap();
        assert!(app.run_until_settled(Duration::from_secs(5)));

        assert_eq!(
            app.last_service_error(),
            Some(&GenerationServiceError::Status { status_code: 500 })
        );
        assert_eq!(app.viewport().state(), &state);
        assert_eq!(app.viewport().displayed_resource(), shown);
        assert_eq!(app.hub().status(shown.unwrap()), ResourceStatus::Current);
    }

    #[test]
    fn invalid_form_sends_nothing() {
        let service = ScriptedService::new(vec![]);
        let mut app = new_app(service.clone(), None);

        let result = app.submit(GenerationRequest::new(0.0, 50.0, 50.0, ModelFormat::Stl));
        assert!(matches!(result, Err(SubmitError::Invalid(_))));
        assert!(app.is_settled());
        assert!(app.last_request().is_none());

        app.update();
        assert_eq!(app.viewport().status(), ViewportStatus::Idle);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn step_download_fails_preview_only() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(FsDownloadSink::new(dir.path()));
        let service = ScriptedService::new(vec![Ok(b"ISO-10303-21;".to_vec())]);
        let mut app = new_app(service, Some(sink.clone()));

        app.submit(GenerationRequest::new(10.0, 10.0, 10.0, ModelFormat::Step)).unwrap();
        assert!(app.run_until_settled(Duration::from_secs(5)));

        assert_eq!(app.viewport().status(), ViewportStatus::Failed);
        assert!(app.last_service_error().is_none());
        sink.flush();
        assert!(dir.path().join("model.step").exists());
    }

    #[test]
    fn destroy_releases_every_resource() {
        let service = ScriptedService::new(vec![Ok(TRIANGLE_STL.to_vec()), Ok(TRIANGLE_STL.to_vec())]);
        let mut app = new_app(service, None);

        app.submit(stl_request()).unwrap();
        assert!(app.run_until_settled(Duration::from_secs(5)));
        app.submit(stl_request()).unwrap();
        assert!(app.run_until_settled(Duration::from_secs(5)));

        let stats = app.hub().stats();
        assert_eq!(stats.acquired, 2);
        assert_eq!(app.hub().live_count(), 1);

        app.viewport.teardown(&mut app.hub);
        assert_eq!(app.hub().live_count(), 0);
        assert_eq!(app.hub().stats().released, 2);
    }
}
