use crate::components::instance::Instance;
use crate::components::light::Lighting;
use crate::components::material::Material;
use crate::components::mesh::Mesh;
use crate::guid_new_type::{InstanceHandle, MaterialHandle, MeshHandle};
use crate::platform::camera_controller::CameraController;
use crate::platform::input_state::InputState;
use crate::scene_manager::{DrawItem, SceneManager};
use boxforge_asset::decoder::{DecodeRequest, DecodeResult, MeshDecoder};
use boxforge_asset::mesh::DecodedMesh;
use boxforge_asset::resource_hub::ResourceHub;
use boxforge_asset::{DecodeError, GenerationToken, ResourceHandle};
use boxforge_crate_tools::config::ViewportConfig;

/// 视口加载状态机
///
/// 状态流转: Idle -> Loading -> Loaded
///                          \-> Failed
/// 任意状态下换新的资源都会回到 Loading。
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ViewportStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewportState {
    pub status: ViewportStatus,
    /// 当前显示的网格
    pub mesh: Option<MeshHandle>,
    /// 视口当前接受的 token，解码结果的 token 不一致即为过期结果
    pub token: GenerationToken,
    pub last_error: Option<DecodeError>,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            status: ViewportStatus::Idle,
            mesh: None,
            token: GenerationToken::NONE,
            last_error: None,
        }
    }
}

/// [`Viewport::update`] 中处理的解码结果
#[derive(Clone, Debug, PartialEq)]
pub enum ViewportEvent {
    Loaded(GenerationToken),
    Failed(GenerationToken, DecodeError),
    /// 被更新的资源取代后才完成的解码，结果被丢弃
    StaleResultDiscarded(GenerationToken),
}

/// 场景中正在显示的网格及其来源资源
#[derive(Clone, Copy, Debug)]
struct DisplayedMesh {
    resource: ResourceHandle,
    instance: InstanceHandle,
}

/// 每帧交给渲染后端的数据
pub struct RenderData<'a> {
    pub view: glam::Mat4,
    pub projection: glam::Mat4,
    pub lighting: Lighting,
    pub draws: Vec<DrawItem<'a>>,
}

/// 预览视口
///
/// 职责:
/// 1. 持有场景、相机与灯光。
/// 2. 唯一的输入是 [`Self::set_source`]：宿主想要显示的资源。
/// 3. 每帧 [`Self::update`] 取回后台解码结果，用 token 判断是否过期，过期结果直接丢弃。
/// 4. 显示中的网格与其资源同生共死：网格被替换或视口销毁时，资源一并释放。
pub struct Viewport {
    state: ViewportState,

    scene: SceneManager,
    camera_controller: CameraController,
    lighting: Lighting,
    default_material: MaterialHandle,

    decoder: MeshDecoder,
    /// 正在解码、且仍被视口接受的资源
    pending: Option<ResourceHandle>,
    displayed: Option<DisplayedMesh>,

    in_flight: usize,
    stale_discarded: u64,
}
// new & init
impl Viewport {
    pub fn new(config: &ViewportConfig) -> Self {
        let mut scene = SceneManager::new();
        let default_material = scene.register_mat(Material::standard(config.mesh_color));

        Self {
            state: ViewportState::default(),
            scene,
            camera_controller: CameraController::new(),
            lighting: Lighting::from_config(config),
            default_material,
            decoder: MeshDecoder::new(),
            pending: None,
            displayed: None,
            in_flight: 0,
            stale_discarded: 0,
        }
    }
}
// getter
impl Viewport {
    #[inline]
    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    #[inline]
    pub fn status(&self) -> ViewportStatus {
        self.state.status
    }

    #[inline]
    pub fn scene(&self) -> &SceneManager {
        &self.scene
    }

    #[inline]
    pub fn camera_controller(&self) -> &CameraController {
        &self.camera_controller
    }

    #[inline]
    pub fn camera_controller_mut(&mut self) -> &mut CameraController {
        &mut self.camera_controller
    }

    #[inline]
    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    /// 当前显示的网格对应的资源
    #[inline]
    pub fn displayed_resource(&self) -> Option<ResourceHandle> {
        self.displayed.map(|displayed| displayed.resource)
    }

    #[inline]
    pub fn displayed_mesh(&self) -> Option<&Mesh> {
        let displayed = self.displayed?;
        let instance = self.scene.get_instance(displayed.instance)?;
        self.scene.get_mesh(instance.mesh)
    }

    /// 已请求但尚未取回结果的解码数量（包括已被取代的）
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    #[inline]
    pub fn stale_discarded(&self) -> u64 {
        self.stale_discarded
    }

    /// 没有任何未完成的解码
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.in_flight == 0
    }

    pub fn prepare_render_data(&self) -> RenderData<'_> {
        let camera = self.camera_controller.camera();
        RenderData {
            view: camera.get_view_matrix(),
            projection: camera.get_projection_matrix(),
            lighting: self.lighting,
            draws: self.scene.draw_items(),
        }
    }
}
// tools
impl Viewport {
    /// 设置视口想要显示的资源
    ///
    /// - `Some(handle)`：进入 Loading 并开始解码；之前未完成的解码被放弃，它们的结果之后会被丢弃。
    ///   旧网格在新网格就绪前保持显示。
    /// - `None`：移除当前网格并释放其资源，回到 Idle。
    pub fn set_source(&mut self, hub: &mut ResourceHub, source: Option<ResourceHandle>) {
        let Some(handle) = source else {
            self.pending = None;
            self.detach_displayed(hub);
            self.state.status = ViewportStatus::Idle;
            self.state.last_error = None;
            return;
        };

        if self.pending == Some(handle) || self.displayed_resource() == Some(handle) {
            return;
        }
        if !hub.is_current(handle) {
            log::warn!("ignore source {}: it is no longer the current resource", handle.token());
            return;
        }

        if let Some(abandoned) = self.pending.replace(handle) {
            log::debug!("abandon decode of resource {}", abandoned.token());
        }
        self.state.status = ViewportStatus::Loading;
        self.state.token = handle.token();

        match hub.payload(handle) {
            Some(payload) => {
                self.decoder.request_decode(DecodeRequest { handle, payload });
                self.in_flight += 1;
            }
            None => {
                // current 资源不可能没有 payload，保险起见当作解码失败
                self.pending = None;
                let error = DecodeError::truncated(handle.format(), "resource storage already released");
                self.fail(handle.token(), error);
            }
        }
    }

    /// 每帧调用：处理完成的解码，回收被取代的资源
    pub fn update(&mut self, hub: &mut ResourceHub) -> Vec<ViewportEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.decoder.try_recv_result() {
            self.in_flight = self.in_flight.saturating_sub(1);
            events.push(self.handle_decode_result(hub, result));
        }

        hub.collect_retired_except(self.displayed_resource());
        events
    }

    /// 同 [`Self::update`]，但在没有结果时最多阻塞 `timeout`
    pub fn update_blocking(&mut self, hub: &mut ResourceHub, timeout: std::time::Duration) -> Vec<ViewportEvent> {
        let mut events = Vec::new();
        if self.in_flight > 0
            && let Some(result) = self.decoder.recv_result_timeout(timeout)
        {
            self.in_flight = self.in_flight.saturating_sub(1);
            events.push(self.handle_decode_result(hub, result));
        }
        events.extend(self.update(hub));
        events
    }

    /// 根据输入更新相机，并消耗本帧的鼠标与滚轮增量
    pub fn handle_input(
        &mut self,
        input_state: &mut InputState,
        viewport_size: glam::Vec2,
        delta_time: std::time::Duration,
    ) {
        self.camera_controller.update(input_state, viewport_size, delta_time);
        input_state.end_frame();
    }

    /// 视口销毁：无论是否有未完成的解码，释放全部资源并移除网格
    pub fn teardown(&mut self, hub: &mut ResourceHub) {
        self.pending = None;
        self.detach_displayed(hub);
        let released = hub.release_all();
        self.scene.destroy_mut();

        self.state.status = ViewportStatus::Idle;
        self.state.mesh = None;
        log::info!("viewport torn down, released {} resources", released);
    }

    pub(crate) fn handle_decode_result(&mut self, hub: &mut ResourceHub, result: DecodeResult) -> ViewportEvent {
        let handle = result.handle();
        let token = handle.token();

        if self.pending != Some(handle) || !hub.is_current(handle) {
            self.stale_discarded += 1;
            log::debug!("discard stale decode result {} (viewport token {})", token, self.state.token);
            // 孤立的资源立即释放；hub 已经回收过时 release 是空操作
            if self.displayed_resource() != Some(handle) {
                hub.release(handle);
            }
            return ViewportEvent::StaleResultDiscarded(token);
        }

        self.pending = None;
        match result {
            DecodeResult::Success(mesh) => {
                self.attach(hub, mesh);
                ViewportEvent::Loaded(token)
            }
            DecodeResult::Failure { error, .. } => {
                self.fail(token, error.clone());
                ViewportEvent::Failed(token, error)
            }
        }
    }

    fn attach(&mut self, hub: &mut ResourceHub, decoded: DecodedMesh) {
        let resource = decoded.source;
        let mesh = Mesh::from_decoded(decoded);
        self.camera_controller.camera_mut().frame_bounds(&mesh.bounds);
        log::info!(
            "attach mesh '{}': {} vertices, {} triangles",
            mesh.name,
            mesh.vertex_count,
            mesh.buffers.index_count / 3
        );

        let mesh = self.scene.register_mesh(mesh);
        let instance = self.scene.register_instance(Instance {
            mesh,
            material: self.default_material,
            transform: glam::Mat4::IDENTITY,
        });

        self.detach_displayed(hub);
        self.displayed = Some(DisplayedMesh { resource, instance });

        self.state.status = ViewportStatus::Loaded;
        self.state.mesh = Some(mesh);
        self.state.last_error = None;
    }

    /// 场景保留上一次成功的网格
    fn fail(&mut self, token: GenerationToken, error: DecodeError) {
        log::error!("load of resource {} failed: {}", token, error);
        self.state.status = ViewportStatus::Failed;
        self.state.last_error = Some(error);
    }

    fn detach_displayed(&mut self, hub: &mut ResourceHub) {
        if let Some(displayed) = self.displayed.take() {
            self.scene.remove_instance(displayed.instance);
            hub.release(displayed.resource);
            self.state.mesh = None;
        }
    }
}
