use crate::error::DecodeError;
use crate::handle::{GenerationToken, ResourceHandle};
use crate::mesh::DecodedMesh;
use crate::mesh_loader;
use crossbeam_channel::{Receiver, Sender};
use crossbeam_utils::sync::WaitGroup;
use std::sync::Arc;
use std::thread;

/// 一次解码请求
///
/// payload 是从 hub 中复制出的 `Arc`，解码期间 hub 释放该资源不会影响解码本身；
/// 结果是否还有效由 token 判断。
pub struct DecodeRequest {
    pub handle: ResourceHandle,
    pub payload: Arc<[u8]>,
}

pub enum DecodeResult {
    Success(DecodedMesh),
    Failure { handle: ResourceHandle, error: DecodeError },
}

impl DecodeResult {
    /// 发起解码时捕获的资源句柄
    pub fn handle(&self) -> ResourceHandle {
        match self {
            DecodeResult::Success(mesh) => mesh.source,
            DecodeResult::Failure { handle, .. } => *handle,
        }
    }

    #[inline]
    pub fn token(&self) -> GenerationToken {
        self.handle().token()
    }
}

/// 后台解码器
///
/// ## 架构设计
/// - 内部的 `dispatch-thread` 接收请求，分发到 rayon 线程池
/// - crossbeam channel 负责线程间通信
///     - request: 帧线程 -> dispatch-thread
///     - result: worker -> 帧线程，由 [`Self::try_recv_result`] 每帧取出
/// - 结果的到达顺序与请求顺序无关
///
/// Drop 时先断开 request channel，dispatch-thread 等待所有已分发任务完成后退出。
pub struct MeshDecoder {
    request_sender: Option<Sender<DecodeRequest>>,
    result_receiver: Receiver<DecodeResult>,

    dispatch_thread: Option<thread::JoinHandle<()>>,
}

impl Default for MeshDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshDecoder {
    pub fn new() -> Self {
        let (req_tx, req_rx) = crossbeam_channel::unbounded::<DecodeRequest>();
        let (res_tx, res_rx) = crossbeam_channel::unbounded::<DecodeResult>();

        let pool = rayon::ThreadPoolBuilder::new()
            .thread_name(|index| format!("Mesh-Decoder-{}", index))
            .build()
            .expect("Failed to create mesh decoder thread pool");

        let dispatch_thread = thread::Builder::new()
            .name("MeshDecodeDispatch".to_string())
            .spawn(move || {
                let wait_group = WaitGroup::new();

                while let Ok(req) = req_rx.recv() {
                    let res_tx = res_tx.clone();
                    let wg_task = wait_group.clone();

                    pool.spawn(move || {
                        let result = decode_task(req);
                        // 接收端已销毁说明视口已经拆除，结果直接丢弃
                        let _ = res_tx.send(result);
                        drop(wg_task);
                    });
                }

                wait_group.wait();
            })
            .expect("Failed to spawn mesh decode dispatcher thread");

        Self {
            request_sender: Some(req_tx),
            result_receiver: res_rx,
            dispatch_thread: Some(dispatch_thread),
        }
    }

    /// 非阻塞，结果稍后通过 [`Self::try_recv_result`] 取回
    pub fn request_decode(&self, req: DecodeRequest) {
        if let Some(sender) = &self.request_sender
            && let Err(e) = sender.send(req)
        {
            log::error!("Failed to send decode request for resource {}", e.0.handle.token());
        }
    }

    pub fn try_recv_result(&self) -> Option<DecodeResult> {
        self.result_receiver.try_recv().ok()
    }

    /// 阻塞等待下一个结果，测试与命令行工具使用
    pub fn recv_result_timeout(&self, timeout: std::time::Duration) -> Option<DecodeResult> {
        self.result_receiver.recv_timeout(timeout).ok()
    }
}

impl Drop for MeshDecoder {
    fn drop(&mut self) {
        // 必须先 drop sender，否则 recv 会一直阻塞，导致 join 死锁
        self.request_sender = None;

        if let Some(thread) = self.dispatch_thread.take()
            && thread.join().is_err()
        {
            log::error!("Failed to join mesh decode dispatcher thread");
        }
        log::debug!("MeshDecoder dropped, all decode tasks finished.");
    }
}

/// 运行在 rayon 线程池中
fn decode_task(req: DecodeRequest) -> DecodeResult {
    let handle = req.handle;
    log::debug!("decoding resource {} as {}", handle.token(), handle.format());

    match mesh_loader::decode_mesh(handle.format(), &req.payload) {
        Ok(geometry) => {
            log::info!(
                "decoded resource {}: {} vertices, {} triangles",
                handle.token(),
                geometry.vertex_count(),
                geometry.triangle_count()
            );
            DecodeResult::Success(DecodedMesh {
                source: handle,
                geometry,
            })
        }
        Err(error) => {
            log::error!("Failed to decode resource {}: {}", handle.token(), error);
            DecodeResult::Failure { handle, error }
        }
    }
}
