use crate::download::DownloadSink;
use crate::error::{GenerationServiceError, SubmitError};
use crate::generation_service::GenerationService;
use crate::request::GenerationRequest;
use boxforge_asset::ModelFormat;
use crossbeam_channel::{Receiver, Sender};
use crossbeam_utils::sync::WaitGroup;
use std::sync::Arc;
use std::thread;

/// 提交顺序编号，越大越新
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

struct GenerationJob {
    id: RequestId,
    request: GenerationRequest,
}

struct GenerationOutcome {
    id: RequestId,
    request: GenerationRequest,
    result: Result<Vec<u8>, GenerationServiceError>,
}

/// 生成成功的模型文件
#[derive(Clone, Debug)]
pub struct GeneratedModel {
    pub request: GenerationRequest,
    pub payload: Arc<[u8]>,
}

impl GeneratedModel {
    #[inline]
    pub fn format(&self) -> ModelFormat {
        self.request.format
    }
}

#[derive(Debug)]
pub enum RequestEvent {
    /// 最新请求成功，交给资源中心
    Completed { id: RequestId, model: GeneratedModel },
    /// 最新请求失败，不会重试
    Failed { id: RequestId, error: GenerationServiceError },
    /// 已有更新的请求，结果不再交给视口
    Superseded { id: RequestId },
}

/// 请求控制器
///
/// ## 架构设计
/// - `submit` 在调用线程中同步校验参数，非法参数不会进入队列
/// - `dispatch-thread` 接收请求，分发到 rayon 线程池中执行（阻塞式 HTTP）
/// - 结果由 [`Self::poll`] 在帧线程中取回，到达顺序任意
/// - 只有最新提交的请求的结果会以 `Completed`/`Failed` 交出，其余为 `Superseded`
/// - 只有最新请求的成功响应会触发另存为，磁盘上的文件与视口显示的一致；另存为不阻塞结果交付
pub struct RequestController {
    request_sender: Option<Sender<GenerationJob>>,
    result_receiver: Receiver<GenerationOutcome>,
    dispatch_thread: Option<thread::JoinHandle<()>>,

    download_sink: Option<Arc<dyn DownloadSink>>,

    last_issued: RequestId,
    in_flight: usize,
}

// new & init
impl RequestController {
    pub fn new(service: Arc<dyn GenerationService>, download_sink: Option<Arc<dyn DownloadSink>>) -> Self {
        let (req_tx, req_rx) = crossbeam_channel::unbounded::<GenerationJob>();
        let (res_tx, res_rx) = crossbeam_channel::unbounded::<GenerationOutcome>();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .thread_name(|index| format!("Generation-Request-{}", index))
            .build()
            .expect("Failed to create generation request thread pool");

        let dispatch_thread = thread::Builder::new()
            .name("GenerationDispatch".to_string())
            .spawn(move || {
                let wait_group = WaitGroup::new();

                while let Ok(job) = req_rx.recv() {
                    let res_tx = res_tx.clone();
                    let service = service.clone();
                    let wg_task = wait_group.clone();

                    pool.spawn(move || {
                        log::info!(
                            "request #{}: {}x{}x{} {}",
                            job.id.value(),
                            job.request.width,
                            job.request.height,
                            job.request.depth,
                            job.request.format
                        );
                        let result = service.generate(&job.request);
                        let _ = res_tx.send(GenerationOutcome {
                            id: job.id,
                            request: job.request,
                            result,
                        });
                        drop(wg_task);
                    });
                }

                wait_group.wait();
            })
            .expect("Failed to spawn generation dispatcher thread");

        Self {
            request_sender: Some(req_tx),
            result_receiver: res_rx,
            dispatch_thread: Some(dispatch_thread),
            download_sink,
            last_issued: RequestId::default(),
            in_flight: 0,
        }
    }
}
// getter
impl RequestController {
    /// 已提交但尚未取回结果的请求数
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    #[inline]
    pub fn last_issued(&self) -> RequestId {
        self.last_issued
    }
}
// tools
impl RequestController {
    /// 校验并提交请求
    ///
    /// 校验失败时直接返回错误，不会发出任何网络请求。
    /// 请求没有进入队列时不会分配新的编号。
    pub fn submit(&mut self, request: GenerationRequest) -> Result<RequestId, SubmitError> {
        request.validate()?;

        let id = RequestId(self.last_issued.0 + 1);
        let Some(sender) = &self.request_sender else {
            log::error!("request controller is shut down, request dropped");
            return Err(SubmitError::Closed);
        };
        if let Err(e) = sender.send(GenerationJob { id, request }) {
            log::error!("Failed to send generation request #{}: {}", id.value(), e);
            return Err(SubmitError::Closed);
        }

        self.last_issued = id;
        self.in_flight += 1;
        Ok(id)
    }

    /// 取回所有已完成的请求，每帧调用
    pub fn poll(&mut self) -> Vec<RequestEvent> {
        let mut events = Vec::new();
        while let Ok(outcome) = self.result_receiver.try_recv() {
            events.push(self.handle_outcome(outcome));
        }
        events
    }

    /// 同 [`Self::poll`]，但在没有结果时最多阻塞 `timeout`
    pub fn poll_blocking(&mut self, timeout: std::time::Duration) -> Vec<RequestEvent> {
        let mut events = Vec::new();
        if self.in_flight > 0
            && let Ok(outcome) = self.result_receiver.recv_timeout(timeout)
        {
            events.push(self.handle_outcome(outcome));
        }
        events.extend(self.poll());
        events
    }

    fn handle_outcome(&mut self, outcome: GenerationOutcome) -> RequestEvent {
        self.in_flight = self.in_flight.saturating_sub(1);
        let GenerationOutcome { id, request, result } = outcome;

        if id < self.last_issued {
            log::debug!("request #{} superseded by #{}", id.value(), self.last_issued.value());
            return RequestEvent::Superseded { id };
        }

        match result {
            Ok(bytes) => {
                let payload: Arc<[u8]> = Arc::from(bytes);
                if let Some(sink) = &self.download_sink {
                    sink.save(&request.format.download_file_name(), payload.clone());
                }
                RequestEvent::Completed {
                    id,
                    model: GeneratedModel { request, payload },
                }
            }
            Err(error) => {
                log::error!("request #{} failed: {}", id.value(), error);
                RequestEvent::Failed { id, error }
            }
        }
    }
}

// destroy
impl RequestController {
    /// 停止接收新请求，等待已发出的请求全部结束
    ///
    /// 已完成但未 poll 的结果仍然可以取回。
    pub fn shutdown(&mut self) {
        // 必须先 drop sender，否则 recv 会一直阻塞，导致 join 死锁
        self.request_sender = None;

        if let Some(thread) = self.dispatch_thread.take()
            && thread.join().is_err()
        {
            log::error!("Failed to join generation dispatcher thread");
        }
    }
}

impl Drop for RequestController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
