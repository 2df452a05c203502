/// 本地参数校验失败，永远不会发往网络
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum InvalidParametersError {
    #[error("{field} must be a positive number, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} is not a number: '{input}'")]
    NotANumber { field: &'static str, input: String },
    #[error(transparent)]
    UnknownFormat(#[from] boxforge_asset::format::UnknownFormatError),
}

/// 提交请求失败
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] InvalidParametersError),
    /// 控制器已停止，请求没有发出
    #[error("request controller is shut down")]
    Closed,
}

/// 生成服务返回非 2xx，或者请求根本没有到达服务
///
/// 不会自动重试。
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenerationServiceError {
    #[error("generation service responded with status {status_code}")]
    Status { status_code: u16 },
    #[error("generation request failed: {0}")]
    Transport(String),
}
