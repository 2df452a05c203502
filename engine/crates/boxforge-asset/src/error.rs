use crate::format::ModelFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// 内容不符合格式
    Malformed,
    /// 数据比格式声明的短
    Truncated,
    /// 当前运行时没有该格式的解码路径
    Unsupported,
}

/// 解码失败。永远不会让渲染循环崩溃，只会让视口进入 `Failed`
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("failed to decode {format} payload ({kind:?}): {reason}")]
pub struct DecodeError {
    pub format: ModelFormat,
    pub kind: DecodeErrorKind,
    pub reason: String,
}

impl DecodeError {
    pub fn malformed(format: ModelFormat, reason: impl Into<String>) -> Self {
        Self {
            format,
            kind: DecodeErrorKind::Malformed,
            reason: reason.into(),
        }
    }

    pub fn truncated(format: ModelFormat, reason: impl Into<String>) -> Self {
        Self {
            format,
            kind: DecodeErrorKind::Truncated,
            reason: reason.into(),
        }
    }

    pub fn unsupported(format: ModelFormat) -> Self {
        Self {
            format,
            kind: DecodeErrorKind::Unsupported,
            reason: format!("no {} decoder is available", format),
        }
    }
}
