//! 按 [`ModelFormat`] 分发的同步解码器
//!
//! 解码路径由资源句柄上标记的格式决定，不会因为某种格式解码失败而换另一个解码器重试。
//! STEP 是 B-rep 格式，运行时没有网格化路径，解码总是返回 `Unsupported`。

mod obj_loader;
mod stl_loader;

use crate::error::DecodeError;
use crate::format::ModelFormat;
use crate::mesh::MeshGeometry;

pub use obj_loader::ObjLoader;
pub use stl_loader::StlLoader;

/// 某种格式的解码器
pub trait MeshLoader {
    const FORMAT: ModelFormat;

    fn load(bytes: &[u8]) -> Result<MeshGeometry, DecodeError>;
}

/// 当前运行时是否能解码该格式
pub fn supports(format: ModelFormat) -> bool {
    !matches!(format, ModelFormat::Step)
}

pub fn decode_mesh(format: ModelFormat, bytes: &[u8]) -> Result<MeshGeometry, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::truncated(format, "payload is empty"));
    }
    match format {
        ModelFormat::Stl => StlLoader::load(bytes),
        ModelFormat::Obj => ObjLoader::load(bytes),
        ModelFormat::Step => Err(DecodeError::unsupported(format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeErrorKind;

    #[test]
    fn step_is_surfaced_as_unsupported() {
        let err = decode_mesh(ModelFormat::Step, b"ISO-10303-21;\nHEADER;\nENDSEC;\n").unwrap_err();
        assert_eq!(err.format, ModelFormat::Step);
        assert_eq!(err.kind, DecodeErrorKind::Unsupported);
        assert!(!supports(ModelFormat::Step));
    }

    #[test]
    fn obj_text_is_not_decoded_as_stl() {
        let obj = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        assert!(decode_mesh(ModelFormat::Obj, obj).is_ok());
        let err = decode_mesh(ModelFormat::Stl, obj).unwrap_err();
        assert_eq!(err.format, ModelFormat::Stl);
    }

    #[test]
    fn empty_payload_is_truncated() {
        let err = decode_mesh(ModelFormat::Obj, b"").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::Truncated);
    }
}
