use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 生成服务支持导出的文件格式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Stl,
    Step,
    Obj,
}

impl ModelFormat {
    pub const ALL: [ModelFormat; 3] = [ModelFormat::Stl, ModelFormat::Step, ModelFormat::Obj];

    /// 文件扩展名，同时也是请求体中的 `file_format`
    pub fn extension(self) -> &'static str {
        match self {
            ModelFormat::Stl => "stl",
            ModelFormat::Step => "step",
            ModelFormat::Obj => "obj",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ModelFormat::Stl => "model/stl",
            ModelFormat::Step => "model/step",
            ModelFormat::Obj => "model/obj",
        }
    }

    /// 下载文件名 `model.{format}`
    pub fn download_file_name(self) -> String {
        format!("model.{}", self.extension())
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported file format '{0}', use 'stl', 'step', or 'obj'")]
pub struct UnknownFormatError(pub String);

impl FromStr for ModelFormat {
    type Err = UnknownFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ModelFormat::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownFormatError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        assert_eq!("stl".parse::<ModelFormat>().unwrap(), ModelFormat::Stl);
        assert_eq!(" STEP ".parse::<ModelFormat>().unwrap(), ModelFormat::Step);
        assert_eq!("obj".parse::<ModelFormat>().unwrap(), ModelFormat::Obj);
    }

    #[test]
    fn rejects_unknown_format() {
        let err = "gltf".parse::<ModelFormat>().unwrap_err();
        assert_eq!(err, UnknownFormatError("gltf".to_string()));
    }

    #[test]
    fn download_name_follows_extension() {
        assert_eq!(ModelFormat::Stl.download_file_name(), "model.stl");
        assert_eq!(ModelFormat::Step.media_type(), "model/step");
    }
}
