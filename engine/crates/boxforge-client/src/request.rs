use crate::error::InvalidParametersError;
use boxforge_asset::ModelFormat;
use boxforge_crate_tools::config::FormDefaults;
use serde::Serialize;

/// 一次生成请求；发送后不可变
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub format: ModelFormat,
}

/// 请求体 `{width, height, depth, file_format}`
#[derive(Serialize)]
struct GenerationBody<'a> {
    width: f64,
    height: f64,
    depth: f64,
    file_format: &'a str,
}

impl GenerationRequest {
    pub fn new(width: f64, height: f64, depth: f64, format: ModelFormat) -> Self {
        Self {
            width,
            height,
            depth,
            format,
        }
    }

    /// 表单默认值 (50 x 50 x 50, stl)
    pub fn from_defaults(defaults: &FormDefaults) -> Result<Self, InvalidParametersError> {
        let request = Self::new(defaults.width, defaults.height, defaults.depth, defaults.format.parse()?);
        request.validate()?;
        Ok(request)
    }

    /// 从表单的字符串输入构造
    pub fn parse(width: &str, height: &str, depth: &str, format: &str) -> Result<Self, InvalidParametersError> {
        let number = |field: &'static str, input: &str| {
            input.trim().parse::<f64>().map_err(|_| InvalidParametersError::NotANumber {
                field,
                input: input.to_string(),
            })
        };
        let request = Self::new(
            number("width", width)?,
            number("height", height)?,
            number("depth", depth)?,
            format.parse()?,
        );
        request.validate()?;
        Ok(request)
    }

    /// 三个尺寸必须是有限正数
    pub fn validate(&self) -> Result<(), InvalidParametersError> {
        for (field, value) in [("width", self.width), ("height", self.height), ("depth", self.depth)] {
            if !value.is_finite() {
                return Err(InvalidParametersError::NotFinite { field, value });
            }
            if value <= 0.0 {
                return Err(InvalidParametersError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&GenerationBody {
            width: self.width,
            height: self.height,
            depth: self.depth,
            file_format: self.format.extension(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_is_rejected() {
        let err = GenerationRequest::new(0.0, 50.0, 50.0, ModelFormat::Stl).validate().unwrap_err();
        assert_eq!(
            err,
            InvalidParametersError::NonPositive {
                field: "width",
                value: 0.0
            }
        );
    }

    #[test]
    fn non_finite_is_rejected() {
        let err = GenerationRequest::new(50.0, f64::INFINITY, 50.0, ModelFormat::Stl).validate().unwrap_err();
        assert!(matches!(err, InvalidParametersError::NotFinite { field: "height", .. }));
        let err = GenerationRequest::new(50.0, 50.0, f64::NAN, ModelFormat::Stl).validate().unwrap_err();
        assert!(matches!(err, InvalidParametersError::NotFinite { field: "depth", .. }));
    }

    #[test]
    fn parse_form_strings() {
        let request = GenerationRequest::parse("50", " 20.5 ", "10", "obj").unwrap();
        assert_eq!(request, GenerationRequest::new(50.0, 20.5, 10.0, ModelFormat::Obj));

        assert!(matches!(
            GenerationRequest::parse("fifty", "1", "1", "stl"),
            Err(InvalidParametersError::NotANumber { field: "width", .. })
        ));
        assert!(matches!(
            GenerationRequest::parse("1", "1", "1", "fbx"),
            Err(InvalidParametersError::UnknownFormat(_))
        ));
        assert!(GenerationRequest::parse("-1", "1", "1", "stl").is_err());
    }

    #[test]
    fn body_uses_file_format_key() {
        let body = GenerationRequest::new(50.0, 40.0, 30.0, ModelFormat::Step).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["file_format"], "step");
        assert_eq!(value["width"], 50.0);
        assert_eq!(value["depth"], 30.0);
        assert!(value.get("format").is_none());
    }

    #[test]
    fn defaults_match_form() {
        let request = GenerationRequest::from_defaults(&FormDefaults::default()).unwrap();
        assert_eq!(request, GenerationRequest::new(50.0, 50.0, 50.0, ModelFormat::Stl));
    }
}
