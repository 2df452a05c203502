use crate::error::GenerationServiceError;
use crate::request::GenerationRequest;
use anyhow::Context;
use boxforge_crate_tools::config::ServiceConfig;
use std::time::Duration;

/// 远端生成服务
///
/// 实现在后台线程中被调用，可以阻塞。
pub trait GenerationService: Send + Sync {
    /// 成功时返回模型文件的原始字节
    fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationServiceError>;
}

/// `POST {endpoint}`，JSON 请求体，二进制响应体
pub struct HttpGenerationService {
    client: reqwest::blocking::Client,
    endpoint: String,
}

// new & init
impl HttpGenerationService {
    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("创建 HTTP 客户端失败")?;

        reqwest::Url::parse(&config.endpoint).with_context(|| format!("生成服务地址无效: {}", config.endpoint))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl GenerationService for HttpGenerationService {
    fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationServiceError> {
        let body = request.to_json().map_err(|e| GenerationServiceError::Transport(e.to_string()))?;
        log::debug!("POST {} {}", self.endpoint, String::from_utf8_lossy(&body));

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, request.format.media_type())
            .body(body)
            .send()
            .map_err(|e| GenerationServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationServiceError::Status {
                status_code: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(|e| GenerationServiceError::Transport(e.to_string()))?;
        log::info!("generation service returned {} bytes of {}", bytes.len(), request.format);
        Ok(bytes.to_vec())
    }
}
