use log::debug;
use reqwest::{header::CONTENT_TYPE, Client};
use twitzy_scope::{AvatarProbeError, ImageProbe, ProbeFuture};

/// Loads avatars over HTTP. A 2xx response with an `image/*` content type
/// counts as loaded.
#[derive(Clone, Debug)]
pub struct HttpImageProbe {
    client: Client,
}

impl HttpImageProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ImageProbe for HttpImageProbe {
    fn probe(&self, src: &str) -> ProbeFuture {
        let client = self.client.clone();
        let src = src.to_string();
        Box::pin(async move {
            let failed = |reason: String| AvatarProbeError::Failed {
                src: src.clone(),
                reason,
            };

            let response = client
                .get(src.as_str())
                .send()
                .await
                .map_err(|err| failed(err.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(failed(format!("status {}", status)));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if !content_type.starts_with("image/") {
                return Err(failed(format!("content type {:?}", content_type)));
            }

            debug!("Avatar {} is a {}", src, content_type);
            Ok(())
        })
    }
}
