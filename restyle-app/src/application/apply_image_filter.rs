use crate::domain::ImageFilterRequest;
use crate::infrastructure::gemini::{GenerateContentRequest, GenerativeModel};
use crate::infrastructure::security::InputSanitizer;
use restyle_errors::AppError;
use std::sync::Arc;

/// Restyles one image with the image model. `model` is `None` when the
/// server has no API key.
pub struct ApplyImageFilter {
    model: Option<Arc<dyn GenerativeModel>>,
    model_name: String,
}

impl ApplyImageFilter {
    pub fn new(model: Option<Arc<dyn GenerativeModel>>, model_name: String) -> Self {
        Self { model, model_name }
    }

    /// Returns the generated image, base64-encoded.
    pub async fn execute(&self, request: ImageFilterRequest) -> Result<String, AppError> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| AppError::Configuration("GEMINI_API_KEY is not set".to_string()))?;

        let input = InputSanitizer::validate_image_filter(request)?;
        let request =
            GenerateContentRequest::image_edit(input.image_base64, input.mime_type, input.prompt);

        let response = model.generate_content(&self.model_name, &request).await?;

        match response.first_inline_image() {
            Some(image) => Ok(image.data.clone()),
            None => {
                let reason = response.stop_reason();
                tracing::warn!(
                    reason = reason.as_deref().unwrap_or("unknown"),
                    text = %response.text(),
                    "Model returned no image"
                );
                Err(AppError::NoImageProduced { reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::StubModel;
    use crate::infrastructure::gemini::GenerateContentResponse;

    fn request(mime: &str) -> ImageFilterRequest {
        ImageFilterRequest {
            image_base64: Some("iVBORw0KGgo=".to_string()),
            mime_type: Some(mime.to_string()),
            prompt: Some("Make it look like a 1970s polaroid".to_string()),
        }
    }

    #[tokio::test]
    async fn test_returns_inline_image() {
        let stub = Arc::new(StubModel::with_image("R0lGODlhAQABAAAAACw="));
        let use_case = ApplyImageFilter::new(Some(stub.clone()), "image-model".to_string());

        let image = use_case.execute(request("image/png")).await.unwrap();

        assert_eq!(image, "R0lGODlhAQABAAAAACw=");
        assert_eq!(stub.calls(), 1);
        assert_eq!(stub.last_model().as_deref(), Some("image-model"));
    }

    #[tokio::test]
    async fn test_rejects_non_image_before_calling_model() {
        let stub = Arc::new(StubModel::with_image("R0lGODlhAQABAAAAACw="));
        let use_case = ApplyImageFilter::new(Some(stub.clone()), "image-model".to_string());

        let err = use_case.execute(request("text/plain")).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_image_carries_finish_reason() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "I can't edit this photo."}]},
                "finishReason": "IMAGE_SAFETY"
            }]
        }))
        .unwrap();
        let use_case = ApplyImageFilter::new(
            Some(Arc::new(StubModel::new(response))),
            "image-model".to_string(),
        );

        let err = use_case.execute(request("image/jpeg")).await.unwrap_err();

        assert_eq!(
            err,
            AppError::NoImageProduced {
                reason: Some("IMAGE_SAFETY".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let use_case = ApplyImageFilter::new(None, "image-model".to_string());
        let err = use_case.execute(request("image/png")).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
