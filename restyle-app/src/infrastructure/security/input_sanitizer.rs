use crate::domain::{ImageFilterRequest, RefinementRequest};
use base64::Engine;
use restyle_errors::AppError;

const MAX_PROMPT_LENGTH: usize = 4000;
const MAX_FILTER_NAME_LENGTH: usize = 100;
const MAX_FEEDBACK_LENGTH: usize = 2000;
const IMAGE_MIME_PREFIX: &str = "image/";
const BLOCKED_KEYWORDS: &[&str] = &[
    "ignore previous",
    "ignore all",
    "disregard",
    "forget your",
    "new instructions",
    "system prompt",
    "you are now",
    "pretend to be",
    "jailbreak",
    "developer mode",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ValidImageFilter {
    pub image_base64: String,
    pub mime_type: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidRefinement {
    pub filter_name: String,
    pub original_prompt: String,
    pub thumbs_up: u32,
    pub thumbs_down: u32,
    pub feedback_context: Option<String>,
}

pub struct InputSanitizer;

impl InputSanitizer {
    pub fn validate_image_filter(request: ImageFilterRequest) -> Result<ValidImageFilter, AppError> {
        let image = required("imageBase64", request.image_base64)?;
        let mime_type = required("mimeType", request.mime_type)?;
        let prompt = required("prompt", request.prompt)?;

        let mime_type = mime_type.trim().to_lowercase();
        if !mime_type.starts_with(IMAGE_MIME_PREFIX) {
            return Err(AppError::Validation(format!(
                "mimeType must start with \"{IMAGE_MIME_PREFIX}\", got \"{mime_type}\""
            )));
        }

        let image_base64 = strip_data_url(image.trim()).to_string();
        base64::engine::general_purpose::STANDARD
            .decode(&image_base64)
            .map_err(|_| AppError::Validation("imageBase64 is not valid base64".to_string()))?;

        if prompt.chars().count() > MAX_PROMPT_LENGTH {
            return Err(AppError::Validation(format!(
                "prompt must be at most {MAX_PROMPT_LENGTH} characters"
            )));
        }

        Ok(ValidImageFilter {
            image_base64,
            mime_type,
            prompt,
        })
    }

    pub fn validate_refinement(request: RefinementRequest) -> Result<ValidRefinement, AppError> {
        let filter_name = Self::validate_filter_name(&required("filterName", request.filter_name)?)?;
        let original_prompt = required("originalPrompt", request.original_prompt)?;

        Ok(ValidRefinement {
            filter_name,
            original_prompt,
            thumbs_up: request.thumbs_up_count.unwrap_or(0),
            thumbs_down: request.thumbs_down_count.unwrap_or(0),
            feedback_context: request
                .feedback_context
                .map(|f| Self::sanitize_feedback(&f))
                .filter(|f| !f.trim().is_empty()),
        })
    }

    pub fn validate_filter_name(name: &str) -> Result<String, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("filterName must not be empty".to_string()));
        }
        if name.chars().count() > MAX_FILTER_NAME_LENGTH {
            return Err(AppError::Validation(format!(
                "filterName must be at most {MAX_FILTER_NAME_LENGTH} characters"
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(AppError::Validation(
                "filterName contains invalid characters".to_string(),
            ));
        }
        Ok(name.to_string())
    }

    /// Free-text user feedback is spliced into a model prompt, so known
    /// injection phrases are masked.
    pub fn sanitize_feedback(content: &str) -> String {
        let mut sanitized = content.to_string();

        for keyword in BLOCKED_KEYWORDS {
            if let Ok(re) = regex_lite::Regex::new(&format!("(?i){}", regex_lite::escape(keyword))) {
                sanitized = re.replace_all(&sanitized, "[FILTERED]").to_string();
            }
        }

        sanitized
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .take(MAX_FEEDBACK_LENGTH)
            .collect()
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(AppError::Validation(format!("{field} must not be empty"))),
        None => Err(AppError::Validation(format!("{field} is required"))),
    }
}

fn strip_data_url(image: &str) -> &str {
    match image.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => image,
    }
}
