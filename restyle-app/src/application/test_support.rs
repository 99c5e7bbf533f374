use crate::infrastructure::gemini::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerativeModel, Part,
};
use async_trait::async_trait;
use restyle_errors::AppError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Canned `generateContent` answers that remember what they were asked.
pub(crate) struct StubModel {
    response: GenerateContentResponse,
    calls: AtomicUsize,
    last: Mutex<Option<(String, GenerateContentRequest)>>,
}

impl StubModel {
    pub(crate) fn new(response: GenerateContentResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    fn with_parts(parts: Vec<Part>) -> Self {
        Self::new(GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content { role: None, parts }),
                finish_reason: Some("STOP".to_string()),
            }],
            prompt_feedback: None,
        })
    }

    pub(crate) fn with_image(data: &str) -> Self {
        Self::with_parts(vec![Part::inline("image/png", data)])
    }

    pub(crate) fn with_text(text: &str) -> Self {
        Self::with_parts(vec![Part::text(text)])
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_model(&self) -> Option<String> {
        self.last.lock().unwrap().as_ref().map(|(model, _)| model.clone())
    }

    pub(crate) fn last_prompt(&self) -> Option<String> {
        self.last.lock().unwrap().as_ref().map(|(_, request)| {
            request
                .contents
                .iter()
                .flat_map(|c| c.parts.iter())
                .filter_map(|p| p.text.clone())
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}

#[async_trait]
impl GenerativeModel for StubModel {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((model.to_string(), request.clone()));
        Ok(self.response.clone())
    }
}
