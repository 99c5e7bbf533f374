mod apply_image_filter;
mod auto_refine;
mod feedback;
mod refine_prompt;

pub use apply_image_filter::ApplyImageFilter;
pub use auto_refine::AutoRefine;
pub use feedback::FeedbackService;
pub use refine_prompt::RefinePrompt;

#[cfg(test)]
pub(crate) mod test_support;
