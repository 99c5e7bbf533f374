use crate::application::{ApplyImageFilter, AutoRefine, FeedbackService, RefinePrompt};
use crate::config::AppConfig;
use crate::infrastructure::db::{self, SeaOrmVoteStore};
use crate::infrastructure::gemini::{GeminiClient, GenerativeModel};
use crate::infrastructure::memory::InMemoryVoteStore;
use crate::infrastructure::security::RateLimiter;
use crate::infrastructure::VoteStore;
use restyle_errors::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub apply_image_filter: Arc<ApplyImageFilter>,
    pub refine_prompt: Arc<RefinePrompt>,
    pub feedback: Arc<FeedbackService>,
    pub auto_refine: Arc<AutoRefine>,
    pub rate_limiter: RateLimiter,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn VoteStore>,
        model: Option<Arc<dyn GenerativeModel>>,
    ) -> Self {
        let feedback = Arc::new(FeedbackService::new(store, config.refinement));
        let refine_prompt = Arc::new(RefinePrompt::new(model.clone(), config.text_model.clone()));

        Self {
            apply_image_filter: Arc::new(ApplyImageFilter::new(model, config.image_model.clone())),
            auto_refine: Arc::new(AutoRefine::new(feedback.clone(), refine_prompt.clone())),
            refine_prompt,
            feedback,
            rate_limiter: RateLimiter::new(config.rate_limit_per_minute, config.rate_limit_per_hour),
            config: Arc::new(config),
        }
    }

    /// Wires the Gemini client and the vote store named by `config`, running
    /// migrations when a database is configured.
    pub async fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let model: Option<Arc<dyn GenerativeModel>> = config.gemini_api_key.as_ref().map(|key| {
            Arc::new(GeminiClient::new(config.gemini_base_url.clone(), key.clone()))
                as Arc<dyn GenerativeModel>
        });

        let store: Arc<dyn VoteStore> = match &config.database_url {
            Some(url) => {
                let conn = db::create_connection(url)
                    .await
                    .map_err(|e| AppError::Storage(format!("database connection failed: {e}")))?;
                db::run_migrations(&conn)
                    .await
                    .map_err(|e| AppError::Storage(format!("migrations failed: {e}")))?;
                tracing::info!("Using Postgres vote store");
                Arc::new(SeaOrmVoteStore::new(conn))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, votes are kept in memory only");
                Arc::new(InMemoryVoteStore::new())
            }
        };

        tracing::info!(
            vote_threshold = config.refinement.vote_threshold,
            negative_ratio = config.refinement.negative_ratio_threshold,
            "Refinement policy loaded"
        );

        Ok(Self::new(config, store, model))
    }
}
