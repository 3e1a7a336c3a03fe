//! Token-metered code generation pipeline.
//!
//! One pass per request: load the profile, gate on the estimated cost, call
//! the gateway, debit the ledger atomically, then best-effort mark the
//! project live. No state survives between calls.

use std::sync::Arc;

use db::models::{profile::Profile, project::Project};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::ai_gateway::{AiGatewayError, CompletionBackend};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("prompt is required")]
    EmptyPrompt,
    #[error("profile not found")]
    ProfileNotFound,
    #[error("insufficient tokens: required {required}, available {available}")]
    InsufficientTokens { required: i64, available: i64 },
    #[error("concurrent debit conflict: required {required}, available {available}")]
    DebitConflict { required: i64, available: i64 },
    #[error("gateway error: {0}")]
    Gateway(#[from] AiGatewayError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What the prompt asks to generate, and which project to mark on success
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub project_id: Option<Uuid>,
}

/// Outcome of the best-effort project write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectWrite {
    /// No project named in the request
    Skipped,
    Updated,
    /// Write failed or matched no owned row; the generation still succeeded
    Failed,
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub code: String,
    pub tokens_used: i64,
    /// Balance after the debit, as returned by the ledger write
    pub remaining_tokens: i64,
    pub project: ProjectWrite,
}

/// Rough cost gate: ~4 characters per token, doubled to reserve budget for
/// the completion as well as the prompt. Heuristic only; the debit uses the
/// provider's reported usage.
pub fn estimate_cost(prompt: &str) -> i64 {
    (prompt.len().div_ceil(4) * 2) as i64
}

/// System instruction for the gateway, flavoured by the account's persona.
pub fn system_instruction(persona: Option<&str>) -> String {
    match persona {
        Some(character) => format!(
            "You are {character}. Respond to code generation requests in character \
             while providing high-quality, production-ready code."
        ),
        None => "You are an expert full-stack developer. Generate clean, \
                 production-ready code based on user requirements."
            .to_string(),
    }
}

/// Service running the generation pipeline
#[derive(Clone)]
pub struct GenerationService {
    pool: SqlitePool,
    backend: Arc<dyn CompletionBackend>,
}

impl GenerationService {
    pub fn new(pool: SqlitePool, backend: Arc<dyn CompletionBackend>) -> Self {
        Self { pool, backend }
    }

    pub async fn generate(
        &self,
        user_id: Uuid,
        request: GenerateRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        if request.prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        let profile = Profile::find_by_id(&self.pool, user_id)
            .await?
            .ok_or(GenerationError::ProfileNotFound)?;

        let estimated = estimate_cost(&request.prompt);
        if profile.token_balance < estimated {
            return Err(GenerationError::InsufficientTokens {
                required: estimated,
                available: profile.token_balance,
            });
        }

        let system = system_instruction(profile.selected_character.as_deref());
        let completion = self.backend.complete(&system, &request.prompt).await?;
        let tokens_used = completion.total_tokens.unwrap_or(estimated);

        // Conditional debit: a concurrent request may have spent the balance
        // between the gate and here. The gateway cost is already sunk, so we
        // surface the conflict rather than writing a negative balance.
        let ledger = match Profile::debit_tokens(&self.pool, user_id, tokens_used).await? {
            Some(ledger) => ledger,
            None => {
                let available = Profile::ledger(&self.pool, user_id)
                    .await?
                    .map(|l| l.token_balance)
                    .unwrap_or(0);
                warn!(
                    user_id = %user_id,
                    tokens_used,
                    available,
                    "debit lost to a concurrent request after the gateway call"
                );
                return Err(GenerationError::DebitConflict {
                    required: tokens_used,
                    available,
                });
            }
        };

        let project = match request.project_id {
            None => ProjectWrite::Skipped,
            Some(project_id) => match Project::mark_live(&self.pool, project_id, user_id).await {
                Ok(1..) => ProjectWrite::Updated,
                Ok(0) => {
                    warn!(
                        user_id = %user_id,
                        project_id = %project_id,
                        "generation succeeded but no owned project matched"
                    );
                    ProjectWrite::Failed
                }
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        project_id = %project_id,
                        error = %e,
                        "generation succeeded but the project update failed"
                    );
                    ProjectWrite::Failed
                }
            },
        };

        info!(
            user_id = %user_id,
            tokens_used,
            remaining = ledger.token_balance,
            "code generation successful"
        );

        Ok(GenerationOutcome {
            code: completion.text,
            tokens_used,
            remaining_tokens: ledger.token_balance,
            project,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_doubles_the_four_char_heuristic() {
        // "hi" is 2 bytes: ceil(2/4) * 2 == 2
        assert_eq!(estimate_cost("hi"), 2);
        assert_eq!(estimate_cost("abcd"), 2);
        assert_eq!(estimate_cost("abcde"), 4);
        assert_eq!(estimate_cost(&"x".repeat(100)), 50);
    }

    #[test]
    fn empty_prompt_estimates_zero() {
        assert_eq!(estimate_cost(""), 0);
    }

    #[test]
    fn system_instruction_uses_the_persona_when_set() {
        let instruction = system_instruction(Some("Megumin"));
        assert!(instruction.starts_with("You are Megumin."));

        let generic = system_instruction(None);
        assert!(generic.contains("expert full-stack developer"));
    }
}
