//! Per-file review of a code snapshot.

use crate::chat::{ChatClient, ChatError};
use crate::config::PromptConfig;
use crate::models::{ChatMessage, CodeSnapshot, ReviewReport};

/// Sends each file of a snapshot to the model, one at a time.
///
/// The system prompt and retry budget come from the wrapped [`ChatClient`];
/// only the per-file code prompt lives here.
#[derive(Clone)]
pub struct Reviewer {
    chat: ChatClient,
    code_prompt: String,
}

impl Reviewer {
    pub fn new(chat: ChatClient, prompts: &PromptConfig) -> Self {
        Self {
            chat,
            code_prompt: prompts.code_prompt.clone(),
        }
    }

    /// Review every non-empty file in `snapshot`.
    ///
    /// A file whose retry budget runs out is listed in
    /// [`ReviewReport::failed`] and the review moves on. A transport error
    /// aborts the whole run.
    pub async fn review_snapshot(
        &self,
        repository: &str,
        snapshot: &CodeSnapshot,
    ) -> Result<ReviewReport, ChatError> {
        let mut report = ReviewReport::new(repository);

        for (name, content) in snapshot {
            if content.trim().is_empty() {
                tracing::debug!("skipping empty file {name}");
                continue;
            }

            let mut messages = vec![ChatMessage::user(self.user_prompt(name, content))];
            match self.chat.chat_default(&mut messages).await {
                Ok(review) => {
                    tracing::info!("reviewed {name}");
                    report.reviews.insert(name.clone(), review);
                }
                Err(ChatError::Exhausted { attempts }) => {
                    tracing::error!("no usable review for {name} after {attempts} attempt(s)");
                    report.failed.push(name.clone());
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    fn user_prompt(&self, name: &str, content: &str) -> String {
        format!("{}\n\nFile: {name}\n\n{content}", self.code_prompt)
    }
}
