use tracing::{debug, info};

use crate::context::PromptContext;
use crate::error::Error;
use crate::model::{Message, Sampling};
use crate::model_gateway::{ModelGateway, ModelGatewayRequest};

const SYSTEM_PROMPT: &str = "\
You are an experienced endurance coach reviewing an athlete's training data.
Be specific, refer to the numbers you are given, and be honest about what the
data cannot tell you.

Metrics you will see:
- Fitness (CTL): chronic training load, a ~42-day weighted average of daily load.
- Fatigue (ATL): acute training load, a ~7-day weighted average of daily load.
- Form (TSB): fitness minus fatigue. Positive means fresh, negative means fatigued.
- FTP: functional threshold power in watts. LTHR: lactate threshold heart rate.
- Load: per-activity training stress. EF: efficiency factor (output per heartbeat).
- Decoupling: drift between output and heart rate over a session, in percent.
Values marked \"not available\" were not recorded; never treat them as zero.";

const INSTRUCTIONS: &str = "\
Answer the question below using only the training data above. Keep the answer
focused and practical: lead with the direct answer, then the supporting numbers,
then at most three concrete recommendations. If the data is insufficient, say so.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub model: String,
}

pub struct Analyst<'a, G> {
    gateway: &'a G,
    model: String,
}

impl<'a, G: ModelGateway> Analyst<'a, G> {
    pub fn new(gateway: &'a G, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn ask(&self, context: &PromptContext, question: &str) -> Result<Answer, Error> {
        let messages = build_messages(context, question);
        debug!(
            model = %self.model,
            context_chars = context.char_count(),
            question_len = question.len(),
            "dispatching question"
        );

        let response = self
            .gateway
            .chat(ModelGatewayRequest {
                model: self.model.clone(),
                messages,
                sampling: Sampling::for_model(&self.model),
            })
            .await?;
        info!(model = %self.model, answer_len = response.content.len(), "received answer");

        Ok(Answer {
            text: response.content,
            model: self.model.clone(),
        })
    }
}

pub fn build_messages(context: &PromptContext, question: &str) -> Vec<Message> {
    let prompt = format!(
        "{}\n---\n{}\n\nQuestion: {}",
        context.as_str().trim_end(),
        INSTRUCTIONS,
        question.trim()
    );
    vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)]
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::NaiveDate;

    use super::{Analyst, build_messages};
    use crate::context::{ContextBuilder, PromptContext};
    use crate::error::{Error, Service};
    use crate::model::MessageRole;
    use crate::model_gateway::{
        ModelGateway, ModelGatewayFuture, ModelGatewayRequest, ModelGatewayResponse,
    };
    use crate::training::{AthleteProfile, DateWindow, TrainingSnapshot};
    use crate::units::UnitPreferences;

    struct RecordingGateway {
        reply: Result<String, u16>,
        requests: RefCell<Vec<ModelGatewayRequest>>,
    }

    impl RecordingGateway {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn rate_limited() -> Self {
            Self {
                reply: Err(429),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl ModelGateway for RecordingGateway {
        fn chat<'a>(&'a self, request: ModelGatewayRequest) -> ModelGatewayFuture<'a> {
            self.requests.borrow_mut().push(request);
            let reply = self.reply.clone();
            Box::pin(async move {
                match reply {
                    Ok(content) => Ok(ModelGatewayResponse { content }),
                    Err(_) => Err(Error::RateLimited {
                        service: Service::LlmGateway,
                        retry_after: None,
                    }),
                }
            })
        }
    }

    fn context() -> PromptContext {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date");
        let snapshot = TrainingSnapshot {
            profile: AthleteProfile {
                ctl: Some(50.0),
                atl: Some(45.0),
                ..AthleteProfile::default()
            },
            activities: Vec::new(),
            wellness: Vec::new(),
            window: DateWindow::ending_on(today, 7).expect("positive days"),
        };
        ContextBuilder::new(UnitPreferences::default(), 24_000).build(&snapshot, "how am I?")
    }

    #[test]
    fn prompt_orders_context_then_instructions_then_question() {
        let messages = build_messages(&context(), "  Am I ready to race?  ");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.contains("Form (TSB)"));

        let prompt = &messages[1].content;
        let context_at = prompt.find("Form: +5 (fresh)").expect("context present");
        let instructions_at = prompt
            .find("Answer the question below")
            .expect("instructions present");
        let question_at = prompt.find("Question: Am I ready to race?").expect("question present");
        assert!(context_at < instructions_at && instructions_at < question_at);
    }

    #[tokio::test]
    async fn ask_uses_configured_model_and_returns_text_verbatim() {
        let gateway = RecordingGateway::replying("  Take an easy day.\n");
        let analyst = Analyst::new(&gateway, "google/gemini-2.5-flash");

        let answer = analyst
            .ask(&context(), "Should I rest?")
            .await
            .expect("answer should succeed");

        assert_eq!(answer.text, "  Take an easy day.\n");
        assert_eq!(answer.model, "google/gemini-2.5-flash");
        let requests = gateway.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "google/gemini-2.5-flash");
        assert_eq!(requests[0].sampling.temperature, Some(0.7));
    }

    #[tokio::test]
    async fn rate_limit_is_returned_after_a_single_request() {
        let gateway = RecordingGateway::rate_limited();
        let analyst = Analyst::new(&gateway, "deepseek/deepseek-r1");

        let err = analyst
            .ask(&context(), "Should I rest?")
            .await
            .expect_err("429 should surface");

        assert!(matches!(err, Error::RateLimited { .. }), "unexpected error: {err:?}");
        let requests = gateway.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].sampling.temperature, None);
    }
}
