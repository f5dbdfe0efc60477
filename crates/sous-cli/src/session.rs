use anyhow::Result;
use sous::agent::Agent;
use sous::errors::AgentError;
use sous::models::message::Message;

use crate::prompt::{InputType, Prompt};

/// One interactive chat session. The conversation history is owned here
/// and grows turn by turn for the life of the process; nothing persists
/// across restarts.
pub struct Session<'a> {
    agent: Agent,
    prompt: Box<dyn Prompt + 'a>,
}

impl<'a> Session<'a> {
    pub fn new(agent: Agent, prompt: Box<dyn Prompt + 'a>) -> Self {
        Session { agent, prompt }
    }

    pub async fn start(&mut self) -> Result<()> {
        let mut messages: Vec<Message> = Vec::new();

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Message => {
                    let Some(content) = input.content else {
                        continue;
                    };
                    messages.push(Message::user().with_text(content));
                }
                InputType::Exit => break,
                InputType::AskAgain => continue,
            }

            self.prompt.show_busy();
            let result = self.agent.reply(&messages).await;
            self.prompt.hide_busy();

            match result {
                Ok(reply) => {
                    self.prompt.render(Box::new(reply.clone()));
                    messages.push(reply);
                }
                Err(error @ AgentError::UpstreamUnavailable(_)) => {
                    // Unrecoverable; leave with a non-zero status.
                    self.prompt.render_error(&error.to_string());
                    self.prompt.close();
                    return Err(error.into());
                }
                Err(error) => {
                    // Keep the session alive, dropping the failed turn so
                    // the next one starts from a clean history.
                    self.prompt.render_error(&error.to_string());
                    messages.pop();
                }
            }
        }

        self.prompt.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Input;
    use serde_json::json;
    use sous::models::tool::ToolCall;
    use sous::providers::mock::{MockProvider, UnavailableProvider};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct ScriptedPrompt {
        inputs: VecDeque<Input>,
        rendered: Arc<Mutex<Vec<String>>>,
        errors: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedPrompt {
        fn new(lines: Vec<Option<&str>>) -> (Self, Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
            let inputs = lines
                .into_iter()
                .map(|line| match line {
                    Some(text) => Input {
                        input_type: InputType::Message,
                        content: Some(text.to_string()),
                    },
                    None => Input {
                        input_type: InputType::Exit,
                        content: None,
                    },
                })
                .collect();
            let rendered = Arc::new(Mutex::new(Vec::new()));
            let errors = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    inputs,
                    rendered: rendered.clone(),
                    errors: errors.clone(),
                },
                rendered,
                errors,
            )
        }
    }

    impl Prompt for ScriptedPrompt {
        fn render(&mut self, message: Box<Message>) {
            self.rendered.lock().unwrap().push(message.text());
        }

        fn render_error(&mut self, notice: &str) {
            self.errors.lock().unwrap().push(notice.to_string());
        }

        fn get_input(&mut self) -> Result<Input> {
            Ok(self.inputs.pop_front().unwrap_or(Input {
                input_type: InputType::Exit,
                content: None,
            }))
        }

        fn show_busy(&mut self) {}
        fn hide_busy(&self) {}
        fn close(&self) {}
    }

    #[tokio::test]
    async fn test_exit_before_any_turn_never_calls_the_loop() {
        let provider = MockProvider::new(vec![]);
        let handle = provider.clone();
        let agent = Agent::new(Box::new(provider));
        let (prompt, rendered, _errors) = ScriptedPrompt::new(vec![None]);

        let mut session = Session::new(agent, Box::new(prompt));
        session.start().await.unwrap();

        assert_eq!(handle.call_count(), 0);
        assert!(rendered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_accumulates_across_turns() {
        let provider = MockProvider::new(vec![
            Message::assistant().with_text("Added."),
            Message::assistant().with_text("You have sausages."),
        ]);
        let handle = provider.clone();
        let agent = Agent::new(Box::new(provider));
        let (prompt, rendered, errors) =
            ScriptedPrompt::new(vec![Some("add 2 sausages"), Some("what do I have?"), None]);

        let mut session = Session::new(agent, Box::new(prompt));
        session.start().await.unwrap();

        assert_eq!(
            *rendered.lock().unwrap(),
            vec!["Added.".to_string(), "You have sausages.".to_string()]
        );
        assert!(errors.lock().unwrap().is_empty());

        // The second run saw the whole first turn.
        let seen = handle.seen_messages();
        assert_eq!(seen[1].len(), 3);
        assert_eq!(seen[1][0].text(), "add 2 sausages");
        assert_eq!(seen[1][1].text(), "Added.");
        assert_eq!(seen[1][2].text(), "what do I have?");
    }

    #[tokio::test]
    async fn test_recoverable_failure_keeps_the_session_alive() {
        // No registered system, so the requested tool is unknown and every
        // round asks again; a cap of 1 forces RoundsExhausted.
        let provider = MockProvider::new(vec![
            Message::assistant()
                .with_tool_request("1", Ok(ToolCall::new("pantry_list_items", json!({})))),
            Message::assistant().with_text("Recovered."),
        ]);
        let agent = Agent::new(Box::new(provider)).with_max_tool_rounds(1);
        let (prompt, rendered, errors) =
            ScriptedPrompt::new(vec![Some("list pantry"), Some("try again"), None]);

        let mut session = Session::new(agent, Box::new(prompt));
        session.start().await.unwrap();

        assert_eq!(errors.lock().unwrap().len(), 1);
        assert_eq!(*rendered.lock().unwrap(), vec!["Recovered.".to_string()]);
    }

    #[tokio::test]
    async fn test_upstream_loss_ends_the_session_with_an_error() {
        let agent = Agent::new(Box::new(UnavailableProvider));
        let (prompt, _rendered, errors) = ScriptedPrompt::new(vec![Some("hello"), None]);

        let mut session = Session::new(agent, Box::new(prompt));
        let result = session.start().await;

        assert!(result.is_err());
        assert_eq!(errors.lock().unwrap().len(), 1);
    }
}
