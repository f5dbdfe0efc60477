use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::spinner;
use console::style;
use sous::models::message::{Message, MessageContent};

use super::{thinking::get_random_thinking_message, Input, InputType, Prompt, Theme};

const PROMPT: &str = "\x1b[1m\x1b[38;5;172m( sous )> \x1b[0m";

pub struct RustylinePrompt {
    spinner: cliclack::ProgressBar,
    theme: Theme,
}

impl RustylinePrompt {
    pub fn new() -> Self {
        RustylinePrompt {
            spinner: spinner(),
            theme: Theme::Dark,
        }
    }
}

/// What one line of raw input asks the session to do.
#[derive(Debug, PartialEq)]
enum Interpretation {
    Exit,
    ToggleTheme,
    Help,
    Message(String),
}

fn interpret(line: &str) -> Interpretation {
    let line = line.trim();
    // An empty line ends the session.
    if line.is_empty()
        || line.eq_ignore_ascii_case("/exit")
        || line.eq_ignore_ascii_case("/quit")
    {
        Interpretation::Exit
    } else if line.eq_ignore_ascii_case("/t") {
        Interpretation::ToggleTheme
    } else if line.eq_ignore_ascii_case("/?") || line.eq_ignore_ascii_case("/help") {
        Interpretation::Help
    } else {
        Interpretation::Message(line.to_string())
    }
}

fn print_markdown(content: &str, theme: &str) {
    bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print()
        .unwrap();
}

impl Prompt for RustylinePrompt {
    fn render(&mut self, message: Box<Message>) {
        let theme = match self.theme {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        };

        for message_content in &message.content {
            if let MessageContent::Text(text) = message_content {
                print_markdown(&text.text, theme);
            }
        }

        println!();
        io::stdout().flush().expect("Failed to flush stdout");
    }

    fn render_error(&mut self, notice: &str) {
        println!("{}", style(format!("error: {}", notice)).red());
    }

    fn get_input(&mut self) -> Result<Input> {
        let mut editor = rustyline::DefaultEditor::new()?;
        let line = match editor.readline(PROMPT) {
            Ok(text) => text,
            Err(e) => {
                match e {
                    rustyline::error::ReadlineError::Interrupted => (),
                    rustyline::error::ReadlineError::Eof => (),
                    _ => eprintln!("Input error: {}", e),
                }
                return Ok(Input {
                    input_type: InputType::Exit,
                    content: None,
                });
            }
        };

        match interpret(&line) {
            Interpretation::Exit => Ok(Input {
                input_type: InputType::Exit,
                content: None,
            }),
            Interpretation::ToggleTheme => {
                self.theme = match self.theme {
                    Theme::Light => {
                        println!("Switching to Dark theme");
                        Theme::Dark
                    }
                    Theme::Dark => {
                        println!("Switching to Light theme");
                        Theme::Light
                    }
                };
                Ok(Input {
                    input_type: InputType::AskAgain,
                    content: None,
                })
            }
            Interpretation::Help => {
                println!("Commands:");
                println!("An empty line, /exit or /quit - End the session");
                println!("/t - Toggle Light/Dark theme");
                println!("/? | /help - Display this help message");
                Ok(Input {
                    input_type: InputType::AskAgain,
                    content: None,
                })
            }
            Interpretation::Message(text) => Ok(Input {
                input_type: InputType::Message,
                content: Some(text),
            }),
        }
    }

    fn show_busy(&mut self) {
        self.spinner = spinner();
        self.spinner
            .start(format!("{}...", get_random_thinking_message()));
    }

    fn hide_busy(&self) {
        self.spinner.stop("");
    }

    fn close(&self) {
        // No cleanup required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_line_exits() {
        assert_eq!(interpret(""), Interpretation::Exit);
        assert_eq!(interpret("   "), Interpretation::Exit);
    }

    #[test]
    fn test_exit_commands() {
        assert_eq!(interpret("/exit"), Interpretation::Exit);
        assert_eq!(interpret("/QUIT"), Interpretation::Exit);
    }

    #[test]
    fn test_control_commands() {
        assert_eq!(interpret("/t"), Interpretation::ToggleTheme);
        assert_eq!(interpret("/help"), Interpretation::Help);
        assert_eq!(interpret("/?"), Interpretation::Help);
    }

    #[test]
    fn test_regular_text_is_a_message() {
        assert_eq!(
            interpret("  add 2 sausages  "),
            Interpretation::Message("add 2 sausages".to_string())
        );
    }
}
