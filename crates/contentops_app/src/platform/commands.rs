use chrono::{DateTime, Utc};
use contentops_core::{JobRequest, Msg};

pub const HELP: &str = "\
commands:
  post <headline> [source-url]   generate a social post
  blog <topic> [#keyword ...]    generate a blog article
  delete <job-id>                delete a job
  refresh                        poll now
  help                           show this text
  quit                           stop polling and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Post {
        headline: String,
        source_url: Option<String>,
    },
    Blog {
        topic: String,
        keywords: Vec<String>,
    },
    Delete(String),
    Refresh,
    Help,
    Quit,
}

impl Command {
    /// Message for the core, if the command has one.
    pub fn into_msg(self, now: DateTime<Utc>) -> Option<Msg> {
        match self {
            Command::Post {
                headline,
                source_url,
            } => Some(Msg::JobRequested {
                request: JobRequest::GeneratePost {
                    headline,
                    source_url,
                },
                requested_at: now,
            }),
            Command::Blog { topic, keywords } => Some(Msg::JobRequested {
                request: JobRequest::GenerateBlog { topic, keywords },
                requested_at: now,
            }),
            Command::Delete(id) => Some(Msg::DeleteClicked { id }),
            Command::Refresh => Some(Msg::RefreshClicked),
            Command::Help | Command::Quit => None,
        }
    }
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "post" => {
            let mut words: Vec<&str> = rest.split_whitespace().collect();
            let source_url = match words.last() {
                Some(last) if last.starts_with("http://") || last.starts_with("https://") => {
                    words.pop().map(str::to_string)
                }
                _ => None,
            };
            let headline = words.join(" ");
            if headline.is_empty() {
                return Err("post needs a headline".to_string());
            }
            Command::Post {
                headline,
                source_url,
            }
        }
        "blog" => {
            let (keywords, words): (Vec<&str>, Vec<&str>) =
                rest.split_whitespace().partition(|word| word.starts_with('#'));
            let topic = words.join(" ");
            if topic.is_empty() {
                return Err("blog needs a topic".to_string());
            }
            Command::Blog {
                topic,
                keywords: keywords
                    .iter()
                    .map(|word| word.trim_start_matches('#'))
                    .filter(|word| !word.is_empty())
                    .map(str::to_string)
                    .collect(),
            }
        }
        "delete" | "rm" => {
            if rest.is_empty() || rest.contains(char::is_whitespace) {
                return Err("delete needs exactly one job id".to_string());
            }
            Command::Delete(rest.to_string())
        }
        "refresh" => Command::Refresh,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command {other:?}; type help")),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_takes_trailing_url_as_source() {
        assert_eq!(
            parse_command("post  Launch day is here https://news.example.com/a ").unwrap(),
            Some(Command::Post {
                headline: "Launch day is here".into(),
                source_url: Some("https://news.example.com/a".into()),
            })
        );
        assert!(parse_command("post https://only.example.com").is_err());
    }

    #[test]
    fn blog_splits_keywords() {
        assert_eq!(
            parse_command("BLOG Rust in production #rust #ops #").unwrap(),
            Some(Command::Blog {
                topic: "Rust in production".into(),
                keywords: vec!["rust".into(), "ops".into()],
            })
        );
    }

    #[test]
    fn delete_requires_single_id() {
        assert_eq!(parse_command("delete 42").unwrap(), Some(Command::Delete("42".into())));
        assert!(parse_command("delete").is_err());
        assert!(parse_command("delete 1 2").is_err());
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("publish now").is_err());
        assert_eq!(parse_command("quit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn commands_map_to_messages() {
        let now = Utc::now();
        assert_eq!(Command::Refresh.into_msg(now), Some(Msg::RefreshClicked));
        assert_eq!(Command::Quit.into_msg(now), None);
        assert!(matches!(
            Command::Delete("7".into()).into_msg(now),
            Some(Msg::DeleteClicked { id }) if id == "7"
        ));
    }
}
