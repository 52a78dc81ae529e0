use std::cell::{Cell, RefCell};
use std::fmt::Display;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use recollector_core::api::{edited_file_name, resolve_asset_url};
use recollector_core::input::EXAMPLE_PROMPTS;
use recollector_core::{
    ChatSession, EditGateway, EmailGateway, Message, ResetOutcome, SessionEvent,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::render::{format_message, unseen};

const HELP: &str = "\
명령어:
  <text>             편집 요청 전송 (줄 끝의 \\ 로 여러 줄 입력)
  /reset             대화 초기화
  /download [path]   편집된 모델 저장
  /email <address>   결과 알림 이메일 등록
  /examples          편집 예시 보기
  /help              도움말
  /quit              종료";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Reset,
    Download(Option<PathBuf>),
    Email(String),
    Examples,
    Help,
    Quit,
}

/// Parses one complete input entry. Anything not starting with `/` is an
/// edit instruction.
pub fn parse_command(input: &str) -> Result<Command, AppError> {
    let trimmed = input.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(Command::Send(input.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "reset" => Ok(Command::Reset),
        "download" => Ok(Command::Download(
            (!arg.is_empty()).then(|| PathBuf::from(arg)),
        )),
        "email" if arg.is_empty() => Err(AppError::Usage { usage: "/email <address>" }),
        "email" => Ok(Command::Email(arg.to_string())),
        "examples" => Ok(Command::Examples),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(AppError::UnknownCommand { name: other.to_string() }),
    }
}

/// Joins lines ending in `\` into one multi-line entry. Returns the entry
/// once a line without the continuation marker arrives.
pub fn push_line(buffer: &mut String, line: &str) -> Option<String> {
    match line.strip_suffix('\\') {
        Some(head) => {
            buffer.push_str(head);
            buffer.push('\n');
            None
        }
        None => {
            buffer.push_str(line);
            Some(std::mem::take(buffer))
        }
    }
}

pub async fn save_model(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| AppError::SaveFailed { path: path.to_path_buf(), source })
}

/// Where the chat loop resolves model links and saves downloads.
#[derive(Debug, Clone)]
pub struct ReplOptions {
    pub base_url: String,
    pub download_dir: PathBuf,
}

/// Drives a chat session from line-oriented input until `/quit` or EOF.
///
/// Transcript entries are written to `out` as the session reports them, so
/// a user turn appears before the busy notice for its request.
pub async fn run<G, R, W>(
    session: &ChatSession<G>,
    options: &ReplOptions,
    input: R,
    out: Rc<RefCell<W>>,
) -> anyhow::Result<()>
where
    G: EditGateway + EmailGateway,
    R: AsyncBufRead + Unpin,
    W: Write + 'static,
{
    let last_shown = Rc::new(Cell::new(None));
    print_new(&out, &session.messages(), &last_shown)?;

    let sink = Rc::clone(&out);
    let shown = Rc::clone(&last_shown);
    let base_url = options.base_url.clone();
    session.subscribe(move |event| {
        let written = match event {
            SessionEvent::TranscriptChanged(messages) => print_new(&sink, messages, &shown),
            SessionEvent::BusyChanged(true) => say(&sink, "처리중..."),
            SessionEvent::ModelUpdated(url) => say(
                &sink,
                format!("모델이 업데이트되었습니다: {}", resolve_asset_url(&base_url, url)),
            ),
            _ => Ok(()),
        };
        if let Err(e) = written {
            warn!("Failed to write to terminal: {e}");
        }
    });

    let mut lines = input.lines();
    let mut buffer = String::new();
    while let Some(line) = lines.next_line().await? {
        let Some(entry) = push_line(&mut buffer, &line) else {
            continue;
        };
        if entry.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&entry) {
            Ok(command) => command,
            Err(e) => {
                say(&out, e)?;
                continue;
            }
        };

        match command {
            Command::Send(text) => {
                session.send_user_message(&text).await;
            }
            Command::Reset => {
                if let ResetOutcome::Ignored = session.reset_session().await {
                    say(&out, "요청 처리 중에는 초기화할 수 없습니다.")?;
                }
            }
            Command::Download(path) => {
                let path = path.unwrap_or_else(|| {
                    options.download_dir.join(edited_file_name(session.task_id()))
                });
                match session.download_edited_model().await {
                    Ok(bytes) => match save_model(&path, &bytes).await {
                        Ok(()) => {
                            info!("Saved {} bytes to {}", bytes.len(), path.display());
                            say(&out, format!("저장됨: {}", path.display()))?;
                        }
                        Err(e) => say(&out, e)?,
                    },
                    Err(e) => {
                        error!("Download failed for task {}: {e}", session.task_id());
                        say(&out, format!("다운로드 실패: {e}"))?;
                    }
                }
            }
            Command::Email(address) => {
                match session.gateway().submit_email(session.task_id(), &address).await {
                    Ok(resp) => say(&out, format!("{} ({})", resp.message, resp.email))?,
                    Err(e) => say(&out, format!("이메일 등록 실패: {e}"))?,
                }
            }
            Command::Examples => {
                for (label, prompt) in EXAMPLE_PROMPTS {
                    say(&out, format!("  {label}: {prompt}"))?;
                }
            }
            Command::Help => say(&out, HELP)?,
            Command::Quit => break,
        }
    }
    Ok(())
}

fn say<W: Write>(out: &RefCell<W>, text: impl Display) -> io::Result<()> {
    writeln!(out.borrow_mut(), "{text}")
}

fn print_new<W: Write>(
    out: &RefCell<W>,
    messages: &[Message],
    last_shown: &Cell<Option<u64>>,
) -> io::Result<()> {
    for msg in unseen(messages, last_shown.get()) {
        say(out, format_message(msg))?;
        last_shown.set(Some(msg.id));
    }
    Ok(())
}
