//! 터미널 클라이언트 명령 파싱.

use chicfocus_core::models::identity::Identity;

/// 명령 도움말
pub const HELP: &str = "\
commands:
  start <tier 1-3> <task...>   start a chicken
  pause                        pause / resume your timer
  reset                        reset your timer
  end-cycle                    end the current cycle
  challenge start|done|fail    chaos chicken
  market open|close            market view
  status                       scoreboard
  log                          recent activity
  login <luu|4keni>            select user
  logout                       back to user selection
  help                         this text
  quit                         exit";

/// 클라이언트 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 세션 시작 (티어는 원문 그대로 넘겨 검증은 어댑터가 한다)
    Start { tier: String, task: String },
    Pause,
    Reset,
    EndCycle,
    ChallengeStart,
    ChallengeDone { success: bool },
    MarketOpen,
    MarketClose,
    Status,
    Log,
    Login(Identity),
    Logout,
    Help,
    Quit,
}

/// 한 줄을 명령으로 해석. 빈 줄은 `Ok(None)`
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (head.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("start", [tier, task @ ..]) => Command::Start {
            tier: (*tier).to_string(),
            task: task.join(" "),
        },
        ("start", []) => return Err("usage: start <tier 1-3> <task...>".to_string()),
        ("pause" | "resume", []) => Command::Pause,
        ("reset", []) => Command::Reset,
        ("end-cycle", []) => Command::EndCycle,
        ("challenge", ["start"]) => Command::ChallengeStart,
        ("challenge", ["done"]) => Command::ChallengeDone { success: true },
        ("challenge", ["fail"]) => Command::ChallengeDone { success: false },
        ("challenge", _) => return Err("usage: challenge start|done|fail".to_string()),
        ("market", ["open"]) => Command::MarketOpen,
        ("market", ["close"]) => Command::MarketClose,
        ("market", _) => return Err("usage: market open|close".to_string()),
        ("status", []) => Command::Status,
        ("log", []) => Command::Log,
        ("login", [user]) => Command::Login(
            user.parse()
                .map_err(|_| format!("unknown user: {user}"))?,
        ),
        ("login", _) => return Err("usage: login <luu|4keni>".to_string()),
        ("logout", []) => Command::Logout,
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        (other, _) => return Err(format!("unknown command: {other} (try 'help')")),
    };
    Ok(Some(command))
}
