use std::str::FromStr;

/// One line of input on the interactive control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Call,
    End,
    Status,
    Help,
    Quit,
}

impl Command {
    pub const HELP: &'static str = "\
Commands:
  start   acquire camera/microphone and show the local preview
  call    connect the local and remote peers
  end     hang up and release the devices
  status  show call status and enabled controls
  help    show this text
  quit    end any call and exit";
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "call" => Ok(Self::Call),
            "end" | "hangup" => Ok(Self::End),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("Unknown command '{other}' (try 'help')")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!("start".parse(), Ok(Command::Start));
        assert_eq!("  CALL \n".parse(), Ok(Command::Call));
        assert_eq!("hangup".parse(), Ok(Command::End));
        assert_eq!("exit".parse(), Ok(Command::Quit));
        assert!("dial".parse::<Command>().unwrap_err().contains("'dial'"));
    }
}
