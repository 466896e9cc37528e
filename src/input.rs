/// Discrete command delivered by the remote. "No input" is `None` at the
/// call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Select,
    Home,
    A,
    B,
    C,
    /// Repeat of the last non-empty command.
    Held,
}

pub trait InputSource {
    /// Non-blocking; returns `None` immediately when nothing is pending.
    fn poll_command(&mut self) -> Option<Command>;
}

/// A command with `Held` already expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub command: Command,
    pub repeated: bool,
}

#[derive(Debug, Default)]
pub struct HeldResolver {
    last: Option<Command>,
}

impl HeldResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, input: Option<Command>) -> Option<Resolved> {
        match input? {
            Command::Held => self.last.map(|command| Resolved {
                command,
                repeated: true,
            }),
            command => {
                self.last = Some(command);
                Some(Resolved {
                    command,
                    repeated: false,
                })
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
