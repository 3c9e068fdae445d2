use std::collections::BTreeMap;
use std::io;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

/// What a key press asks the game to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    TurnLeft,
    TurnRight,
    Shoot,
    Quit,
}

/// Key bindings. Anything unbound is ignored.
pub fn command_for(key_event: &KeyEvent) -> Option<Command> {
    if key_event.kind == KeyEventKind::Release {
        return None;
    }
    match key_event.code {
        KeyCode::Left => Some(Command::TurnLeft),
        KeyCode::Right => Some(Command::TurnRight),
        KeyCode::Char('s') => Some(Command::Shoot),
        KeyCode::Char('q') => Some(Command::Quit),
        _ => None,
    }
}

// --- SimulatedInput for headless runs ---

/// Scripted events keyed by the virtual time (ms) at which they are delivered.
pub struct SimulatedInput {
    events: BTreeMap<u64, Vec<Event>>,
    current_time: u64,
}

impl SimulatedInput {
    pub fn new(events: BTreeMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events, current_time: 0 }
    }

    /// A short demo: aim around, fire a few volleys, then quit.
    pub fn demo_script(quit_at: u64) -> Self {
        let mut events: BTreeMap<u64, Vec<Event>> = BTreeMap::new();
        let key = |code: KeyCode| Event::Key(code.into());
        let mut heading_presses = 0;
        let mut time = 1500;
        while time < quit_at {
            // Swing the cannon back and forth through 60 degrees, firing after each turn.
            let code = if (heading_presses / 6) % 2 == 0 { KeyCode::Left } else { KeyCode::Right };
            events.entry(time).or_default().push(key(code));
            events.entry(time + 100).or_default().push(key(KeyCode::Char('s')));
            heading_presses += 1;
            time += 400;
        }
        events.entry(quit_at).or_default().push(key(KeyCode::Char('q')));
        SimulatedInput::new(events)
    }

    pub fn poll(&mut self, now: u64) -> io::Result<bool> {
        self.current_time = now;
        Ok(self.events.range(..=now).next().is_some())
    }

    pub fn read(&mut self) -> io::Result<Event> {
        let due = self.events.range(..=self.current_time).next().map(|(&time, _)| time);
        if let Some(time) = due {
            if let Some(queue) = self.events.get_mut(&time) {
                if !queue.is_empty() {
                    let event = queue.remove(0);
                    if queue.is_empty() {
                        self.events.remove(&time);
                    }
                    return Ok(event);
                }
            }
            self.events.remove(&time);
        }
        Ok(Event::Key(KeyCode::Null.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn bindings_cover_the_four_keys() {
        assert_eq!(command_for(&KeyCode::Left.into()), Some(Command::TurnLeft));
        assert_eq!(command_for(&KeyCode::Right.into()), Some(Command::TurnRight));
        assert_eq!(command_for(&KeyCode::Char('s').into()), Some(Command::Shoot));
        assert_eq!(command_for(&KeyCode::Char('q').into()), Some(Command::Quit));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(command_for(&KeyCode::Up.into()), None);
        assert_eq!(command_for(&KeyCode::Char(' ').into()), None);
        assert_eq!(command_for(&KeyCode::Char('S').into()), None);

        let release = KeyEvent::new_with_kind(KeyCode::Char('s'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(command_for(&release), None);
    }

    #[test]
    fn simulated_input_delivers_events_once_due() {
        let mut events = BTreeMap::new();
        events.insert(100, vec![Event::Key(KeyCode::Left.into()), Event::Key(KeyCode::Char('s').into())]);
        let mut input = SimulatedInput::new(events);

        assert!(!input.poll(99).unwrap());
        assert!(input.poll(150).unwrap());
        assert_eq!(input.read().unwrap(), Event::Key(KeyCode::Left.into()));
        assert!(input.poll(150).unwrap());
        assert_eq!(input.read().unwrap(), Event::Key(KeyCode::Char('s').into()));
        assert!(!input.poll(150).unwrap());
    }

    #[test]
    fn demo_script_ends_with_quit() {
        let mut input = SimulatedInput::demo_script(3000);
        let mut last = None;
        while input.poll(3000).unwrap() {
            last = Some(input.read().unwrap());
        }
        assert_eq!(last, Some(Event::Key(KeyCode::Char('q').into())));
    }
}
