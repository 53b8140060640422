/// What a key press asks the demo to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reset,
    Quit,
    Unrecognized(char),
}

impl Action {
    pub fn for_key(key: char) -> Self {
        match key {
            'r' => Action::Reset,
            'q' => Action::Quit,
            other => Action::Unrecognized(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_reset_and_quit() {
        assert_eq!(Action::for_key('r'), Action::Reset);
        assert_eq!(Action::for_key('q'), Action::Quit);
    }

    #[test]
    fn keys_are_case_sensitive() {
        assert_eq!(Action::for_key('R'), Action::Unrecognized('R'));
        assert_eq!(Action::for_key(' '), Action::Unrecognized(' '));
    }
}
