use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub(crate) fn is_back(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Esc)
}

pub(crate) fn is_confirm(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter)
}

pub(crate) fn is_up(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Up | KeyCode::Char('k'))
}

pub(crate) fn is_down(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Down | KeyCode::Char('j'))
}

pub(crate) fn is_toggle(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char(' '))
}

pub(crate) fn is_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q'))
}

pub(crate) fn is_open(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter | KeyCode::Right | KeyCode::Char('l'))
}

pub(crate) fn is_parent(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h'))
}

pub(crate) fn is_range_up(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::SHIFT)
        && matches!(key.code, KeyCode::Up | KeyCode::Char('K'))
}

pub(crate) fn is_range_down(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::SHIFT)
        && matches!(key.code, KeyCode::Down | KeyCode::Char('J'))
}

pub(crate) fn is_rename(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::F(2) | KeyCode::Char('r'))
}

pub(crate) fn is_delete(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Delete | KeyCode::Char('D'))
}

pub(crate) fn is_ctrl(key: KeyEvent, letter: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(letter)
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shifted(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::SHIFT)
    }

    #[test]
    fn up_and_down_keys_match_arrows_and_vim() {
        assert!(is_up(key(KeyCode::Up)));
        assert!(is_up(key(KeyCode::Char('k'))));
        assert!(!is_up(key(KeyCode::Char('j'))));
        assert!(is_down(key(KeyCode::Down)));
        assert!(is_down(key(KeyCode::Char('j'))));
    }

    #[test]
    fn range_keys_need_shift() {
        assert!(is_range_up(shifted(KeyCode::Up)));
        assert!(is_range_down(shifted(KeyCode::Char('J'))));
        assert!(!is_range_down(key(KeyCode::Down)));
    }

    #[test]
    fn open_and_parent_cover_arrows_and_vim() {
        assert!(is_open(key(KeyCode::Enter)));
        assert!(is_open(key(KeyCode::Char('l'))));
        assert!(is_parent(key(KeyCode::Backspace)));
        assert!(is_parent(key(KeyCode::Left)));
        assert!(!is_parent(key(KeyCode::Right)));
    }

    #[test]
    fn edit_keys_match_contract() {
        assert!(is_rename(key(KeyCode::F(2))));
        assert!(is_delete(key(KeyCode::Delete)));
        assert!(!is_delete(key(KeyCode::Char('d'))));
        assert!(is_toggle(key(KeyCode::Char(' '))));
        assert!(is_quit(key(KeyCode::Char('q'))));
        assert!(is_back(key(KeyCode::Esc)));
        assert!(is_confirm(key(KeyCode::Enter)));
        assert!(is_ctrl(
            KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL),
            'x'
        ));
        assert!(!is_ctrl(key(KeyCode::Char('x')), 'x'));
    }
}
