use crossterm::event::KeyCode;

/// Single-line editor. `cursor` counts chars, not bytes.
#[derive(Debug, Clone)]
pub(crate) struct TextInput {
    pub(crate) value: String,
    pub(crate) cursor: usize,
}

impl TextInput {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        let v = value.into();
        Self {
            cursor: v.chars().count(),
            value: v,
        }
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub(crate) fn at_end(&self) -> bool {
        self.cursor >= self.len()
    }

    pub(crate) fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.len();
    }

    /// Apply a key. Returns true when the value changed.
    pub(crate) fn handle_key(&mut self, code: KeyCode, accept: impl Fn(char) -> bool) -> bool {
        match code {
            KeyCode::Char(c) if accept(c) => {
                let idx = self.byte_index(self.cursor);
                self.value.insert(idx, c);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let idx = self.byte_index(self.cursor);
                    self.value.remove(idx);
                    return true;
                }
                false
            }
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    let idx = self.byte_index(self.cursor);
                    self.value.remove(idx);
                    return true;
                }
                false
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.len());
                false
            }
            KeyCode::Home => {
                self.cursor = 0;
                false
            }
            KeyCode::End => {
                self.cursor = self.len();
                false
            }
            _ => false,
        }
    }
}
