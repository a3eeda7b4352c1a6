use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

#[derive(Debug)]
struct Word {
    start: usize,
    value: String,
}

/// Cursor over the argument tail of a command invocation.
///
/// Words are split on whitespace; a word opened with `"` runs until the
/// closing quote (or the end of input) and may contain spaces. Clones share
/// the cursor position.
#[derive(Debug, Clone)]
pub struct Words {
    input: Arc<str>,
    values: Arc<[Word]>,
    pos: Arc<AtomicUsize>,
}

impl Words {
    pub fn new(input: &str) -> Self {
        Self {
            input: Arc::from(input),
            values: split(input).into(),
            pos: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn next(&self) -> Option<String> {
        let pos = self.advance();
        let value = self.values.get(pos).map(|word| word.value.clone());

        if value.is_none() {
            self.undo();
        }

        value
    }

    pub fn current(&self) -> Option<String> {
        self.values
            .get(self.current_position())
            .map(|word| word.value.clone())
    }

    /// Consumes the remaining words.
    pub fn rest(&self) -> Vec<String> {
        self.values
            .iter()
            .skip(self.advance_to_end())
            .map(|word| word.value.clone())
            .collect()
    }

    /// Consumes the remaining input verbatim, keeping inner spacing and quotes.
    pub fn rest_raw(&self) -> String {
        let pos = self.advance_to_end();

        match self.values.get(pos) {
            Some(word) => self.input[word.start..].trim_end().to_string(),
            None => String::new(),
        }
    }

    /// The whole argument tail, regardless of the cursor.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_position() >= self.values.len()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn current_position(&self) -> usize {
        self.pos.load(Ordering::SeqCst)
    }

    pub fn advance(&self) -> usize {
        self.pos.fetch_add(1, Ordering::SeqCst)
    }

    pub fn undo(&self) -> usize {
        self.pos.fetch_sub(1, Ordering::SeqCst)
    }

    pub fn advance_to_end(&self) -> usize {
        self.pos.swap(self.values.len(), Ordering::SeqCst)
    }
}

fn split(input: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let mut value = String::new();

        if ch == '"' {
            chars.next();

            for (_, ch) in chars.by_ref() {
                if ch == '"' {
                    break;
                }

                value.push(ch);
            }
        } else {
            while let Some(&(_, ch)) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }

                value.push(ch);
                chars.next();
            }
        }

        words.push(Word { start, value });
    }

    words
}
