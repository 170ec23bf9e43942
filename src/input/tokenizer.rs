use std::ops::Index;

/// Words of one input line. Index 0 is the command name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    words: Vec<String>,
}

/// Splits on whitespace. No quoting, no escapes.
pub fn tokenize(line: &str) -> Tokens {
    Tokens {
        words: line.split_whitespace().map(String::from).collect(),
    }
}

impl Tokens {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn command(&self) -> Option<&str> {
        self.get(0)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }
}

impl Index<usize> for Tokens {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.words[index]
    }
}
