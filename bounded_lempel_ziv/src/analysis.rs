// Factorization size
// Compressed rate (compressed size and raw size)
// Input name

use std::fmt;
use std::mem;

use crate::Phrase;

pub struct Analysis {
    len: usize,
    c_size: usize,
    r_size: usize,
    name: String,
}

impl Analysis {
    pub fn new<T: AsRef<str>>(phrases: &[Phrase], r_size: usize, name: T) -> Self {
        Analysis {
            len: phrases.len(),
            c_size: phrases.len() * mem::size_of::<Phrase>(),
            r_size,
            name: String::from(name.as_ref()),
        }
    }

    pub fn compressed_rate(&self) -> f64 {
        self.c_size as f64 / self.r_size as f64
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:.4}, {}, {}, {}, {}",
            self.compressed_rate(),
            self.c_size,
            self.r_size,
            self.len,
            self.name
        )
    }
}
