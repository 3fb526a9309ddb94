//! A `ProgramStore` is the fixed-length buffer of integer cells that holds
//! both an Intcode program and the data it operates on.

use failure::Fail;
use itertools::Itertools;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::num::ParseIntError;
use std::path::Path;
use std::str::FromStr;

pub type Word = i64;

#[derive(Debug, Fail)]
pub enum LoadError {
    #[fail(display = "couldn't read program source: {}", _0)]
    Io(#[fail(cause)] io::Error),

    #[fail(display = "program source is empty")]
    Empty,

    #[fail(display = "bad integer {:?} at position {}: {}", token, position, error)]
    BadToken {
        position: usize,
        token: String,
        #[fail(cause)]
        error: ParseIntError,
    },
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> LoadError {
        LoadError::Io(err)
    }
}

#[derive(Clone, Copy, Debug, Eq, Fail, PartialEq)]
#[fail(display = "position {} is out of bounds for a memory of {} cells", index, len)]
pub struct OutOfBounds {
    pub index: usize,
    pub len: usize,
}

/// The live cells of a program, along with a copy of the cells as they were
/// loaded. The two always have the same length.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgramStore {
    cells: Vec<Word>,
    original: Box<[Word]>,
}

impl ProgramStore {
    pub fn from_cells(cells: Vec<Word>) -> Result<ProgramStore, LoadError> {
        if cells.is_empty() {
            return Err(LoadError::Empty);
        }
        let original = cells.clone().into_boxed_slice();
        Ok(ProgramStore { cells, original })
    }

    /// Parse a comma-separated list of integers. Whitespace around each
    /// token, including a trailing newline, is ignored.
    pub fn parse(source: &str) -> Result<ProgramStore, LoadError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(LoadError::Empty);
        }

        let cells = source
            .split(',')
            .enumerate()
            .map(|(position, token)| {
                let token = token.trim();
                Word::from_str(token).map_err(|error| LoadError::BadToken {
                    position,
                    token: token.to_owned(),
                    error,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        ProgramStore::from_cells(cells)
    }

    pub fn from_reader<R: Read>(mut source: R) -> Result<ProgramStore, LoadError> {
        let mut text = String::new();
        source.read_to_string(&mut text)?;
        ProgramStore::parse(&text)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<ProgramStore, LoadError> {
        ProgramStore::from_reader(File::open(path)?)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Word] {
        &self.cells
    }

    /// The cells as they were when this store was loaded.
    pub fn original(&self) -> &[Word] {
        &self.original
    }

    pub fn read(&self, index: usize) -> Result<Word, OutOfBounds> {
        self.cells.get(index).copied().ok_or(OutOfBounds {
            index,
            len: self.len(),
        })
    }

    /// Store `value` at `index`. An out-of-bounds index leaves every cell
    /// untouched.
    pub fn patch(&mut self, index: usize, value: Word) -> Result<(), OutOfBounds> {
        let len = self.len();
        match self.cells.get_mut(index) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(OutOfBounds { index, len }),
        }
    }

    pub fn reset(&mut self) {
        self.cells.copy_from_slice(&self.original);
    }

    /// Interpret `position`, a cell value, as an index into this store.
    pub fn index_of(&self, position: Word) -> Option<usize> {
        if position < 0 || position >= self.len() as Word {
            return None;
        }
        Some(position as usize)
    }

    /// Fetch the cell that `position` refers to, if there is one.
    pub fn get(&self, position: Word) -> Option<Word> {
        self.index_of(position).map(|index| self.cells[index])
    }
}

impl FromStr for ProgramStore {
    type Err = LoadError;
    fn from_str(s: &str) -> Result<ProgramStore, LoadError> {
        ProgramStore::parse(s)
    }
}

impl fmt::Display for ProgramStore {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self.cells.iter().join(","))
    }
}
