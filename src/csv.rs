//! Utilities for working with CSV files.
//!
//! Cells are comma-separated with no quoting; surrounding whitespace is trimmed on read.

use std::borrow::Cow;
use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::ops::Index;
use std::path::Path;

use rustc_hash::FxHashMap;

pub struct CsvWriter {
    writer: BufWriter<File>,
}
impl CsvWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    pub fn append<R>(&mut self, record: R) -> Result<(), io::Error>
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut first = true;
        for datum in record.into_iter() {
            if first {
                first = false;
            } else {
                self.writer.write_all(",".as_bytes())?;
            }
            let str: &str = datum.as_ref();
            self.writer.write_all(str.as_bytes())?;
        }
        self.writer.write_all("\n".as_bytes())?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), io::Error> {
        self.writer.flush()
    }
}

pub struct CsvReader {
    lines: Lines<BufReader<File>>,
    line_number: usize,
}
impl CsvReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::open(path)?;
        let lines = BufReader::new(file).lines();
        Ok(Self {
            lines,
            line_number: 0,
        })
    }

    /// 1-based number of the line most recently read.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next non-blank line.
    pub fn read(&mut self) -> Option<Result<Vec<String>, io::Error>> {
        loop {
            let line = self.lines.next()?;
            self.line_number += 1;
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some(Ok(split(&line))),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl Iterator for CsvReader {
    type Item = Result<Vec<String>, io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read()
    }
}

fn split(line: &str) -> Vec<String> {
    line.trim_start_matches('\u{feff}')
        .split(',')
        .map(|cell| cell.trim().to_string())
        .collect()
}

/// Maps column names from a header row to their ordinals. Lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct Header {
    ordinals: FxHashMap<String, usize>,
}
impl Header {
    pub fn new(names: &[String]) -> Self {
        let ordinals = names
            .iter()
            .enumerate()
            .map(|(ordinal, name)| (name.to_lowercase(), ordinal))
            .collect();
        Self { ordinals }
    }

    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.ordinals.get(&name.to_lowercase()).copied()
    }

    /// The cell under column `name`, if both the column and the cell are present and the cell
    /// is not blank.
    pub fn cell<'a>(&self, row: &'a [String], name: &str) -> Option<&'a str> {
        self.ordinal(name)
            .and_then(|ordinal| row.get(ordinal))
            .map(String::as_str)
            .filter(|cell| !cell.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    items: Vec<Cow<'static, str>>,
}
impl Record {
    pub fn with_values<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        let items = values
            .into_iter()
            .map(|value| Cow::Owned(value.to_string()))
            .collect();
        Self { items }
    }

    pub fn push(&mut self, value: impl ToString) {
        self.items.push(Cow::Owned(value.to_string()));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for Record {
    type Item = Cow<'static, str>;
    type IntoIter = std::vec::IntoIter<Cow<'static, str>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl Index<usize> for Record {
    type Output = Cow<'static, str>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}
