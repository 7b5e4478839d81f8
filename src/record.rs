use crate::error::PlotError;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::str::FromStr;

/// Column layout of a bigly pileup line.
pub const HEADER: [&str; 26] = [
    "chrom",
    "pos",
    "depth",
    "refbase",
    "mismatches",
    "pairs",
    "softstarts",
    "softends",
    "hardstarts",
    "hardends",
    "insertstarts",
    "insertends",
    "deletions",
    "splitters",
    "splitters1",
    "mean_insert1",
    "mean_insert2",
    "weird",
    "discordant",
    "discchrom",
    "discchromentropy",
    "gc65",
    "gc257",
    "duplicity65",
    "duplicity257",
    "spl",
];

/// One per-base row of bigly output.
#[derive(Debug, Clone, PartialEq)]
pub struct PileRecord {
    pub chrom: String,
    pub pos: u32,
    pub depth: u32,
    pub refbase: char,
    pub mismatches: u32,
    pub pairs: u32,
    pub softstarts: u32,
    pub softends: u32,
    pub hardstarts: u32,
    pub hardends: u32,
    pub insertstarts: u32,
    pub insertends: u32,
    pub deletions: u32,
    pub splitters: u32,
    pub splitters1: u32,
    pub mean_insert1: i32,
    pub mean_insert2: i32,
    pub weird: u32,
    pub discordant: u32,
    pub discchrom: u32,
    pub discchromentropy: f64,
    pub gc65: u32,
    pub gc257: u32,
    pub duplicity65: f64,
    pub duplicity257: f64,
    /// Splitter detail; empty when bigly ran without splitter verbosity.
    pub spl: String,
}

/// Where a line came from, for error messages.
struct LineContext<'a> {
    path: &'a str,
    line: usize,
}

impl LineContext<'_> {
    fn parse<T: FromStr>(&self, tokens: &[&str], idx: usize) -> Result<T, PlotError> {
        tokens[idx]
            .trim()
            .parse::<T>()
            .map_err(|_| PlotError::InvalidField {
                path: self.path.to_string(),
                line: self.line,
                column: HEADER[idx],
                value: tokens[idx].to_string(),
            })
    }
}

/// Parse one line (without its newline). `line_no` is 1-based.
pub fn parse_line(line: &str, path: &str, line_no: usize) -> Result<PileRecord, PlotError> {
    let tokens: Vec<&str> = line.split('\t').collect();
    // bigly leaves the trailing spl column empty, and some tools strip it
    if tokens.len() != HEADER.len() && tokens.len() != HEADER.len() - 1 {
        return Err(PlotError::FieldCount {
            path: path.to_string(),
            line: line_no,
            found: tokens.len(),
            expected: HEADER.len(),
        });
    }
    let ctx = LineContext { path, line: line_no };

    let refbase = tokens[3].chars().next().ok_or_else(|| PlotError::InvalidField {
        path: path.to_string(),
        line: line_no,
        column: HEADER[3],
        value: String::new(),
    })?;

    Ok(PileRecord {
        chrom: tokens[0].to_string(),
        pos: ctx.parse(&tokens, 1)?,
        depth: ctx.parse(&tokens, 2)?,
        refbase,
        mismatches: ctx.parse(&tokens, 4)?,
        pairs: ctx.parse(&tokens, 5)?,
        softstarts: ctx.parse(&tokens, 6)?,
        softends: ctx.parse(&tokens, 7)?,
        hardstarts: ctx.parse(&tokens, 8)?,
        hardends: ctx.parse(&tokens, 9)?,
        insertstarts: ctx.parse(&tokens, 10)?,
        insertends: ctx.parse(&tokens, 11)?,
        deletions: ctx.parse(&tokens, 12)?,
        splitters: ctx.parse(&tokens, 13)?,
        splitters1: ctx.parse(&tokens, 14)?,
        mean_insert1: ctx.parse(&tokens, 15)?,
        mean_insert2: ctx.parse(&tokens, 16)?,
        weird: ctx.parse(&tokens, 17)?,
        discordant: ctx.parse(&tokens, 18)?,
        discchrom: ctx.parse(&tokens, 19)?,
        discchromentropy: ctx.parse(&tokens, 20)?,
        gc65: ctx.parse(&tokens, 21)?,
        gc257: ctx.parse(&tokens, 22)?,
        duplicity65: ctx.parse(&tokens, 23)?,
        duplicity257: ctx.parse(&tokens, 24)?,
        spl: tokens.get(25).map(|s| s.to_string()).unwrap_or_default(),
    })
}

/// Open a bigly file, decompressing when the name ends in `.gz`.
pub fn open_input(path: &str) -> Result<Box<dyn BufRead>, PlotError> {
    let file = File::open(path).map_err(|source| PlotError::Io {
        path: path.to_string(),
        source,
    })?;
    if path.ends_with(".gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Streams `PileRecord`s out of a bigly file.
pub struct RecordReader {
    path: String,
    lines: std::io::Lines<Box<dyn BufRead>>,
    line_no: usize,
}

impl RecordReader {
    pub fn open(path: &str) -> Result<Self, PlotError> {
        Ok(Self {
            path: path.to_string(),
            lines: open_input(path)?.lines(),
            line_no: 0,
        })
    }
}

impl Iterator for RecordReader {
    type Item = Result<PileRecord, PlotError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(PlotError::Io {
                        path: self.path.clone(),
                        source,
                    }))
                }
            };
            self.line_no += 1;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            if self.line_no == 1 && line.split('\t').nth(1) == Some("pos") {
                continue; // header row
            }
            return Some(parse_line(line, &self.path, self.line_no));
        }
    }
}
