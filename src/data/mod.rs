//! Reader for case files.
//!
//! A file holds any number of cases, each laid out as:
//!
//! ```text
//! <airport count> <max service radius km>
//! <longitude> <latitude> ["name" ...]      (one line per airport)
//! <query count>
//! <from> <to> <plane range km>             (one line per query)
//! ```
//!
//! `from` and `to` are 1-based airport indices or quoted airport names.
//! Whitespace between tokens is free except that an airport's names must
//! share its coordinate line.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::graph::NodeId;
use crate::route::place::AirportSpec;
use crate::route::RouteGraph;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("no airport matches {0}")]
    UnknownAirport(AirportRef),
}

/// How a query names an airport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AirportRef {
    /// 1-based position in the case's airport list.
    Index(usize),
    Name(String),
}

impl AirportRef {
    pub fn resolve(&self, graph: &RouteGraph) -> Result<NodeId, DataError> {
        let found = match self {
            AirportRef::Index(i) => graph.airport_by_index(*i),
            AirportRef::Name(name) => graph.airport_by_name(name),
        };
        found.ok_or_else(|| DataError::UnknownAirport(self.clone()))
    }
}

impl fmt::Display for AirportRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AirportRef::Index(i) => write!(f, "airport #{i}"),
            AirportRef::Name(name) => write!(f, "{name:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub from: AirportRef,
    pub to: AirportRef,
    pub plane_range: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub max_radius_km: f64,
    /// As listed; unnamed airports are named when the graph is built.
    pub airports: Vec<AirportSpec>,
    pub queries: Vec<QuerySpec>,
}

#[derive(Clone, Debug, PartialEq)]
struct Token {
    text: String,
    quoted: bool,
    line: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, DataError> {
    let mut tokens = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let mut chars = raw.chars().peekable();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
            } else if c == '"' {
                chars.next();
                tokens.push(Token {
                    text: read_quoted(&mut chars, line)?,
                    quoted: true,
                    line,
                });
            } else {
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '"' {
                        break;
                    }
                    text.push(c);
                    chars.next();
                }
                tokens.push(Token {
                    text,
                    quoted: false,
                    line,
                });
            }
        }
    }
    Ok(tokens)
}

fn read_quoted<I>(chars: &mut I, line: usize) -> Result<String, DataError>
where
    I: Iterator<Item = char>,
{
    let mut text = String::new();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Ok(text),
            '\\' => match chars.next() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some(other) => text.push(other),
                None => break,
            },
            _ => text.push(c),
        }
    }
    Err(DataError::Parse {
        line,
        message: "unterminated quoted name".into(),
    })
}

struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map_or(1, |t| t.line)
    }

    /// Line of the most recently consumed token.
    fn line(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(1, |t| t.line)
    }

    fn take(&mut self, what: &str) -> Result<&Token, DataError> {
        let line = self.last_line();
        let token = self.tokens.get(self.pos).ok_or_else(|| DataError::Parse {
            line,
            message: format!("unexpected end of input, expected {what}"),
        })?;
        self.pos += 1;
        Ok(token)
    }

    fn bare<T: std::str::FromStr>(&mut self, what: &str) -> Result<T, DataError> {
        let token = self.take(what)?;
        if token.quoted {
            return Err(DataError::Parse {
                line: token.line,
                message: format!("expected {what}, found quoted {:?}", token.text),
            });
        }
        token.text.parse().map_err(|_| DataError::Parse {
            line: token.line,
            message: format!("expected {what}, found {:?}", token.text),
        })
    }

    fn airport_ref(&mut self) -> Result<AirportRef, DataError> {
        let token = self.take("airport index or name")?;
        if token.quoted {
            return Ok(AirportRef::Name(token.text.clone()));
        }
        match token.text.parse() {
            Ok(i) if i > 0 => Ok(AirportRef::Index(i)),
            _ => Err(DataError::Parse {
                line: token.line,
                message: format!("expected airport index or name, found {:?}", token.text),
            }),
        }
    }

    /// Quoted tokens remaining on `line`.
    fn names_on_line(&mut self, line: usize) -> Vec<String> {
        let mut names = Vec::new();
        while let Some(token) = self.tokens.get(self.pos) {
            if token.line != line || !token.quoted {
                break;
            }
            names.push(token.text.clone());
            self.pos += 1;
        }
        names
    }
}

fn non_negative(value: f64, line: usize, what: &str) -> Result<f64, DataError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DataError::Parse {
            line,
            message: format!("{what} must be a non-negative number, found {value}"),
        })
    }
}

fn parse_case(cursor: &mut Cursor) -> Result<Case, DataError> {
    let airport_count: usize = cursor.bare("airport count")?;
    let max_radius_km = cursor.bare("maximum service radius")?;
    let max_radius_km = non_negative(max_radius_km, cursor.line(), "radius")?;

    // Counts come from the file; never reserve more than the tokens left.
    let mut airports = Vec::with_capacity(airport_count.min(cursor.remaining()));
    for _ in 0..airport_count {
        let longitude: f64 = cursor.bare("longitude")?;
        let latitude: f64 = cursor.bare("latitude")?;
        let line = cursor.line();
        if !(-90.0..=90.0).contains(&latitude) || !longitude.is_finite() {
            return Err(DataError::Parse {
                line,
                message: format!("invalid coordinates {longitude} {latitude}"),
            });
        }
        let names = cursor.names_on_line(line);
        airports.push(AirportSpec {
            names,
            longitude,
            latitude,
        });
    }

    let query_count: usize = cursor.bare("query count")?;
    let mut queries = Vec::with_capacity(query_count.min(cursor.remaining()));
    for _ in 0..query_count {
        let from = cursor.airport_ref()?;
        let to = cursor.airport_ref()?;
        let plane_range = cursor.bare("plane range")?;
        let plane_range = non_negative(plane_range, cursor.line(), "plane range")?;
        queries.push(QuerySpec {
            from,
            to,
            plane_range,
        });
    }

    Ok(Case {
        max_radius_km,
        airports,
        queries,
    })
}

/// Parses every case in `input`.
pub fn parse_cases(input: &str) -> Result<Vec<Case>, DataError> {
    let mut cursor = Cursor {
        tokens: tokenize(input)?,
        pos: 0,
    };
    let mut cases = Vec::new();
    while !cursor.at_end() {
        cases.push(parse_case(&mut cursor)?);
    }
    Ok(cases)
}

pub fn read_cases_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Case>, DataError> {
    let text = fs::read_to_string(path)?;
    parse_cases(&text)
}
