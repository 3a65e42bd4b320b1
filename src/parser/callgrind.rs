//! Streaming assembler for callgrind profile files.
//!
//! Reads the input once, classifying every line:
//! - `key: value`  header line, recorded in `Metadata`
//! - `key=value`   field assignment for the current block or call edge
//! - anything else cost line, decoded against the block's previous vector
//!
//! A blank line closes the current block. `calls=` lines consume the next
//! physical line as the call's cost.

use super::compression::NameValue;
use super::costs::{decode_call_cost_line, decode_cost_line};
use super::metadata::read_header_line;
use super::schema::{Context, CostEntry, FieldKind, Profile};
use crate::utils::config::AnnotateConfig;
use crate::utils::error::{DecodeError, ParseError};
use log::{debug, info, trace};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Classification of a non-blank input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    Header,
    Field { key: &'a str, value: &'a str },
    Cost,
}

/// Classify a trimmed, non-blank line
///
/// A colon before any `=` marks a header; an `=` before the first space
/// marks a field assignment.
fn classify(line: &str) -> LineKind<'_> {
    let equals = line.find('=');
    let colon = line.find(':');
    let space = line.find(' ');

    if let Some(colon) = colon {
        if equals.map_or(true, |equals| colon < equals) {
            return LineKind::Header;
        }
    }

    if let Some(equals) = equals {
        if space.map_or(true, |space| equals < space) {
            return LineKind::Field {
                key: &line[..equals],
                value: &line[equals + 1..],
            };
        }
    }

    LineKind::Cost
}

/// Parse a callgrind profile from disk
///
/// **Public** - main entry point for parsing
///
/// # Errors
/// * `ParseError::Io` - file cannot be opened or read
/// * any format error, positioned at the offending line
pub fn parse_profile(
    path: impl AsRef<Path>,
    config: &AnnotateConfig,
) -> Result<Profile, ParseError> {
    let path = path.as_ref();
    info!("Reading profile: {}", path.display());

    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // The reader, and with it the file handle, is dropped on every return path
    parse_reader(BufReader::new(file), path, config)
}

/// Parse a callgrind profile from any buffered reader
///
/// `source` names the input in error messages.
pub fn parse_reader<R: BufRead>(
    reader: R,
    source: impl Into<PathBuf>,
    config: &AnnotateConfig,
) -> Result<Profile, ParseError> {
    Assembler::new(reader, source.into(), config).run()
}

/// Line-by-line state of one parse
struct Assembler<'c, R> {
    reader: R,

    /// Raw bytes of the line being read, reused across lines
    buf: Vec<u8>,

    config: &'c AnnotateConfig,
    profile: Profile,

    /// Block being filled
    current: Context,

    /// Index into `current.calls` of the edge awaiting its `calls=` line
    open_call: Option<usize>,

    /// Current block has seen a field or cost line
    block_open: bool,

    /// Width of cost vectors, read from `events` on first use
    event_count: Option<usize>,

    /// 1-based number of the last line read
    line_num: usize,
}

impl<'c, R: BufRead> Assembler<'c, R> {
    fn new(reader: R, source: PathBuf, config: &'c AnnotateConfig) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            config,
            profile: Profile {
                source,
                ..Profile::default()
            },
            current: Context::new(),
            open_call: None,
            block_open: false,
            event_count: None,
            line_num: 0,
        }
    }

    fn run(mut self) -> Result<Profile, ParseError> {
        while let Some(raw) = self.next_line()? {
            let line = raw.trim();

            if line.is_empty() {
                if self.block_open {
                    self.close_block();
                }
                continue;
            }

            trace!("{:4} : {}", self.line_num, line);

            match classify(line) {
                LineKind::Header => {
                    read_header_line(&mut self.profile.metadata, line);
                }
                LineKind::Field { key, value } => self.field_line(key, value)?,
                LineKind::Cost => self.cost_line(line)?,
            }
        }

        self.finish()
    }

    /// Next physical line without its terminator
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD; profiles
    /// record symbol and path names as the program saw them.
    fn next_line(&mut self) -> Result<Option<String>, ParseError> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| ParseError::Io {
                path: self.profile.source.clone(),
                source,
            })?;

        if read == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        self.line_num += 1;
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }

    fn field_line(&mut self, key: &str, value: &str) -> Result<(), ParseError> {
        self.block_open = true;

        let (kind, call) = FieldKind::from_key(key).ok_or_else(|| ParseError::UnknownKey {
            path: self.profile.source.clone(),
            line: self.line_num,
            key: key.to_string(),
            value: value.trim().to_string(),
        })?;

        if call && self.open_call.is_none() {
            self.open_call = Some(self.current.open_call());
        }

        let Some(entity) = kind.entity() else {
            // Only `calls=` has no entity; its own tokens are not used
            return self.call_cost_line();
        };

        let name = NameValue::classify(value);
        self.profile.names.record(entity, &name);

        let identity = match (call, self.open_call) {
            (true, Some(index)) => &mut self.current.calls[index].identity,
            _ => &mut self.current.identity,
        };
        identity.set(kind, name.field_value());

        trace!("{} => {:?} {}", key, kind, name.field_value());
        Ok(())
    }

    /// Read the line after `calls=` as the call's cost
    fn call_cost_line(&mut self) -> Result<(), ParseError> {
        let calls_line = self.line_num;

        let line = match self.next_line()? {
            Some(line) if !line.trim().is_empty() => line,
            _ => {
                return Err(ParseError::MissingCallCost {
                    path: self.profile.source.clone(),
                    line: calls_line,
                })
            }
        };
        trace!("{:4} : {}", self.line_num, line.trim());

        let values = decode_call_cost_line(&line).map_err(|e| self.decode_error(e))?;

        if let Some(index) = self.open_call.take() {
            self.current.calls[index].costs.extend_from_slice(&values);
        }

        // The callee's cost also counts towards the caller
        if let Some((&line_number, costs)) = values.split_first() {
            self.current.costs.push(CostEntry {
                line: line_number,
                costs: costs.to_vec(),
            });
        }

        Ok(())
    }

    fn cost_line(&mut self, line: &str) -> Result<(), ParseError> {
        self.block_open = true;

        let event_count = self.event_count()?;
        let decoded = decode_cost_line(line, event_count, self.current.previous.as_deref())
            .map_err(|e| self.decode_error(e))?;

        self.current.costs.push(CostEntry {
            line: decoded.line_number,
            costs: decoded.costs,
        });
        self.current.previous = Some(decoded.full);

        Ok(())
    }

    fn event_count(&mut self) -> Result<usize, ParseError> {
        if let Some(count) = self.event_count {
            return Ok(count);
        }

        let events = self
            .profile
            .metadata
            .events()
            .ok_or_else(|| ParseError::MissingEvents {
                path: self.profile.source.clone(),
                line: self.line_num,
            })?;

        debug!("Events: {}", events.join(", "));
        self.event_count = Some(events.len());
        Ok(events.len())
    }

    fn decode_error(&self, error: DecodeError) -> ParseError {
        let path = self.profile.source.clone();
        let line = self.line_num;

        match error {
            DecodeError::InvalidToken(token) => ParseError::InvalidCost { path, line, token },
            DecodeError::TooManyColumns { expected, found } => ParseError::TooManyColumns {
                path,
                line,
                expected,
                found,
            },
        }
    }

    /// Snapshot the current block and start its successor
    fn close_block(&mut self) {
        let next = self.current.successor();
        let closed = std::mem::replace(&mut self.current, next);
        self.open_call = None;
        self.block_open = false;
        self.register(closed);
    }

    fn register(&mut self, context: Context) {
        let index = self.profile.contexts.len();

        match context.identity.function.clone() {
            Some(function) => {
                if let Some(replaced) = self.profile.functions.insert(function.clone(), index) {
                    debug!(
                        "Block {} replaces block {} for function {}",
                        index, replaced, function
                    );
                }
            }
            None => debug!("Block {} has no function name, not registered", index),
        }

        self.profile.contexts.push(context);
    }

    fn finish(mut self) -> Result<Profile, ParseError> {
        let last = std::mem::take(&mut self.current);
        if last.is_empty() {
            trace!("Dropping empty final block");
        } else {
            self.register(last);
        }

        self.profile.lines_read = self.line_num;
        info!(
            "Parsed {} lines: {} blocks, {} functions",
            self.line_num,
            self.profile.contexts.len(),
            self.profile.functions.len()
        );

        if self.config.verbose {
            self.dump();
        }

        Ok(self.profile)
    }

    fn dump(&self) {
        for (i, context) in self.profile.contexts.iter().enumerate() {
            debug!("Context {}: {:?}", i + 1, context);
        }

        for (function, &index) in &self.profile.functions {
            debug!(
                "{:>15}: {:?}",
                function, self.profile.contexts[index].costs
            );
        }
    }
}
