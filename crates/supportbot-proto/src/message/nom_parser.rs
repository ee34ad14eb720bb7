//! Nom-based IRC line parser.
//!
//! ```text
//! [@tags] [:prefix] <command> [params...] [:trailing]
//! ```
//!
//! Tags are recognised and skipped: the bot never negotiates `message-tags`,
//! but a server may still send them.

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    error::ErrorKind,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

/// RFC 2812 parameter limit.
const MAX_PARAMS: usize = 15;

fn parse_tags(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_until(" "))(input)
}

fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// `1*letter / 3digit`
fn parse_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(|c: char| c.is_ascii_alphanumeric())(input)?;

    let letters = cmd.chars().all(|c| c.is_ascii_alphabetic());
    let numeric = cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit());
    if letters || numeric {
        Ok((rest, cmd))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::AlphaNumeric,
        )))
    }
}

/// Middle parameters are space separated (runs of spaces collapse); a
/// parameter starting with `:` swallows the rest of the line.
fn parse_params(input: &str) -> (&str, SmallVec<[&str; MAX_PARAMS]>) {
    let mut params: SmallVec<[&str; MAX_PARAMS]> = SmallVec::new();
    let mut rest = input;

    while rest.starts_with(' ') && params.len() < MAX_PARAMS {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() || rest.starts_with(['\r', '\n']) {
            break;
        }

        if let Some(after_colon) = rest.strip_prefix(':') {
            let end = after_colon.find(['\r', '\n']).unwrap_or(after_colon.len());
            params.push(&after_colon[..end]);
            rest = &after_colon[end..];
            break;
        }

        let end = rest.find([' ', '\r', '\n']).unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    (rest, params)
}

fn parse_message(input: &str) -> IResult<&str, ParsedMessage<'_>> {
    let (input, _tags) = opt(parse_tags)(input)?;
    let (input, _) = space0(input)?;
    let (input, prefix) = opt(parse_prefix)(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = parse_command(input)?;
    let (rest, params) = parse_params(input);

    Ok((
        rest,
        ParsedMessage {
            prefix,
            command,
            params,
        },
    ))
}

/// Borrowed pieces of a line, before they are turned into owned types.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedMessage<'a> {
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    pub params: SmallVec<[&'a str; MAX_PARAMS]>,
}

impl<'a> ParsedMessage<'a> {
    /// Parse a line, reporting the byte offset on failure.
    pub fn parse(input: &'a str) -> Result<Self, usize> {
        match parse_message(input) {
            Ok((_rest, msg)) => Ok(msg),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                Err(input.len() - e.input.len())
            }
            Err(nom::Err::Incomplete(_)) => Err(input.len()),
        }
    }
}
