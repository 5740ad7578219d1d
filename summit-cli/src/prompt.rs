//! Line-oriented interactive query loop.
//!
//! Each query asks for its parameters one line at a time. A parameter that
//! fails to parse abandons only that query; the user is then offered another
//! one. End of input ends the session without an error.

use std::io::{BufRead, Write};

use log::info;
use summit_core::{
    PostalCodeResolver, QueryParameters, QueryPipeline, RouteSegmentSource, SummitFilter,
};

use crate::format::write_text;
use crate::params::{
    is_yes, parse_country, parse_max_difficulty, parse_min_elevation, parse_postal_code,
    parse_threshold, reachability,
};
use crate::{CliError, ParameterError};

pub(crate) const PROMPT_COUNTRY: &str = "Start country (e.g. AT): ";
pub(crate) const PROMPT_POSTAL_CODE: &str = "Start postal code (e.g. 4363): ";
pub(crate) const PROMPT_MIN_ELEVATION: &str = "Minimum summit elevation in metres (e.g. 1300): ";
pub(crate) const PROMPT_CROSS_ONLY: &str = "Only summits with a cross? (y/n): ";
pub(crate) const PROMPT_DOMINANCE: &str = "Rank by dominance? (y/n): ";
pub(crate) const PROMPT_VIA_FERRATA: &str = "Require a via ferrata nearby? (y/n): ";
pub(crate) const PROMPT_THRESHOLD: &str =
    "Maximum distance between summit and via ferrata in metres (e.g. 333): ";
pub(crate) const PROMPT_MAX_DIFFICULTY: &str = "Maximum via ferrata difficulty (0-6): ";
pub(crate) const PROMPT_ANOTHER: &str = "Run another query? (y/n): ";
pub(crate) const SESSION_END: &str = "Session finished.";

/// Why a query stopped before all parameters were read.
enum Interrupted {
    EndOfInput,
    Invalid(ParameterError),
    Failed(CliError),
}

impl From<CliError> for Interrupted {
    fn from(err: CliError) -> Self {
        Self::Failed(err)
    }
}

impl From<ParameterError> for Interrupted {
    fn from(err: ParameterError) -> Self {
        Self::Invalid(err)
    }
}

/// Reads answers from `input` and writes prompts and results to `output`.
struct Prompter<R, W> {
    input: R,
    output: W,
    line: String,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    const fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            line: String::new(),
        }
    }

    /// Print `prompt` and read one answer; `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<&str>, CliError> {
        self.output
            .write_all(prompt.as_bytes())
            .and_then(|()| self.output.flush())
            .map_err(CliError::Io)?;
        self.line.clear();
        let read = self
            .input
            .read_line(&mut self.line)
            .map_err(CliError::ReadInput)?;
        Ok((read > 0).then_some(self.line.as_str()))
    }

    fn say(&mut self, message: &str) -> Result<(), CliError> {
        writeln!(self.output, "{message}").map_err(CliError::Io)
    }

    fn answer(&mut self, prompt: &str) -> Result<String, Interrupted> {
        self.ask(prompt)?
            .map(str::to_owned)
            .ok_or(Interrupted::EndOfInput)
    }

    fn parsed<T>(
        &mut self,
        prompt: &str,
        parse: fn(&str) -> Result<T, ParameterError>,
    ) -> Result<T, Interrupted> {
        let line = self.answer(prompt)?;
        Ok(parse(&line)?)
    }
}

/// Run queries until the user declines another one or input ends.
///
/// Recoverable query failures are reported and the loop continues; a failed
/// segment load or an I/O error ends the session with an error.
pub(crate) fn run_session<R, W, S, P>(
    input: R,
    output: W,
    pipeline: &QueryPipeline<'_, S>,
    resolver: &P,
) -> Result<(), CliError>
where
    R: BufRead,
    W: Write,
    S: RouteSegmentSource,
    P: PostalCodeResolver + ?Sized,
{
    let mut prompter = Prompter::new(input, output);
    loop {
        match read_query(&mut prompter) {
            Ok(params) => run_query(&mut prompter, pipeline, resolver, &params)?,
            Err(Interrupted::Invalid(err)) => prompter.say(&err.to_string())?,
            Err(Interrupted::EndOfInput) => break,
            Err(Interrupted::Failed(err)) => return Err(err),
        }
        if !prompter.ask(PROMPT_ANOTHER)?.is_some_and(is_yes) {
            break;
        }
    }
    prompter.say(SESSION_END)
}

fn run_query<R, W, S, P>(
    prompter: &mut Prompter<R, W>,
    pipeline: &QueryPipeline<'_, S>,
    resolver: &P,
    params: &QueryParameters,
) -> Result<(), CliError>
where
    R: BufRead,
    W: Write,
    S: RouteSegmentSource,
    P: PostalCodeResolver + ?Sized,
{
    info!(
        "Resolving postal code {} in {}",
        params.postal_code, params.country
    );
    match pipeline.execute(params, resolver) {
        Ok(ranking) => write_text(&mut prompter.output, &ranking).map_err(CliError::Io),
        Err(err) if err.is_recoverable() => prompter.say(&format!("Error: {err}")),
        Err(err) => Err(CliError::Query(err)),
    }
}

/// Ask for every parameter of one query, stopping at the first bad answer.
fn read_query<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> Result<QueryParameters, Interrupted> {
    let country = prompter.parsed(PROMPT_COUNTRY, parse_country)?;
    let postal_code = prompter.parsed(PROMPT_POSTAL_CODE, parse_postal_code)?;
    let min_elevation = prompter.parsed(PROMPT_MIN_ELEVATION, parse_min_elevation)?;
    let cross_only = is_yes(&prompter.answer(PROMPT_CROSS_ONLY)?);
    let dominance = is_yes(&prompter.answer(PROMPT_DOMINANCE)?);
    let constraints = if is_yes(&prompter.answer(PROMPT_VIA_FERRATA)?) {
        let threshold_m = prompter.parsed(PROMPT_THRESHOLD, parse_threshold)?;
        let max_difficulty = prompter.parsed(PROMPT_MAX_DIFFICULTY, parse_max_difficulty)?;
        Some(reachability(threshold_m, max_difficulty)?)
    } else {
        None
    };

    Ok(QueryParameters {
        country,
        postal_code,
        filter: SummitFilter {
            min_elevation,
            cross_only,
            dominance,
        },
        reachability: constraints,
    })
}
