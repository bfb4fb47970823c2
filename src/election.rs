use log::{debug, info, warn};

use social_choice::*;
use snafu::prelude::*;

use std::fs;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::election::config_reader::*;
use crate::election::io_common::assemble_table;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;

#[derive(Debug, Snafu)]
pub enum ScError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} does not contain any worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook {path} does not contain a worksheet named {name}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display(
        "The workbook {path} contains several worksheets ({names}), the name of the worksheet to use must be provided"
    ))]
    AmbiguousWorksheet { path: String, names: String },
    #[snafu(display("Line {lineno} does not contain any value"))]
    ExcelLineTooShort { lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Line {lineno} does not contain any value"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive integer, found {content}"))]
    ParsingJsonNumber { content: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Provider not implemented {provider:?}"))]
    UnknownProvider { provider: String },
    #[snafu(display("No input file was provided"))]
    MissingInput {},
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid content at line {lineno}: {source}"))]
    TableContent { source: VotingErrors, lineno: usize },
    #[snafu(display("Voting error: {source}"))]
    Voting { source: VotingErrors },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ScResult<T> = Result<T, ScError>;
pub type BScResult<T> = Result<T, Box<ScError>>;

fn rule_name(rule: &Rule) -> &'static str {
    match rule {
        Rule::Dictatorship(_) => "dictatorship",
        Rule::Plurality => "plurality",
        Rule::Scoring(_) => "scoring",
        Rule::Veto => "veto",
        Rule::Borda => "borda",
        Rule::Harmonic => "harmonic",
        Rule::Stv => "stv",
        Rule::Range { .. } => "range",
    }
}

fn tiebreak_name(mode: &TieBreakMode) -> String {
    match mode {
        TieBreakMode::MaxId => "max".to_string(),
        TieBreakMode::MinId => "min".to_string(),
        TieBreakMode::Random(seed) => format!("random({})", seed),
        TieBreakMode::AgentBased(agent) => format!("agent({})", agent),
    }
}

/// Scores are written as strings, rounded to remove the noise of the fractional transfers.
fn format_value(x: f64) -> String {
    let r = (x * 1e6).round() / 1e6;
    if r == 0.0 {
        // Also catches -0.0
        "0".to_string()
    } else {
        r.to_string()
    }
}

fn alternative_name(table: &ValueTable, alternative: Alternative) -> String {
    table
        .name(alternative)
        .map(|s| s.to_string())
        .unwrap_or_else(|| alternative.to_string())
}

fn transfers_to_json(table: &ValueTable, stats: &TransferStats) -> JSMap<String, JSValue> {
    let mut transfers: JSMap<String, JSValue> = JSMap::new();
    for (alternative, count) in stats.transfers.iter() {
        transfers.insert(
            alternative_name(table, *alternative),
            json!(format_value(*count)),
        );
    }
    if stats.exhausted > 0.0 {
        transfers.insert("exhausted".to_string(), json!(format_value(stats.exhausted)));
    }
    transfers
}

fn result_stats_to_json(table: &ValueTable, rs: &VotingResult) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in rs.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (alternative, count) in round_stat.tally.iter() {
            tally.insert(
                alternative_name(table, *alternative),
                json!(format_value(*count)),
            );
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        for elected in round_stat.tally_results_elected.iter() {
            tally_results.push(json!({
                "elected": alternative_name(table, elected.alternative),
                "transfers": transfers_to_json(table, elected)
            }));
        }
        for elim_stats in round_stat.tally_result_eliminated.iter() {
            tally_results.push(json!({
                "eliminated": alternative_name(table, elim_stats.alternative),
                "transfers": transfers_to_json(table, elim_stats)
            }));
        }

        let js = json!({"round": round_stat.round, "tally": tally, "tallyResults": tally_results});
        l.push(js);
    }
    l
}

fn build_summary_js(
    config: &ScConfig,
    rules: &VoteRules,
    table: &ValueTable,
    rv: &VotingResult,
) -> JSValue {
    let c = OutputConfig {
        contest: config
            .output_settings
            .contest_name
            .clone()
            .unwrap_or_default(),
        rule: rule_name(&rules.rule).to_string(),
        tiebreak: tiebreak_name(&rules.tiebreak_mode),
        number_of_winners: rules.number_of_winners,
        quota: rv.quota.map(format_value),
    };
    let names = |alts: &[Alternative]| -> Vec<String> {
        alts.iter().map(|a| alternative_name(table, *a)).collect()
    };
    let mut scores: JSMap<String, JSValue> = JSMap::new();
    for (alternative, score) in rv.scores.iter() {
        scores.insert(alternative_name(table, *alternative), json!(format_value(*score)));
    }
    json!({
        "config": c,
        "results": {
            "winners": names(&rv.winners),
            "tied": names(&rv.tied),
            "scores": scores,
            "rounds": result_stats_to_json(table, rv)
        }
    })
}

/// Converts the textual rules of the configuration into rules for the library.
pub fn validate_rules(sc_rules: &ScRules) -> ScResult<VoteRules> {
    let tiebreak_mode = match sc_rules.tiebreak_mode.as_deref().unwrap_or("max") {
        "max" => TieBreakMode::MaxId,
        "min" => TieBreakMode::MinId,
        "random" => match sc_rules.random_seed()? {
            Some(seed) => TieBreakMode::Random(seed),
            None => {
                whatever!("The random tiebreak mode requires a seed")
            }
        },
        "agent" => match sc_rules.tiebreak_agent {
            Some(agent) => TieBreakMode::AgentBased(Agent(agent)),
            None => {
                whatever!("The agent tiebreak mode requires an agent")
            }
        },
        x => {
            whatever!("Unknown tiebreak mode {:?}", x)
        }
    };
    let rule = match sc_rules.rule.as_str() {
        "dictatorship" => match sc_rules.dictator {
            Some(agent) => Rule::Dictatorship(Agent(agent)),
            None => {
                whatever!("The dictatorship rule requires a dictator")
            }
        },
        "plurality" => Rule::Plurality,
        "scoring" => match sc_rules.score_vector.clone() {
            Some(v) => Rule::Scoring(v),
            None => {
                whatever!("The scoring rule requires a score vector")
            }
        },
        "veto" => Rule::Veto,
        "borda" => Rule::Borda,
        "harmonic" => Rule::Harmonic,
        "stv" => Rule::Stv,
        "range" => match (sc_rules.range_min, sc_rules.range_max) {
            (Some(lower), Some(upper)) => Rule::Range { lower, upper },
            x => {
                whatever!("Range voting requires both bounds, found {:?}", x)
            }
        },
        x => {
            whatever!("Unknown rule {:?}", x)
        }
    };
    Ok(VoteRules {
        rule,
        tiebreak_mode,
        number_of_winners: sc_rules
            .number_of_winners
            .unwrap_or(VoteRules::DEFAULT_RULES.number_of_winners),
    })
}

/// The options of the command line take precedence over the configuration file.
fn merge_args(config: ScConfig, args: &Args) -> ScConfig {
    let mut res = config;
    if let Some(x) = &args.out {
        res.output_settings.output_path = Some(x.clone());
    }
    if let Some(x) = &args.input {
        res.input_source.file_path = Some(x.clone());
    }
    if let Some(x) = &args.input_type {
        res.input_source.provider = Some(x.clone());
    }
    if let Some(x) = &args.excel_worksheet_name {
        res.input_source.excel_worksheet_name = Some(x.clone());
    }
    if args.no_header {
        res.input_source.has_header = Some(false);
    }
    let rules = &mut res.rules;
    if let Some(x) = &args.rule {
        rules.rule = x.clone();
    }
    if let Some(x) = &args.score_vector {
        rules.score_vector = Some(x.clone());
    }
    if let Some(x) = &args.tiebreak {
        rules.tiebreak_mode = Some(x.clone());
    }
    if let Some(x) = args.seed {
        rules.random_seed = Some(json!(x));
    }
    if let Some(x) = args.agent {
        rules.tiebreak_agent = Some(x);
        rules.dictator = Some(x);
    }
    if let Some(x) = args.seats {
        rules.number_of_winners = Some(x);
    }
    if let Some(x) = args.range_min {
        rules.range_min = Some(x);
    }
    if let Some(x) = args.range_max {
        rules.range_max = Some(x);
    }
    res
}

fn read_values(source: &InputSource) -> BScResult<ValueTable> {
    let path = source.file_path.clone().context(MissingInputSnafu {})?;
    info!("Attempting to read value file {:?}", path);
    let parsed = match source.provider().as_str() {
        "csv" => io_csv::read_csv_values(&path, source)?,
        "xlsx" => io_excel::read_excel_values(&path, source)?,
        x => {
            return Err(Box::new(ScError::UnknownProvider {
                provider: x.to_string(),
            }));
        }
    };
    assemble_table(parsed)
}

fn write_summary(pretty_js_stats: &str, out: &Option<String>) -> BScResult<()> {
    match out.as_deref() {
        Some("stdout") => {
            println!("{}", pretty_js_stats);
        }
        Some(path) => {
            info!("Writing summary to {}", path);
            fs::write(path, pretty_js_stats).context(WritingOutputSnafu { path })?;
        }
        None => {
            debug!("No output requested");
        }
    }
    Ok(())
}

fn check_reference(pretty_js_stats: &str, reference_path: &str) -> BScResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return Err(Box::new(ScError::ReferenceMismatch {}));
    }
    info!("The summary matches the reference {}", reference_path);
    Ok(())
}

/// Computes the summary of an election described by a configuration and a value table.
fn compute_summary(config: &ScConfig, table: &ValueTable) -> BScResult<JSValue> {
    // Validate the rules:
    let rules = validate_rules(&config.rules)?;
    let result = social_choice::run_election(table, &rules).context(VotingSnafu {})?;
    debug!("result: {:?}", result);
    Ok(build_summary_js(config, &rules, table, &result))
}

pub fn run_election(args: &Args) -> BScResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => ScConfig::default(),
    };
    let config = merge_args(config, args);
    info!("config: {:?}", config);

    let table = read_values(&config.input_source)?;
    let result_js = compute_summary(&config, &table)?;

    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_summary(&pretty_js_stats, &config.output_settings.output_path)?;

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &args.reference {
        check_reference(&pretty_js_stats, reference_path)?;
    }
    Ok(())
}
