use clap::Parser;

/// This is a program to compute the winners of an election under common social-choice rules.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the election.
    /// The options passed on the command line override the content of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the summary of an election in JSON format. If provided, scvote will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The file containing the values of the agents: one row per agent, one column per alternative.
    /// Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. By default, it is guessed from the extension of the file.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    /// It is required if the workbook contains more than one worksheet.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// If passed as an argument, the first row of the input contains values and not the names of the alternatives.
    #[clap(long, takes_value = false)]
    pub no_header: bool,

    // Rules
    /// (default plurality) One of dictatorship, plurality, scoring, veto, borda, harmonic, stv, range.
    #[clap(long, value_parser)]
    pub rule: Option<String>,

    /// (list of comma-separated numbers) The score vector of the scoring rule, one entry per rank.
    #[clap(long, value_parser, use_value_delimiter = true)]
    pub score_vector: Option<Vec<f64>>,

    /// (default max) One of max, min, random, agent.
    #[clap(long, value_parser)]
    pub tiebreak: Option<String>,

    /// The seed of the random tiebreak.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// The agent (row number, starting from 0) deciding the ties with the agent tiebreak,
    /// or the dictator with the dictatorship rule.
    #[clap(long, value_parser)]
    pub agent: Option<u32>,

    /// (default 1) The number of seats to fill with the single transferable vote.
    #[clap(long, value_parser)]
    pub seats: Option<u32>,

    /// The lower bound of the values for range voting.
    #[clap(long, value_parser, allow_hyphen_values = true)]
    pub range_min: Option<f64>,

    /// The upper bound of the values for range voting.
    #[clap(long, value_parser, allow_hyphen_values = true)]
    pub range_max: Option<f64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
