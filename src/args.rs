use clap::Parser;

/// This is an instant-runoff tabulation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the election description in JSON format.
    /// When missing, the election is described by the other options.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, irvflow will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election, including the transfers between
    /// rounds, will be written in JSON format to the given location. Setting this option overrides the path
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The file containing the ballots. Required when --config is not provided.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv, csv_likert or msforms_likert.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (list of comma-separated values or not specified) The registered candidates. For likert inputs, the
    /// candidates default to the column names of the header.
    #[clap(long, value_parser, use_value_delimiter = true)]
    pub candidates: Option<Vec<String>>,

    /// (list of comma-separated values or not specified) If specified, the list of labels for the ranks, from
    /// the first choice to the last one. Without it, the labels of likert inputs are read as ordinals (1st, 2nd, ...).
    #[clap(long, value_parser, use_value_delimiter = true)]
    pub choices: Option<Vec<String>>,

    /// (default 1) The first column (starting at 1) that contains choices.
    #[clap(long, value_parser)]
    pub first_vote_column: Option<usize>,

    /// The first row (starting at 1) that contains a ballot. Defaults to 1 for csv and to 2 for the likert
    /// inputs, whose header comes just before.
    #[clap(long, value_parser)]
    pub first_vote_row: Option<usize>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (participate or exclude) Whether registered candidates that no ballot ranks take part in the
    /// first elimination.
    #[clap(long, value_parser)]
    pub unranked_candidates: Option<String>,

    /// (tie or fail) What to do when no ballot holds a vote while several candidates are running.
    #[clap(long, value_parser)]
    pub degenerate_round: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
