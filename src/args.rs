use clap::Parser;

/// This is a program that allocates students to thesis supervisors.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the allocation settings in JSON format.
    /// For more information about the file format, read the documentation of the
    /// supervisor_allocation crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (directory path) A directory containing reference outputs. If provided, supalloc will
    /// check that the generated tables match the files of the same name in this directory.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (directory path or 'stdout') If specified, the tables will be written to the given
    /// location. Setting this option overrides the directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The table of the students and their preferences. Setting this option overrides
    /// the file that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. By default, files ending in .xlsx are read as
    /// Excel spreadsheets and all the other files as csv.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: the first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
