use std::ffi::OsString;

use clap::Parser;

#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(about, long_about = None)]
pub struct HarnessCli {
    /// The scenario to run, or `all` to run every scenario and write a report.
    ///
    /// Leave it out, or give a name that isn't recognised, to print the list of commands.
    pub command: Option<String>,

    /// Parameter for the command, for example the model to run the scenario with
    pub parameter: Option<String>,

    /// Anything after the parameter, accepted and ignored
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,
}

impl HarnessCli {
    /// Parse `args` without ever exiting the process.
    ///
    /// A command line clap rejects, including `--help`, is treated as if no command was given so
    /// the caller prints its own list of commands.
    pub fn parse_lenient_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => {
                if !cli.extra.is_empty() {
                    log::warn!("Ignoring extra arguments: {:?}", cli.extra);
                }
                cli
            }
            Err(e) => {
                log::debug!("Command line not understood, showing help instead: {e}");
                Self::default()
            }
        }
    }
}
