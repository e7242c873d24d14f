use std::path::PathBuf;

use clap::{ArgGroup, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "indesign-mcp", about = "MCP server that drives Adobe InDesign through ExtendScript", version)]
#[command(group(ArgGroup::new("mode").args(["list_tools", "render", "call"]).multiple(false)))]
pub struct Cli {
    /// Print the tool catalog as JSON and exit.
    #[arg(long = "list-tools")]
    pub list_tools: bool,

    /// Print the script an operation would run, without running it.
    #[arg(long, value_name = "OPERATION")]
    pub render: Option<String>,

    /// Run a single operation and print its result.
    #[arg(long, value_name = "OPERATION")]
    pub call: Option<String>,

    /// JSON object of arguments for --render or --call.
    #[arg(long, value_name = "JSON", default_value = "{}")]
    pub args: String,

    /// Seconds to wait for a script before giving up (overrides SCRIPT_TIMEOUT).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Application name to address, e.g. "Adobe InDesign 2024" (overrides INDESIGN_APP).
    #[arg(long)]
    pub app: Option<String>,

    /// Directory for temporary script files (overrides SCRATCH_DIR).
    #[arg(long = "scratch-dir")]
    pub scratch_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_are_exclusive() {
        assert!(Cli::try_parse_from(["indesign-mcp", "--list-tools", "--call", "ping"]).is_err());
        let cli = Cli::try_parse_from(["indesign-mcp", "--render", "add_page", "--args", "{\"count\":2}"])
            .unwrap();
        assert_eq!(cli.render.as_deref(), Some("add_page"));
        assert_eq!(cli.args, "{\"count\":2}");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["indesign-mcp", "--timeout", "0"]).is_err());
    }
}
