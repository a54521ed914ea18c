use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory containing videos and their subtitle files
    pub input_dir: PathBuf,

    /// Directory receiving the burned-in videos (created if missing)
    pub output_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Start every batch without waiting for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_positionals_required() {
        assert!(Args::try_parse_from(["subburn", "in"]).is_err());
        assert!(Args::try_parse_from(["subburn", "in", "out", "extra"]).is_err());

        let args = Args::try_parse_from(["subburn", "--yes", "in", "out"]).unwrap();
        assert_eq!(args.input_dir, PathBuf::from("in"));
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert!(args.yes);
        assert!(!args.verbose);
        assert!(args.config.is_none());
    }
}
