use clap::{Parser, ValueEnum};

/// Prompt-to-video backend with provider webhooks and job status polling.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log output format
    #[arg(long, value_enum, default_value_t = default_tracing_format())]
    pub tracing: TracingFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Human-readable, compact output
    Pretty,
    /// One JSON object per line
    Json,
}

fn default_tracing_format() -> TracingFormat {
    if cfg!(debug_assertions) {
        TracingFormat::Pretty
    } else {
        TracingFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tracing_flag() {
        let args = Args::try_parse_from(["vidgen", "--tracing", "json"]).unwrap();
        assert_eq!(args.tracing, TracingFormat::Json);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Args::try_parse_from(["vidgen", "--tracing", "xml"]).is_err());
    }
}
