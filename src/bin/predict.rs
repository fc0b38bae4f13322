//! Command line tool to classify text with the latest promoted model

use anyhow::anyhow;
use hate_speech_classifier::{pipelines::PredictionPipeline, utils::logging, Config};
use pico_args::Arguments;

const HELP: &str = "\
Usage: predict [OPTIONS] TEXT...

Arguments:
  TEXT                 One or more texts to classify

Options:
  -h, --help           Print help
  -c, --config         A JSON config file (defaults are used otherwise)
  -d, --artifacts      The root directory for run artifacts (defaults to 'artifacts')
";

#[derive(Debug)]
struct Args {
    config: Option<String>,
    artifacts: Option<String>,
    texts: Vec<String>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let config = pargs.opt_value_from_str(["-c", "--config"])?;
        let artifacts = pargs.opt_value_from_str(["-d", "--artifacts"])?;

        let texts: Vec<String> = pargs
            .finish()
            .into_iter()
            .map(|text| text.to_string_lossy().into_owned())
            .collect();

        if texts.is_empty() {
            return Err(anyhow!("Missing required argument: TEXT"));
        }

        Ok(Some(Args {
            config,
            artifacts,
            texts,
        }))
    }
}

fn main() -> anyhow::Result<()> {
    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    logging::init();

    let mut config = Config::from_file(args.config.as_deref())?;

    if let Some(artifacts) = args.artifacts {
        config.artifacts_root = artifacts;
    }

    let pipeline = PredictionPipeline::new(&config)?;

    log::info!("Using model from {}", pipeline.model_dir().display());

    for text in &args.texts {
        println!("{}\t{}", pipeline.predict(text)?, text);
    }

    Ok(())
}
