//! HTTP server exposing training and prediction

use hate_speech_classifier::{server::Server, utils::logging, Config};
use pico_args::Arguments;

const HELP: &str = "\
Usage: serve [OPTIONS]

Options:
  -h, --help           Print help
  -c, --config         A JSON config file (defaults are used otherwise)
  --host               Interface to bind (defaults to '127.0.0.1')
  -p, --port           Port to bind (defaults to 8080)
";

#[derive(Debug)]
struct Args {
    config: Option<String>,
    host: Option<String>,
    port: Option<u16>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            config: pargs.opt_value_from_str(["-c", "--config"])?,
            host: pargs.opt_value_from_str("--host")?,
            port: pargs.opt_value_from_str(["-p", "--port"])?,
        };

        Ok(Some(args))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    logging::init();

    let mut config = Config::from_file(args.config.as_deref())?;

    if let Some(host) = args.host {
        config.server.host = host;
    }

    if let Some(port) = args.port {
        config.server.port = port;
    }

    Server::run(config).await?;

    Ok(())
}
