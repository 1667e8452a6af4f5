use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::Level;

use livecast::cli::{self, Commands, StreamArgs};
use livecast::engine::{SourceKind, StreamOptions};
use livecast::live::{Livestream, SaveDisk};

fn main() -> Result<()> {
    let cli = cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    match cli.command {
        Commands::Camera { stream } => {
            go_live(&stream, SourceKind::Camera, options(&stream, cli.verbose))
        }
        Commands::Microphone { stream, image } => {
            let mut opts = options(&stream, cli.verbose);
            opts.image = image;
            go_live(&stream, SourceKind::AudioOnly, opts)
        }
        Commands::Screen { stream } => {
            go_live(&stream, SourceKind::Screen, options(&stream, cli.verbose))
        }
        Commands::File {
            stream,
            input,
            r#loop,
        } => {
            let mut opts = options(&stream, cli.verbose);
            opts.input_file = Some(input);
            opts.loop_input = r#loop;
            go_live(&stream, SourceKind::File, opts)
        }
        Commands::SaveDisk {
            config,
            out,
            assume_yes,
            timeout,
        } => {
            let opts = StreamOptions {
                assume_yes,
                verbose: cli.verbose,
                timeout,
                ..StreamOptions::default()
            };
            let save = SaveDisk::new(&config, out, &opts)?;

            match &save.out {
                Some(out) if assume_yes => {
                    println!("saving screen capture to {}", out.display());
                }
                Some(out) => {
                    confirm(&format!(
                        "Press Enter to screen capture to file {}   Or Ctrl C to abort.",
                        out.display()
                    ))?;
                }
                None => {}
            }

            save.save()?;
            Ok(())
        }
    }
}

fn options(stream: &StreamArgs, verbose: bool) -> StreamOptions {
    StreamOptions {
        caption: stream.caption.clone(),
        assume_yes: stream.assume_yes,
        verbose,
        timeout: stream.timeout,
        check_first: stream.check,
        ..StreamOptions::default()
    }
}

fn go_live(stream: &StreamArgs, source: SourceKind, opts: StreamOptions) -> Result<()> {
    let live = Livestream::new(&stream.config, &stream.site, source, &opts)?;

    println!("{}", live.command_line());

    if !stream.assume_yes {
        confirm(&format!(
            "Press Enter to go live on {}   Or Ctrl C to abort.",
            live.settings.site
        ))?;
    }

    live.go_live()?;
    Ok(())
}

fn confirm(prompt: &str) -> Result<()> {
    print!("{prompt} ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
