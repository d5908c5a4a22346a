use execview_core::api::{classify, classify_all, AppContext, CliError, FrameCounts, ReplayFilter};

use super::cli::{FramesArgs, OutputFormat};
use super::render::{frame_json, frame_line, record_line};

pub async fn run(args: &FramesArgs, format: OutputFormat, ctx: &AppContext) -> Result<i32, CliError> {
    let mut client = ctx.sync_client();
    client.reset(&args.session_id).await;
    if let Some(err) = client.state().last_error() {
        return Err(CliError::Fetch(err.clone()));
    }
    if args.all {
        client.load_all().await;
        if let Some(err) = client.state().last_error() {
            return Err(CliError::Fetch(err.clone()));
        }
    }

    let filter = ReplayFilter::from(args.filter);
    let mut index = 0usize;
    for record in client.records() {
        match classify(record).filter(|f| filter.matches(f)) {
            Some(frame) => {
                match format {
                    OutputFormat::Text => println!("{}", frame_line(index, &frame)),
                    OutputFormat::Jsonl => println!("{}", frame_json(index, &frame)),
                }
                index += 1;
            }
            None if args.raw && format == OutputFormat::Text => println!("{}", record_line(record)),
            None => {}
        }
    }

    if format == OutputFormat::Text {
        let counts = FrameCounts::of(&classify_all(client.records()));
        let more = if client.state().has_more() {
            " (more available, use --all)"
        } else {
            ""
        };
        eprintln!(
            "{} records, {} frames: browser={} terminal={} tool={}{}",
            client.records().len(),
            counts.total(),
            counts.browser,
            counts.terminal,
            counts.tool,
            more
        );
    }
    Ok(0)
}
