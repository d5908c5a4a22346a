use execview_core::api::{AppContext, CliError, FetchError, ScreenshotEntry};
use serde_json::json;

use super::cli::{OutputFormat, ScreenshotArgs};

pub async fn run(args: &ScreenshotArgs, format: OutputFormat, ctx: &AppContext) -> Result<i32, CliError> {
    let mut cache = ctx.screenshots(&args.session_id);
    let entry = cache.fetch(&args.tool_use_id, args.retry).await.cloned();

    match entry {
        Some(ScreenshotEntry::Resolved(Some(url))) => {
            match format {
                OutputFormat::Text => println!("{url}"),
                OutputFormat::Jsonl => println!(
                    "{}",
                    json!({ "tool_use_id": args.tool_use_id.trim(), "url": url })
                ),
            }
            Ok(0)
        }
        _ => Err(CliError::Fetch(FetchError::NotFound(format!(
            "no screenshot for tool_use_id {}",
            args.tool_use_id.trim()
        )))),
    }
}
