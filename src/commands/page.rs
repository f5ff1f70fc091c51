use super::{CommandResult, PageArgs};
use pagecal::components::pipeline::prepare_draft;
use pagecal::components::PageHandle;
use pagecal::config::Config;

/// Print everything the page suggests for a new event
pub async fn suggest(config: &Config, args: PageArgs) -> CommandResult {
    let tz = config.tz()?;
    let page = PageHandle::from_file(&args.file, tz).await?;
    let selection = args.selection();
    let draft = prepare_draft(&page, args.url, selection.clone()).await;
    page.shutdown().await?;

    println!("Titles:");
    for title in draft.title_suggestions() {
        println!("  {} ({})", title.text, title.source);
    }

    println!("Dates:");
    for (i, date) in draft.date_suggestions().iter().enumerate() {
        match &date.end {
            Some(end) => println!("  {}. {} - {}  {}", i + 1, date.start, end, date.label),
            None => println!("  {}. {}  {}", i + 1, date.start, date.label),
        }
    }

    println!("Descriptions:");
    for description in draft.description_suggestions() {
        println!("  [{}] {}", description.source, description.text);
    }

    if selection.is_some() {
        println!("Selection context:");
        if draft.description.is_empty() {
            println!("  (none)");
        } else {
            println!("  {}", draft.description);
        }
    }

    Ok(())
}
