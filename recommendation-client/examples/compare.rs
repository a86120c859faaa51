use recommendation_client::{ComparisonSession, Config};
use std::path::PathBuf;

/// Compare both backends for the query given on the command line.
///
/// cargo run --example compare -- "horror comedy"
/// RECOMMENDER_BACKEND_URL=http://recs:8000 cargo run --example compare -- "space opera"
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let config_path = std::env::var_os("RECOMMENDER_CONFIG").map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;
    let session = ComparisonSession::new(&config)?;

    let request = session.submit(query).await?;
    println!("Query {:?} (revision {})", request.query_text(), request.revision());

    let view = session.settled().await;
    if let Some(message) = view.status_message() {
        println!("{}", message);
    }

    for data in [&view.llm_data, &view.similarity_data].into_iter().flatten() {
        println!("\n{} recommendations:", data.source());
        for item in data.items() {
            match item.score {
                Some(score) => println!("  {:<50} {:.3}", item.title, score),
                None => println!("  {}", item.title),
            }
        }
    }

    println!("\nOverlap ({}):", view.overlap.count);
    for title in &view.overlap.titles {
        println!("  {}", title);
    }

    println!("\nCache: {:?}", session.cache_stats());
    Ok(())
}
