//! List trending movies and the cast of the top one.
//!
//! Only needs application credentials, no user token.
//!
//! Run with: TRAKT_CLIENT_ID=... TRAKT_CLIENT_SECRET=... cargo run --example trending

use futures_util::StreamExt;
use trakt_rs::{MediaType, Pagination, TraktClient};

#[tokio::main]
async fn main() -> trakt_rs::Result<()> {
    tracing_subscriber::fmt::init();

    let client = TraktClient::from_env()?;

    println!("=== Trending movies ===");
    let movies = client
        .discover()
        .trending(MediaType::Movies, Some(Pagination::new(1, 10)?))
        .await?;
    for (rank, movie) in movies.iter().enumerate() {
        println!("{:>2}. {}", rank + 1, movie.title().unwrap_or("untitled"));
    }

    if let Some(top) = movies.first().and_then(|m| m.as_movie()) {
        let people = client.people().cast(top).await?;
        println!("\n=== Cast of {} ===", top.title);
        for member in people.cast.iter().take(10) {
            println!("  {} as {}", member.person.name, member.character);
        }
        for director in people.department("directing") {
            println!("  Directed by {}", director.person.name);
        }
    }

    println!("\n=== First 25 trending shows ===");
    let mut shows = client.discover().trending_stream(MediaType::Shows, 10).take(25);
    while let Some(show) = shows.next().await {
        let show = show?;
        println!("  {}", show.title().unwrap_or("untitled"));
    }

    Ok(())
}
