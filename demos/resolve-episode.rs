use anyhow::Result;
use chrono::Utc;
use gyao_rs::{Gyao, Resolution};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    let url = env::var("URL").expect(
        "please set the 'URL' environment variable to a gyao url which points to an episode or title",
    );

    let gyao = Gyao::builder().build()?;

    for resolution in gyao.resolve(url, false, Utc::now()).await? {
        match resolution {
            Resolution::Ready {
                delivery, stream, ..
            } => println!("{}: {}", delivery.title, stream),
            Resolution::Unavailable(episode) => {
                println!("{} is not available right now", episode.title)
            }
            Resolution::NoDelivery(episode) => println!("{} has no delivery", episode.title),
            Resolution::NoStream { delivery, .. } => {
                println!("{} has no downloadable playlist", delivery.title)
            }
            Resolution::Failed { episode, error } => {
                println!("{} failed: {}", episode.title, error)
            }
        }
    }

    Ok(())
}
