//! `tensive topics`: show how a query ranks against the knowledge base.

use tensive_knowledge::RetrievalPolicy;

pub fn run(query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let knowledge = super::load_knowledge(&config)?;
    let policy = RetrievalPolicy {
        see_also_limit: config.retrieval.see_also_limit,
        content_threshold: config.retrieval.content_threshold,
        asset_threshold: config.retrieval.asset_threshold,
    };

    let ranking = knowledge.rank(query);
    let retrieval = policy.select(&ranking);

    println!("Query: {query}\n");
    for m in ranking.iter().take(policy.see_also_limit) {
        println!("  {:>3}  {}", m.score, m.entry.title);
    }
    println!();

    match &retrieval.grounding {
        Some(g) => {
            println!("Grounded on: {} (score {})", g.entry.title, g.score);
            match retrieval.released_assets() {
                Some(assets) => println!("Assets released: {}", serde_json::to_string(assets)?),
                None => println!("Assets released: none"),
            }
        }
        None => println!(
            "No entry reaches the content threshold ({}).",
            policy.content_threshold
        ),
    }

    Ok(())
}
