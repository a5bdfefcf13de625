/// Output formatting: terminal table and JSON.
use lowvol_ranker::{AdaptiveRanker, EntityId};
use lowvol_rating::glicko::confidence_interval;
use serde::Serialize;

const Z_95: f64 = 1.96;

#[derive(Serialize)]
struct JsonRankedEntity<'a> {
    rank: usize,
    id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    rating: f64,
    rd: f64,
    lower_bound: f64,
    upper_bound: f64,
    comparisons: u64,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    entities: Vec<JsonRankedEntity<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tiers: Option<&'a [Vec<EntityId>]>,
    total_comparisons: usize,
}

fn label_width(ranker: &AdaptiveRanker) -> usize {
    ranker
        .entities()
        .iter()
        .enumerate()
        .map(|(id, entity)| entity.label(id).len())
        .max()
        .unwrap_or(4)
        .max(4)
}

/// Print the ranking as a formatted terminal table.
pub fn print_table(ranker: &AdaptiveRanker) {
    let width = label_width(ranker);

    println!(" # | {:<width$} |    Rating |     RD | 95% CI Low | 95% CI High | Comparisons", "Item");
    println!("---|-{}-|-----------|--------|------------|-------------|------------", "-".repeat(width));

    for (rank, id) in ranker.ranking().into_iter().enumerate() {
        let entity = &ranker.entities()[id];
        let (low, high) = confidence_interval(&entity.model.glicko(), Z_95);
        println!(
            "{:>2} | {:<width$} | {:>9.2} | {:>6.2} | {:>10.2} | {:>11.2} | {:>11}",
            rank + 1,
            entity.label(id),
            entity.model.rating(),
            entity.model.rd(),
            low,
            high,
            entity.model.num_comparisons(),
        );
    }

    println!(
        "\n{} items ranked from {} comparisons",
        ranker.len(),
        ranker.ledger().len()
    );
}

/// Print tiers, best first, one line per tier.
pub fn print_tiers(ranker: &AdaptiveRanker, tiers: &[Vec<EntityId>]) {
    for (index, tier) in tiers.iter().enumerate() {
        let members: Vec<String> = tier
            .iter()
            .map(|&id| ranker.entities()[id].label(id))
            .collect();
        println!("Tier {}: {}", index + 1, members.join(", "));
    }
}

/// Print the ranking (and tiers, when given) as JSON.
pub fn print_json(ranker: &AdaptiveRanker, tiers: Option<&[Vec<EntityId>]>) -> serde_json::Result<()> {
    let entities = ranker
        .ranking()
        .into_iter()
        .enumerate()
        .map(|(rank, id)| {
            let entity = &ranker.entities()[id];
            let (lower_bound, upper_bound) = confidence_interval(&entity.model.glicko(), Z_95);
            JsonRankedEntity {
                rank: rank + 1,
                id,
                name: entity.name.as_deref(),
                rating: entity.model.rating(),
                rd: entity.model.rd(),
                lower_bound,
                upper_bound,
                comparisons: entity.model.num_comparisons(),
            }
        })
        .collect();

    let output = JsonOutput {
        entities,
        tiers,
        total_comparisons: ranker.ledger().len(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
