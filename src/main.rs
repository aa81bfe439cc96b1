use cartoon_recommender::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => {
            info!("no config given, running the built-in strong-ties demo");
            Config::strong_ties_demo()?
        }
    };

    // 1. Generate the population
    let population = generate(&config.generator)?;
    let mut rng = match config.generator.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let kids = NameGenerator::new().generate_unique(&mut rng, population.len())?;
    let matrix = to_feature_matrix(&population.entities, config.generator.universe_size)?
        .with_node_names(kids)?
        .with_feature_names(cartoon_names(config.generator.universe_size))?;

    // 2. Save the matrix
    matrix.write_to_path(&config.output.matrix_path)?;
    info!(path = %config.output.matrix_path.display(), shape = ?matrix.shape(), "wrote feature matrix");

    // 3. Build the friendship graph
    let graph = SocialGraph::similarity_graph(&matrix, config.graph.min_similarity)?;

    // 4. Print recommendations for every kid
    println!("{} kids, {} friendships:", graph.node_count(), graph.edge_count());
    for node in 0..graph.node_count() {
        let view = on_focal_node_changed(&graph, &matrix, node, config.recommender)?;
        println!("{view}");
    }

    Ok(())
}
