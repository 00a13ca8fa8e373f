use consistent_geohash::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== consistent_geohash: approximate range counting ===\n");

    let dimension = 3;
    let query_radius = 40.0;
    let mut rng = StdRng::seed_from_u64(2024);

    let points: Vec<TaggedPoint> = (0..20_000)
        .map(|id| TaggedPoint::new(id, IntPoint::random(dimension, 2_000, &mut rng)))
        .collect();

    for choice in [HashingSchemeChoice::Grid, HashingSchemeChoice::Face] {
        let config = HashingConfig::new(choice, dimension, query_radius).with_seed(7);
        let scheme = config.build()?;
        println!("{choice} (Γ = {:.2})", config.gamma());

        let index = BucketIndex::from_points(scheme, Count, points.iter().map(|p| (p.clone(), 1)))?;
        println!(
            "  {} points in {} buckets",
            index.num_points(),
            index.num_buckets()
        );

        for _ in 0..5 {
            let center = IntPoint::random(dimension, 1_500, &mut rng);
            let ball = MetricBall::new(&center, query_radius);
            let exact = ball.filter(points.iter()).len();
            let approx = index.query(&center, query_radius)?;
            println!(
                "  center {:?}: exact={:4}  approx={:5}  ratio={:.1}x",
                center.coords(),
                exact,
                approx,
                approx as f64 / exact.max(1) as f64
            );
        }
        println!();
    }

    Ok(())
}
