use consistent_geohash::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

fn main() -> Result<()> {
    println!("=== Grid vs face hashing: buckets visited per query ===\n");
    println!("{:>4} {:>14} {:>12} {:>14} {:>12}", "d", "grid buckets", "grid μs", "face buckets", "face μs");

    let mut rng = StdRng::seed_from_u64(17);
    for dimension in [1, 2, 4, 6, 8] {
        let mut row = Vec::new();
        for choice in [HashingSchemeChoice::Grid, HashingSchemeChoice::Face] {
            let scheme = make_hashing_scheme(choice, dimension, 10.0, DEFAULT_SCALE, &mut rng)?;
            let centers: Vec<IntPoint> = (0..100)
                .map(|_| IntPoint::random(dimension, 100_000, &mut rng))
                .collect();

            let start = Instant::now();
            let visited: usize = centers
                .iter()
                .map(|c| scheme.buckets_in_ball(c, scheme.max_radius()).len())
                .sum();
            let elapsed = start.elapsed().as_micros() as f64 / centers.len() as f64;
            row.push((visited as f64 / centers.len() as f64, elapsed));
        }
        println!(
            "{:>4} {:>14.2} {:>12.1} {:>14.2} {:>12.1}",
            dimension, row[0].0, row[0].1, row[1].0, row[1].1
        );
    }

    Ok(())
}
