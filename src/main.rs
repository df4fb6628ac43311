use anyhow::Context;
use rand::Rng;
use stress_test::{stress_test_cleanup, stress_test_scaling};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("baseline_fallback_graph=info,bfg_graph=warn,bfg_content=warn")
        }))
        .init();

    // An explicit seed replays a failing run.
    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u64>().with_context(|| format!("invalid seed {:?}", arg))?,
        None => rand::thread_rng().gen(),
    };
    tracing::info!(seed, "starting baseline cleanup stress tests");

    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            CLEANUP STRESS TESTS                            ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Test 1: a few families of the catalog
    let stats = stress_test_cleanup(seed, 200, 2, 4).await?;
    stats.print();

    // Test 2: the whole catalog, more copies per scenario
    let stats = stress_test_cleanup(seed.wrapping_add(1), 500, 4, usize::MAX).await?;
    stats.print();

    // Test 3: scaling analysis
    stress_test_scaling(seed, 100).await?;

    println!("\n✓ All stress tests completed successfully!");
    Ok(())
}
